use shellguard_protocol::{Action, Severity, StackFrame};

use crate::parser::ConfiguredAction;
use crate::pattern::CompiledPattern;

/// Severity given to command events when the policy does not set one.
pub const DEFAULT_COMMAND_SEVERITY: u8 = 90;

/// Severity of a stack-rule hit.
pub const STACK_RULE_SEVERITY: u8 = 100;

/// A fully compiled policy ready for evaluation.
#[derive(Debug)]
pub struct CompiledPolicy {
    pub version: u32,
    /// `None` when the policy has no `webshell_command` section.
    pub webshell: Option<EnforcementMode>,
    /// `None` when the policy has no `command` section.
    pub command: Option<CompiledCommandSection>,
}

/// How a matched verdict is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EnforcementMode {
    /// Stop the call.
    #[default]
    Block,
    /// Let it run and raise an alarm.
    Log,
    /// Let it run silently.
    Noop,
}

impl EnforcementMode {
    pub fn action(&self) -> Action {
        match self {
            EnforcementMode::Block => Action::Block,
            EnforcementMode::Log => Action::Log,
            EnforcementMode::Noop => Action::Allow,
        }
    }
}

impl From<ConfiguredAction> for EnforcementMode {
    fn from(action: ConfiguredAction) -> Self {
        match action {
            ConfiguredAction::Block => EnforcementMode::Block,
            ConfiguredAction::Log => EnforcementMode::Log,
            ConfiguredAction::Ignore => EnforcementMode::Noop,
        }
    }
}

/// The compiled `command` section.
#[derive(Debug)]
pub struct CompiledCommandSection {
    pub default_mode: EnforcementMode,
    pub severity: Severity,
    pub stack_mode: EnforcementMode,
    pub frame_rules: Vec<CompiledFrameRule>,
    /// Pattern rules, each carrying the mode of the key it was listed under.
    pub rules: Vec<CompiledRule>,
}

/// A compiled command pattern rule.
#[derive(Debug)]
pub struct CompiledRule {
    pub pattern: CompiledPattern,
    pub mode: EnforcementMode,
    /// `true` for rules listed under `allow:`.
    pub allow: bool,
}

impl CompiledRule {
    /// Precedence when several rules match: deny > log > allow.
    pub fn rank(&self) -> u8 {
        if self.allow {
            return 0;
        }
        match self.mode {
            EnforcementMode::Noop => 0,
            EnforcementMode::Log => 1,
            EnforcementMode::Block => 2,
        }
    }
}

/// A compiled stack frame rule.
#[derive(Debug)]
pub struct CompiledFrameRule {
    pub function: Option<CompiledPattern>,
    pub file: Option<CompiledPattern>,
    pub max_depth: Option<usize>,
    pub message: Option<String>,
}

impl CompiledFrameRule {
    /// Whether the frame at `depth` (0 = innermost) satisfies this rule.
    pub fn matches(&self, depth: usize, frame: &StackFrame) -> bool {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return false;
        }
        let function_ok = self
            .function
            .as_ref()
            .map_or(true, |p| p.matches(&frame.function));
        let file_ok = self.file.as_ref().map_or(true, |p| p.matches(&frame.file));
        function_ok && file_ok
    }

    /// Human-readable form used as the matched rule name.
    pub fn describe(&self) -> String {
        match (&self.function, &self.file) {
            (Some(func), Some(file)) => format!("{} @ {}", func.original(), file.original()),
            (Some(func), None) => func.original().to_string(),
            (None, Some(file)) => file.original().to_string(),
            (None, None) => String::new(),
        }
    }
}
