use shellguard_protocol::{
    Action, EventKind, SecurityEvent, Severity, StackSnapshot, WEBSHELL_MESSAGE,
};

use crate::compiled::{
    CompiledCommandSection, CompiledPolicy, CompiledRule, EnforcementMode, STACK_RULE_SEVERITY,
};
use crate::compiler::compile_policy_yaml;
use crate::error::Result;

/// Message for command events that matched no stack rule.
pub const COMMAND_MESSAGE: &str = "Try to execute the command";

/// Message for stack rules that do not carry their own.
pub const STACK_RULE_MESSAGE: &str = "Command executed from dynamically evaluated code";

/// Policy evaluation engine.
#[derive(Debug)]
pub struct PolicyEngine {
    policy: CompiledPolicy,
}

/// Result of a policy evaluation.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    /// The action to take.
    pub action: PolicyAction,
    /// Severity the policy assigns to the event.
    pub severity: Severity,
    /// Alarm message.
    pub message: String,
    /// The rule that matched (if any).
    pub matched_rule: Option<String>,
    /// The section that was evaluated.
    pub section: String,
    /// The enforcement mode that produced the action.
    pub mode: EnforcementMode,
}

impl PolicyDecision {
    /// Check if this decision allows the call.
    pub fn is_allowed(&self) -> bool {
        self.action.is_allowed()
    }

    /// Check if this decision blocks the call.
    pub fn is_denied(&self) -> bool {
        matches!(self.action, Action::Block)
    }
}

/// The action resulting from policy evaluation.
pub type PolicyAction = Action;

impl PolicyEngine {
    /// Create a new policy engine from a compiled policy.
    pub fn new(policy: CompiledPolicy) -> Self {
        Self { policy }
    }

    /// Create a new policy engine from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let policy = compile_policy_yaml(yaml)?;
        Ok(Self::new(policy))
    }

    /// Get the underlying policy.
    pub fn policy(&self) -> &CompiledPolicy {
        &self.policy
    }

    /// Evaluate a security event.
    pub fn evaluate(&self, event: &SecurityEvent) -> PolicyDecision {
        match event.event_type {
            EventKind::WebshellCommand => self.evaluate_webshell(event),
            EventKind::Command => self.evaluate_command(event),
        }
    }

    fn evaluate_webshell(&self, event: &SecurityEvent) -> PolicyDecision {
        let severity = event.severity.unwrap_or(Severity::MAX);
        let message = event
            .message
            .clone()
            .unwrap_or_else(|| WEBSHELL_MESSAGE.to_string());

        // No section: the signature is conclusive, enforce it.
        let mode = self.policy.webshell.unwrap_or_default();
        PolicyDecision {
            action: mode.action(),
            severity,
            message,
            matched_rule: None,
            section: EventKind::WebshellCommand.as_str().to_string(),
            mode,
        }
    }

    fn evaluate_command(&self, event: &SecurityEvent) -> PolicyDecision {
        let section_name = EventKind::Command.as_str().to_string();

        let section = match &self.policy.command {
            Some(s) => s,
            None => {
                return PolicyDecision {
                    action: Action::Allow,
                    severity: event.severity.unwrap_or(Severity::MIN),
                    message: COMMAND_MESSAGE.to_string(),
                    matched_rule: None,
                    section: section_name,
                    mode: EnforcementMode::Noop,
                };
            }
        };

        if section.stack_mode != EnforcementMode::Noop {
            if let Some(decision) = evaluate_stack(section, event.stack(), &section_name) {
                return decision;
            }
        }

        if let Some(rule) = best_rule_match(&section.rules, event.command()) {
            return PolicyDecision {
                action: rule.mode.action(),
                severity: section.severity,
                message: COMMAND_MESSAGE.to_string(),
                matched_rule: Some(rule.pattern.original().to_string()),
                section: section_name,
                mode: rule.mode,
            };
        }

        PolicyDecision {
            action: section.default_mode.action(),
            severity: section.severity,
            message: COMMAND_MESSAGE.to_string(),
            matched_rule: None,
            section: section_name,
            mode: section.default_mode,
        }
    }
}

/// First stack rule that matches any frame, innermost frames first.
fn evaluate_stack(
    section: &CompiledCommandSection,
    stack: Option<&StackSnapshot>,
    section_name: &str,
) -> Option<PolicyDecision> {
    let stack = stack?;
    for (depth, frame) in stack.frames().iter().enumerate() {
        for rule in &section.frame_rules {
            if rule.matches(depth, frame) {
                return Some(PolicyDecision {
                    action: section.stack_mode.action(),
                    severity: Severity::new(STACK_RULE_SEVERITY),
                    message: rule
                        .message
                        .clone()
                        .unwrap_or_else(|| STACK_RULE_MESSAGE.to_string()),
                    matched_rule: Some(rule.describe()),
                    section: format!("{}.stack", section_name),
                    mode: section.stack_mode,
                });
            }
        }
    }
    None
}

/// The matching rule with the highest precedence; earlier rules win ties.
fn best_rule_match<'a>(rules: &'a [CompiledRule], command: &str) -> Option<&'a CompiledRule> {
    let mut best: Option<&CompiledRule> = None;
    for rule in rules {
        if !rule.pattern.matches(command) {
            continue;
        }
        match best {
            Some(current) if current.rank() >= rule.rank() => {}
            _ => best = Some(rule),
        }
    }
    best
}
