use shellguard_protocol::Severity;

use crate::compiled::{
    CompiledCommandSection, CompiledFrameRule, CompiledPolicy, CompiledRule, EnforcementMode,
    DEFAULT_COMMAND_SEVERITY,
};
use crate::error::Result;
use crate::parser::{parse_policy, CommandSection, PolicyFile};
use crate::pattern::compile_pattern;
use crate::validate::validate_policy;

/// Parse, validate and compile a YAML policy.
pub fn compile_policy_yaml(yaml: &str) -> Result<CompiledPolicy> {
    let policy = parse_policy(yaml)?;
    compile_policy(&policy)
}

/// Compile a parsed policy into its runtime representation.
///
/// Each command rule carries the enforcement mode derived from the key it was
/// listed under (deny → Block, log → Log, allow → Noop).
pub fn compile_policy(policy: &PolicyFile) -> Result<CompiledPolicy> {
    validate_policy(policy)?;

    let webshell = policy
        .webshell_command
        .as_ref()
        .map(|section| EnforcementMode::from(section.action));

    let command = policy
        .command
        .as_ref()
        .map(compile_command_section)
        .transpose()?;

    Ok(CompiledPolicy {
        // validate_policy rejects a missing version
        version: policy.version.unwrap_or(1),
        webshell,
        command,
    })
}

fn compile_command_section(section: &CommandSection) -> Result<CompiledCommandSection> {
    let mut rules =
        Vec::with_capacity(section.deny.len() + section.log.len() + section.allow.len());

    for (patterns, mode, allow) in [
        (&section.deny, EnforcementMode::Block, false),
        (&section.log, EnforcementMode::Log, false),
        (&section.allow, EnforcementMode::Noop, true),
    ] {
        for pattern in patterns {
            rules.push(CompiledRule {
                pattern: compile_pattern(pattern)?,
                mode,
                allow,
            });
        }
    }

    let (stack_mode, frame_rules) = match &section.stack {
        Some(stack) => {
            let mut compiled = Vec::with_capacity(stack.frames.len());
            for rule in &stack.frames {
                compiled.push(CompiledFrameRule {
                    function: rule.function.as_deref().map(compile_pattern).transpose()?,
                    file: rule.file.as_deref().map(compile_pattern).transpose()?,
                    max_depth: rule.max_depth,
                    message: rule.message.clone(),
                });
            }
            (EnforcementMode::from(stack.action), compiled)
        }
        None => (EnforcementMode::Block, Vec::new()),
    };

    // validate_policy bounds severity to 0-100
    let severity = section
        .severity
        .map(|s| Severity::new(s.min(u8::MAX as u32) as u8))
        .unwrap_or(Severity::new(DEFAULT_COMMAND_SEVERITY));

    Ok(CompiledCommandSection {
        default_mode: section
            .action
            .map(EnforcementMode::from)
            .unwrap_or(EnforcementMode::Log),
        severity,
        stack_mode,
        frame_rules,
        rules,
    })
}
