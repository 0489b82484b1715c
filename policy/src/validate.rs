use crate::error::ValidationError;
use crate::parser::PolicyFile;

/// Supported policy versions.
const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Highest severity a policy may assign.
const MAX_SEVERITY: u32 = 100;

/// Validate a parsed policy file.
pub fn validate_policy(policy: &PolicyFile) -> Result<(), ValidationError> {
    let version = policy.version.ok_or(ValidationError::MissingVersion)?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ValidationError::UnsupportedVersion(version));
    }

    if let Some(command) = &policy.command {
        if let Some(severity) = command.severity {
            if severity > MAX_SEVERITY {
                return Err(ValidationError::InvalidSeverity(
                    severity,
                    "command".to_string(),
                ));
            }
        }

        for (key, patterns) in [
            ("allow", &command.allow),
            ("log", &command.log),
            ("deny", &command.deny),
        ] {
            if patterns.iter().any(|p| p.is_empty()) {
                return Err(ValidationError::EmptyPattern(format!("command.{}", key)));
            }
        }

        if let Some(stack) = &command.stack {
            for (idx, rule) in stack.frames.iter().enumerate() {
                let function = rule.function.as_deref().filter(|s| !s.is_empty());
                let file = rule.file.as_deref().filter(|s| !s.is_empty());
                if function.is_none() && file.is_none() {
                    return Err(ValidationError::EmptyFrameRule(idx));
                }
            }
        }
    }

    Ok(())
}
