use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("pattern compilation error: {0}")]
    Pattern(#[from] PatternError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported policy version: {0} (supported: 1)")]
    UnsupportedVersion(u32),

    #[error("missing required 'version' field")]
    MissingVersion,

    #[error("severity {0} in section '{1}' is out of range (0-100)")]
    InvalidSeverity(u32, String),

    #[error("empty pattern in section '{0}'")]
    EmptyPattern(String),

    #[error("stack rule #{0} needs a 'function' or 'file' pattern")]
    EmptyFrameRule(usize),
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PolicyError>;
pub type PatternResult<T> = std::result::Result<T, PatternError>;
