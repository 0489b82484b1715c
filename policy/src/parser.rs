use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Raw parsed policy file from YAML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFile {
    /// Policy format version; only `1` is supported.
    #[serde(default)]
    pub version: Option<u32>,
    /// Handling of tainted command strings.
    #[serde(default)]
    pub webshell_command: Option<WebshellSection>,
    /// Handling of every command execution.
    #[serde(default)]
    pub command: Option<CommandSection>,
}

/// Action keyword as written in a policy file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfiguredAction {
    #[default]
    Block,
    Log,
    /// Allow without raising an alarm.
    Ignore,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebshellSection {
    #[serde(default)]
    pub action: ConfiguredAction,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSection {
    /// Verdict when no rule matches. Defaults to `log`.
    #[serde(default)]
    pub action: Option<ConfiguredAction>,
    /// Severity assigned to command events. Defaults to 90.
    #[serde(default)]
    pub severity: Option<u32>,
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
    /// Call-stack based rules, checked before command patterns.
    #[serde(default)]
    pub stack: Option<StackSection>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StackSection {
    #[serde(default)]
    pub action: ConfiguredAction,
    #[serde(default)]
    pub frames: Vec<FrameRule>,
}

/// Matches a single stack frame. All given patterns must match the same frame.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FrameRule {
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    /// Only frames at index `< max_depth` (innermost first) are considered.
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parse a YAML string into a PolicyFile.
///
/// An empty document parses to an empty policy (which then fails validation
/// for its missing version).
pub fn parse_policy(yaml_str: &str) -> Result<PolicyFile> {
    if yaml_str.trim().is_empty() {
        return Ok(PolicyFile::default());
    }
    Ok(serde_yaml::from_str(yaml_str)?)
}
