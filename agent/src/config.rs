//! Agent configuration: hook selection, stack depth, failure mode, logging.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::registry::HookSelector;

/// Frames kept in a stack snapshot unless configured otherwise.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 100;

/// What happens to a call when a collaborator cannot answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Let the call run.
    #[default]
    Open,
    /// Suppress the call.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Registrations to disable.
    pub hooks_ignore: Vec<HookSelector>,
    pub max_stack_depth: usize,
    pub failure_mode: FailureMode,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Policy file for the built-in dispatcher; the bundled policy is used when unset.
    pub policy: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hooks_ignore: Vec::new(),
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            failure_mode: FailureMode::Open,
            log_level: "warn".to_string(),
            policy: None,
        }
    }
}

impl AgentConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("invalid agent configuration")
    }

    /// Load a configuration file. Relative `policy` paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let mut config = Self::from_yaml(&yaml)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

        if let (Some(policy), Some(dir)) = (&config.policy, path.parent()) {
            if policy.is_relative() {
                config.policy = Some(dir.join(policy));
            }
        }
        Ok(config)
    }

    /// Load the file at [`default_config_path`] if it exists, defaults otherwise.
    pub fn load_default() -> Result<Self> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Get the XDG config base directory (~/.config or $XDG_CONFIG_HOME).
fn config_base_dir() -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        Ok(PathBuf::from(xdg))
    } else {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        Ok(home.join(".config"))
    }
}

/// Get the default config file path: ~/.config/shellguard/agent.yaml
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_base_dir()?.join("shellguard").join("agent.yaml"))
}
