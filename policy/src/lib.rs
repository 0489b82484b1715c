//! Policy engine deciding what happens to intercepted command executions.
//!
//! This crate provides policy parsing, compilation, and evaluation for
//! `webshell_command` and `command` security events.
//!
//! # Example
//!
//! ```
//! use shellguard_policy::PolicyEngine;
//! use shellguard_protocol::{Action, EventKind, EventParameters, SecurityEvent};
//!
//! let yaml = r#"
//! version: 1
//! command:
//!   action: log
//!   deny:
//!     - "rm -rf *"
//!   allow:
//!     - "ls *"
//! "#;
//!
//! let engine = PolicyEngine::from_yaml(yaml).unwrap();
//!
//! let event = SecurityEvent {
//!     event_type: EventKind::Command,
//!     severity: None,
//!     parameters: EventParameters { command: "rm -rf /var/www".to_string(), stack: None },
//!     message: None,
//! };
//! assert_eq!(engine.evaluate(&event).action, Action::Block);
//! ```

mod compiled;
mod compiler;
mod default_policy;
mod engine;
mod error;
mod parser;
mod pattern;
mod validate;


// Re-export public types
pub use compiled::{
    CompiledCommandSection, CompiledFrameRule, CompiledPolicy, CompiledRule, EnforcementMode,
    DEFAULT_COMMAND_SEVERITY, STACK_RULE_SEVERITY,
};
pub use compiler::{compile_policy, compile_policy_yaml};
pub use default_policy::DEFAULT_POLICY_YAML;
pub use engine::{
    PolicyAction, PolicyDecision, PolicyEngine, COMMAND_MESSAGE, STACK_RULE_MESSAGE,
};
pub use error::{PatternError, PolicyError, ValidationError};
pub use parser::{
    parse_policy, CommandSection, ConfiguredAction, FrameRule, PolicyFile, StackSection,
    WebshellSection,
};
pub use pattern::{compile_pattern, CompiledPattern};
pub use validate::validate_policy;

pub use shellguard_protocol::WEBSHELL_MESSAGE;
