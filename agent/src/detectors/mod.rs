//! Detectors run for every hooked primitive.
//!
//! Each detector looks at one intercepted call and either reports a
//! [`SecurityEvent`] or stays silent. The hook manager runs them in
//! [`DetectionMode`] priority order.

use std::fmt;

use shellguard_protocol::{EventKind, InterceptedCall, SecurityEvent};

use crate::error::CollaboratorError;

pub mod command;
pub mod webshell;

pub use command::CommandDetector;
pub use webshell::WebshellDetector;

/// Detection mode of a hook registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetectionMode {
    /// Command string identical to request input.
    Webshell,
    /// Every command, with call stack, for policy evaluation.
    Policy,
}

impl DetectionMode {
    /// Every mode, in evaluation order.
    pub const ALL: [DetectionMode; 2] = [DetectionMode::Webshell, DetectionMode::Policy];

    /// Kind of the events this mode reports.
    pub fn event_kind(&self) -> EventKind {
        match self {
            DetectionMode::Webshell => EventKind::WebshellCommand,
            DetectionMode::Policy => EventKind::Command,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.event_kind().as_str()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inspects an intercepted call.
///
/// `Ok(None)` means nothing to report, including calls whose arguments do
/// not have the expected shape. `Err` means a collaborator failed and no
/// verdict could be reached.
pub trait Detector: Send + Sync {
    fn mode(&self) -> DetectionMode;

    fn evaluate(&self, call: &InterceptedCall) -> Result<Option<SecurityEvent>, CollaboratorError>;
}
