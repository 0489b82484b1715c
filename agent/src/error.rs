//! Error types at the agent's collaborator seams.

use shellguard_protocol::Primitive;
use thiserror::Error;

/// A collaborator (taint store, stack collector, decision dispatcher) could not answer.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),

    #[error("{collaborator} failed: {reason}")]
    Failed {
        collaborator: &'static str,
        reason: String,
    },
}

impl CollaboratorError {
    pub fn failed(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            collaborator,
            reason: reason.into(),
        }
    }
}

/// Installing a hook into the host runtime failed.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("host does not expose primitive '{0}'")]
    UnknownPrimitive(Primitive),

    #[error("failed to hook '{primitive}': {reason}")]
    Rejected { primitive: Primitive, reason: String },
}
