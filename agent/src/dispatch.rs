//! The decision dispatcher seam.

use shellguard_protocol::{Action, SecurityEvent};

use crate::error::CollaboratorError;

/// Decides what happens to a reported command execution.
///
/// The event is lent for the duration of the call; implementations must not
/// hold on to it. Called synchronously on the thread that invoked the
/// primitive.
pub trait DecisionDispatcher: Send + Sync {
    fn dispatch(&self, event: &SecurityEvent) -> Result<Action, CollaboratorError>;
}

impl<F> DecisionDispatcher for F
where
    F: Fn(&SecurityEvent) -> Result<Action, CollaboratorError> + Send + Sync,
{
    fn dispatch(&self, event: &SecurityEvent) -> Result<Action, CollaboratorError> {
        self(event)
    }
}
