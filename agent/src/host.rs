//! The host runtime's interception capability.

use shellguard_protocol::{HostAction, Primitive, Value};

use crate::error::InstallError;

/// Runs before the hooked primitive with its raw arguments.
pub type PreExecutionCallback = Box<dyn Fn(&[Value]) -> HostAction + Send + Sync>;

/// A host runtime that can run a callback before a primitive executes.
///
/// On [`HostAction::Suppress`] the host must skip the primitive and report
/// an execution-denied error to the calling code through its own error channel.
pub trait HostRuntime {
    fn intercept(
        &mut self,
        primitive: Primitive,
        callback: PreExecutionCallback,
    ) -> Result<(), InstallError>;
}
