//! Call stack capture at the hook site.
//!
//! The host runtime owns frame walking; the agent only asks for a snapshot
//! and bounds its depth.

use log::warn;
use shellguard_protocol::StackSnapshot;

use crate::error::CollaboratorError;

/// Trait for capturing the interpreter call stack of the current thread.
///
/// Frames come back innermost caller first.
pub trait StackCapturer: Send + Sync {
    fn capture(&self) -> Result<StackSnapshot, CollaboratorError>;
}

impl<F> StackCapturer for F
where
    F: Fn() -> Result<StackSnapshot, CollaboratorError> + Send + Sync,
{
    fn capture(&self) -> Result<StackSnapshot, CollaboratorError> {
        self()
    }
}

/// Capture a snapshot holding at most `max_depth` frames.
///
/// A failing capturer yields an empty snapshot: the command is still reported.
pub fn capture_snapshot(capturer: &dyn StackCapturer, max_depth: usize) -> StackSnapshot {
    match capturer.capture() {
        Ok(mut stack) => {
            stack.truncate(max_depth);
            stack
        }
        Err(e) => {
            warn!("Stack capture failed: {}", e);
            StackSnapshot::default()
        }
    }
}

/// Render a snapshot one frame per line for log output.
pub fn format_stack(stack: &StackSnapshot) -> String {
    stack
        .frames()
        .iter()
        .map(|f| f.display())
        .collect::<Vec<_>>()
        .join("\n")
}
