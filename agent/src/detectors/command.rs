use std::sync::Arc;

use log::debug;
use shellguard_protocol::{InterceptedCall, SecurityEvent};

use super::{DetectionMode, Detector};
use crate::error::CollaboratorError;
use crate::event::command_event;
use crate::normalize;
use crate::stack::{capture_snapshot, StackCapturer};

/// Reports every command execution with its call stack, regardless of taint.
pub struct CommandDetector {
    stack: Arc<dyn StackCapturer>,
    max_stack_depth: usize,
}

impl CommandDetector {
    pub fn new(stack: Arc<dyn StackCapturer>, max_stack_depth: usize) -> Self {
        Self {
            stack,
            max_stack_depth,
        }
    }
}

impl Detector for CommandDetector {
    fn mode(&self) -> DetectionMode {
        DetectionMode::Policy
    }

    fn evaluate(&self, call: &InterceptedCall) -> Result<Option<SecurityEvent>, CollaboratorError> {
        let Some(command) = normalize::normalize(call) else {
            debug!("{}: arguments not readable, skipping command check", call.primitive);
            return Ok(None);
        };

        let stack = capture_snapshot(self.stack.as_ref(), self.max_stack_depth);
        Ok(Some(command_event(command, stack)))
    }
}
