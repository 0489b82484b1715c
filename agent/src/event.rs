//! SecurityEvent builder for consistent event creation.

use shellguard_protocol::{EventKind, EventParameters, SecurityEvent, Severity, StackSnapshot};

pub use shellguard_protocol::WEBSHELL_MESSAGE;

/// Builder for creating SecurityEvent instances.
pub struct EventBuilder {
    event_type: EventKind,
    severity: Option<Severity>,
    command: String,
    stack: Option<StackSnapshot>,
    message: Option<String>,
}

impl EventBuilder {
    /// Start an event of `event_type` for an already resolved command value.
    pub fn new(event_type: EventKind, command: impl Into<String>) -> Self {
        Self {
            event_type,
            severity: None,
            command: command.into(),
            stack: None,
            message: None,
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the call stack.
    pub fn stack(mut self, stack: StackSnapshot) -> Self {
        self.stack = Some(stack);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Build the SecurityEvent.
    pub fn build(self) -> SecurityEvent {
        SecurityEvent {
            event_type: self.event_type,
            severity: self.severity,
            parameters: EventParameters {
                command: self.command,
                stack: self.stack,
            },
            message: self.message,
        }
    }
}

/// A backdoor event: maximum severity, fixed message, no stack.
pub fn webshell_event(command: impl Into<String>) -> SecurityEvent {
    EventBuilder::new(EventKind::WebshellCommand, command)
        .severity(Severity::MAX)
        .message(WEBSHELL_MESSAGE)
        .build()
}

/// A generic command event. Severity and message are left to the dispatcher.
pub fn command_event(command: impl Into<String>, stack: StackSnapshot) -> SecurityEvent {
    EventBuilder::new(EventKind::Command, command)
        .stack(stack)
        .build()
}
