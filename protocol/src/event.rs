//! Security event types representing intercepted command executions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Command-execution primitive exposed by the host runtime.
///
/// Serializes as its kebab-case name for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Primitive {
    /// Run a command through the shell, output passed to the caller.
    Run,
    /// Run a command and hand back its captured output.
    RunAndCaptureOutput,
    /// Execute a program with an argument array.
    ExecWithArgs,
    /// Run a command without waiting for it.
    RunDetached,
    /// Spawn a process with attached pipes.
    SpawnProcess,
    /// Open a unidirectional pipe to a command.
    OpenPipe,
    /// Replace the current process image with a program and argument array.
    ReplaceProcessImage,
}

impl Primitive {
    /// Every primitive, in registration order.
    pub const ALL: [Primitive; 7] = [
        Primitive::Run,
        Primitive::RunAndCaptureOutput,
        Primitive::ExecWithArgs,
        Primitive::RunDetached,
        Primitive::SpawnProcess,
        Primitive::OpenPipe,
        Primitive::ReplaceProcessImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Run => "run",
            Primitive::RunAndCaptureOutput => "run-and-capture-output",
            Primitive::ExecWithArgs => "exec-with-args",
            Primitive::RunDetached => "run-detached",
            Primitive::SpawnProcess => "spawn-process",
            Primitive::OpenPipe => "open-pipe",
            Primitive::ReplaceProcessImage => "replace-process-image",
        }
    }

    /// Look up a primitive by its kebab-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// How the command is laid out in this primitive's arguments.
    pub fn shape(&self) -> CallShape {
        match self {
            Primitive::ExecWithArgs | Primitive::ReplaceProcessImage => {
                CallShape::StringPlusArgList
            }
            _ => CallShape::SingleString,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument layout of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallShape {
    /// `(command, ...)`
    SingleString,
    /// `(program, [arg, ...]?, ...)`
    StringPlusArgList,
}

/// A raw, unmarshalled argument as handed over by the host runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar-to-string conversion used when joining argument lists.
    ///
    /// Lists have no string form and return `None`.
    pub fn to_joinable(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::List(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// One invocation of a hooked primitive, captured before it executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptedCall {
    /// Which primitive fired
    pub primitive: Primitive,
    /// Arguments exactly as the host passed them
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl InterceptedCall {
    pub fn new(primitive: Primitive, arguments: Vec<Value>) -> Self {
        Self {
            primitive,
            arguments,
        }
    }
}

/// Message attached to every webshell event.
pub const WEBSHELL_MESSAGE: &str = "Webshell detected - Command execution backdoor";

/// Classification of a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Command string identical to request input: a command-execution backdoor.
    WebshellCommand,
    /// Any command execution, reported for policy evaluation.
    Command,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::WebshellCommand => "webshell_command",
            EventKind::Command => "command",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event severity on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    pub const MIN: Severity = Severity(0);
    pub const MAX: Severity = Severity(100);

    /// Values above 100 saturate to [`Severity::MAX`].
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX.0))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A runtime stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Source file path
    pub file: String,
    /// Line number (1-based, 0 when unknown)
    pub line: u32,
    /// Function name, qualified the way the host runtime reports it
    pub function: String,
}

impl StackFrame {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// Format frame for display: "function (file:line)"
    pub fn display(&self) -> String {
        format!("{} ({}:{})", self.function, self.file, self.line)
    }
}

/// Ordered call frames, innermost caller first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackSnapshot(Vec<StackFrame>);

impl StackSnapshot {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep at most `depth` innermost frames.
    pub fn truncate(&mut self, depth: usize) {
        self.0.truncate(depth);
    }
}

impl From<Vec<StackFrame>> for StackSnapshot {
    fn from(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }
}

/// Named event parameters. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParameters {
    /// The resolved command line
    pub command: String,
    /// Call stack (only on `command` events)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackSnapshot>,
}

/// A structured event handed to the decision dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub event_type: EventKind,
    /// Unset when the dispatcher's policy assigns severity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub parameters: EventParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SecurityEvent {
    pub fn command(&self) -> &str {
        &self.parameters.command
    }

    pub fn stack(&self) -> Option<&StackSnapshot> {
        self.parameters.stack.as_ref()
    }
}

/// Verdict returned by a decision dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Let the primitive run.
    #[default]
    Allow,
    /// Prevent the primitive from running.
    Block,
    /// Let the primitive run and record the event.
    Log,
}

impl Action {
    /// Returns true if the call should be allowed to proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Action::Allow | Action::Log)
    }
}

/// What the host runtime should do with the intercepted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostAction {
    /// Execute the original primitive.
    Continue,
    /// Skip it and report execution denied to the caller.
    Suppress,
}
