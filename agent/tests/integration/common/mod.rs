//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use shellguard_agent::{
    Agent, AgentConfig, CollaboratorError, DecisionDispatcher, HostRuntime, InstallError,
    PreExecutionCallback, RequestInput, StackCapturer, TaintPredicate,
};
use shellguard_agent::taint::InputSource;
use shellguard_protocol::{
    Action, HostAction, Primitive, SecurityEvent, StackFrame, StackSnapshot, Value,
};

/// Error a host reports to application code when a primitive is suppressed.
pub const EXECUTION_DENIED: &str = "command execution denied";

/// A host runtime stand-in: keeps the installed callbacks and "spawns"
/// by recording the call when it is allowed to proceed.
#[derive(Default)]
pub struct FakeHost {
    callbacks: HashMap<Primitive, PreExecutionCallback>,
    refuse: HashSet<Primitive>,
    spawned: Mutex<Vec<(Primitive, Vec<Value>)>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that does not expose `primitives`.
    pub fn without(primitives: &[Primitive]) -> Self {
        Self {
            refuse: primitives.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Invoke a primitive the way application code would.
    pub fn call(&self, primitive: Primitive, arguments: Vec<Value>) -> Result<(), String> {
        if let Some(callback) = self.callbacks.get(&primitive) {
            if callback(arguments.as_slice()) == HostAction::Suppress {
                return Err(EXECUTION_DENIED.to_string());
            }
        }
        self.spawned.lock().unwrap().push((primitive, arguments));
        Ok(())
    }

    pub fn run(&self, primitive: Primitive, command: &str) -> Result<(), String> {
        self.call(primitive, vec![Value::from(command)])
    }

    pub fn hooked(&self) -> HashSet<Primitive> {
        self.callbacks.keys().copied().collect()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }
}

impl HostRuntime for FakeHost {
    fn intercept(
        &mut self,
        primitive: Primitive,
        callback: PreExecutionCallback,
    ) -> Result<(), InstallError> {
        if self.refuse.contains(&primitive) {
            return Err(InstallError::UnknownPrimitive(primitive));
        }
        self.callbacks.insert(primitive, callback);
        Ok(())
    }
}

/// Dispatcher that records every event and answers with a fixed verdict.
pub struct RecordingDispatcher {
    events: Mutex<Vec<SecurityEvent>>,
    verdict: Verdict,
}

#[derive(Debug, Clone, Copy)]
pub enum Verdict {
    Always(Action),
    /// Block webshell events, log everything else.
    BlockWebshell,
    Unavailable,
}

impl RecordingDispatcher {
    pub fn new(verdict: Verdict) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            verdict,
        })
    }

    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl DecisionDispatcher for RecordingDispatcher {
    fn dispatch(&self, event: &SecurityEvent) -> Result<Action, CollaboratorError> {
        self.events.lock().unwrap().push(event.clone());
        match self.verdict {
            Verdict::Always(action) => Ok(action),
            Verdict::BlockWebshell => Ok(match event.event_type {
                shellguard_protocol::EventKind::WebshellCommand => Action::Block,
                shellguard_protocol::EventKind::Command => Action::Log,
            }),
            Verdict::Unavailable => Err(CollaboratorError::Unavailable("dispatcher")),
        }
    }
}

/// Request input holding `values` as query parameters.
pub fn request_with(values: &[&str]) -> Arc<RequestInput> {
    let mut input = RequestInput::new();
    input.add(InputSource::Query, values.iter().copied());
    Arc::new(input)
}

pub fn app_stack() -> StackSnapshot {
    StackSnapshot::new(vec![
        StackFrame::new("/var/www/app/Tools.php", 42, "Tools::ping"),
        StackFrame::new("/var/www/app/index.php", 7, "main"),
    ])
}

pub fn fixed_stack(stack: StackSnapshot) -> Arc<dyn StackCapturer> {
    Arc::new(move || -> Result<StackSnapshot, CollaboratorError> { Ok(stack.clone()) })
}

pub fn failing_taint() -> Arc<dyn TaintPredicate> {
    Arc::new(|_: &str| -> Result<bool, CollaboratorError> {
        Err(CollaboratorError::failed("taint store", "request context gone"))
    })
}

/// An agent over `input` and a fixed application stack, installed in a fresh host.
pub fn installed_agent(
    config: &AgentConfig,
    input: Arc<dyn TaintPredicate>,
    dispatcher: Arc<RecordingDispatcher>,
) -> (Agent, FakeHost) {
    let agent = Agent::new(config, input, fixed_stack(app_stack()), dispatcher);
    let mut host = FakeHost::new();
    agent.install(&mut host).expect("install hooks");
    (agent, host)
}
