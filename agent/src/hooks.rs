//! Hook management: runs the detectors for an intercepted call and turns
//! dispatcher verdicts into host actions.

use std::cell::Cell;
use std::sync::Arc;

use log::{debug, error, info, warn};
use shellguard_protocol::{Action, HostAction, InterceptedCall, Primitive, SecurityEvent, Value};

use crate::config::FailureMode;
use crate::detectors::DetectionMode;
use crate::dispatch::DecisionDispatcher;
use crate::error::{CollaboratorError, InstallError};
use crate::format::display_command;
use crate::host::{HostRuntime, PreExecutionCallback};
use crate::registry::HookRegistry;
use crate::stack::format_stack;

// Thread-local re-entrancy guard. Prevents recursion when a collaborator
// (taint store, stack collector, dispatcher) itself executes a hooked
// primitive while a check is in progress on the same thread.
thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

/// Set the re-entrancy guard on the current thread.
pub fn set_in_hook(val: bool) {
    IN_HOOK.with(|h| h.set(val));
}

/// Check if we are currently inside a hook callback on this thread.
pub fn is_in_hook() -> bool {
    IN_HOOK.with(|h| h.get())
}

/// RAII guard that suppresses hook callbacks for its lifetime.
/// Saves the current IN_HOOK state and sets it to true; restores on drop.
/// Nesting-safe: inner guards restore the previous (already-true) state.
pub struct HookSuppressGuard(bool);

impl HookSuppressGuard {
    pub fn new() -> Self {
        let was = is_in_hook();
        set_in_hook(true);
        Self(was)
    }
}

impl Default for HookSuppressGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HookSuppressGuard {
    fn drop(&mut self) {
        set_in_hook(self.0);
    }
}

/// Owns the hook table and the dispatcher, and answers every pre-execution callback.
pub struct HookManager {
    registry: HookRegistry,
    dispatcher: Arc<dyn DecisionDispatcher>,
    failure_mode: FailureMode,
}

impl HookManager {
    pub fn new(
        registry: HookRegistry,
        dispatcher: Arc<dyn DecisionDispatcher>,
        failure_mode: FailureMode,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            failure_mode,
        }
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Register a pre-execution callback for every enabled primitive.
    ///
    /// A primitive the host refuses is logged and skipped; installation only
    /// fails when nothing could be hooked.
    pub fn install(
        self: &Arc<Self>,
        host: &mut dyn HostRuntime,
    ) -> Result<Vec<Primitive>, InstallError> {
        let mut installed = Vec::new();
        let mut last_error = None;

        for primitive in self.registry.primitives() {
            let manager = Arc::clone(self);
            let callback: PreExecutionCallback =
                Box::new(move |arguments: &[Value]| manager.on_enter(primitive, arguments));

            match host.intercept(primitive, callback) {
                Ok(()) => {
                    debug!("Hooked {}", primitive);
                    installed.push(primitive);
                }
                Err(e) => {
                    warn!("Failed to hook {}: {}", primitive, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if installed.is_empty() => Err(e),
            _ => {
                info!("Installed command hooks on {} primitive(s)", installed.len());
                Ok(installed)
            }
        }
    }

    /// Pre-execution callback body: raw arguments in, host action out.
    pub fn on_enter(&self, primitive: Primitive, arguments: &[Value]) -> HostAction {
        if is_in_hook() {
            return HostAction::Continue;
        }
        let call = InterceptedCall::new(primitive, arguments.to_vec());
        self.on_call(&call)
    }

    /// Run every enabled detector for the call, in mode order.
    ///
    /// The first `Block` verdict suppresses the call and stops evaluation.
    pub fn on_call(&self, call: &InterceptedCall) -> HostAction {
        if is_in_hook() {
            return HostAction::Continue;
        }
        let _guard = HookSuppressGuard::new();

        for detector in self.registry.detectors_for(call.primitive) {
            let mode = detector.mode();

            let event = match detector.evaluate(call) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    if let Some(action) = self.on_failure(call.primitive, mode, &e) {
                        return action;
                    }
                    continue;
                }
            };

            match self.dispatcher.dispatch(&event) {
                Ok(Action::Block) => {
                    warn!(
                        "Blocked {} via {}: {}",
                        event.event_type,
                        call.primitive,
                        display_command(event.command())
                    );
                    log_stack(&event);
                    return HostAction::Suppress;
                }
                Ok(Action::Log) => log_event(call.primitive, &event),
                Ok(Action::Allow) => {}
                Err(e) => {
                    if let Some(action) = self.on_failure(call.primitive, mode, &e) {
                        return action;
                    }
                }
            }
        }

        HostAction::Continue
    }

    fn on_failure(
        &self,
        primitive: Primitive,
        mode: DetectionMode,
        err: &CollaboratorError,
    ) -> Option<HostAction> {
        match self.failure_mode {
            FailureMode::Open => {
                warn!("{} check on {} failed, allowing: {}", mode, primitive, err);
                None
            }
            FailureMode::Closed => {
                error!("{} check on {} failed, denying: {}", mode, primitive, err);
                Some(HostAction::Suppress)
            }
        }
    }
}

fn log_event(primitive: Primitive, event: &SecurityEvent) {
    info!(
        "{} via {}: {}",
        event.event_type,
        primitive,
        display_command(event.command())
    );
    log_stack(event);
}

fn log_stack(event: &SecurityEvent) {
    if let Some(stack) = event.stack().filter(|s| !s.is_empty()) {
        debug!("Call stack:\n{}", format_stack(stack));
    }
}
