//! Shellguard agent - command execution interception for interpreted runtimes.
//!
//! The host runtime hooks its process-spawning primitives and calls back into
//! the agent before each one runs. Every call goes through two checks:
//! a webshell check (command string equal to request input) and a policy
//! check (every command, with the interpreter stack). Each check reports a
//! [`SecurityEvent`](shellguard_protocol::SecurityEvent) to a
//! [`DecisionDispatcher`]; a `Block` verdict suppresses the call.

pub mod config;
pub mod detectors;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod format;
pub mod hooks;
pub mod host;
pub mod normalize;
pub mod policy_bridge;
pub mod registry;
pub mod stack;
pub mod taint;

use std::sync::Arc;

use anyhow::Result;
use log::info;
use shellguard_protocol::{HostAction, InterceptedCall, Primitive};

pub use config::{AgentConfig, FailureMode};
pub use detectors::{CommandDetector, DetectionMode, Detector, WebshellDetector};
pub use dispatch::DecisionDispatcher;
pub use error::{CollaboratorError, InstallError};
pub use hooks::HookManager;
pub use host::{HostRuntime, PreExecutionCallback};
pub use policy_bridge::PolicyDispatcher;
pub use registry::{HookRegistry, HookSelector, Registration};
pub use stack::StackCapturer;
pub use taint::{InputSource, RequestInput, TaintPredicate};

/// The agent: both detectors wired to a dispatcher.
pub struct Agent {
    hooks: Arc<HookManager>,
}

impl Agent {
    pub fn new(
        config: &AgentConfig,
        taint: Arc<dyn TaintPredicate>,
        stack: Arc<dyn StackCapturer>,
        dispatcher: Arc<dyn DecisionDispatcher>,
    ) -> Self {
        let detectors: Vec<Arc<dyn Detector>> = vec![
            Arc::new(WebshellDetector::new(taint)),
            Arc::new(CommandDetector::new(stack, config.max_stack_depth)),
        ];
        let registry = HookRegistry::new(detectors, &config.hooks_ignore);
        Self {
            hooks: Arc::new(HookManager::new(
                registry,
                dispatcher,
                config.failure_mode,
            )),
        }
    }

    /// Build an agent that decides with the built-in policy engine.
    ///
    /// Uses the policy file named in `config`, or the bundled policy.
    pub fn from_config(
        config: &AgentConfig,
        taint: Arc<dyn TaintPredicate>,
        stack: Arc<dyn StackCapturer>,
    ) -> Result<Self> {
        let dispatcher = match &config.policy {
            Some(path) => {
                info!("Loading policy from {}", path.display());
                PolicyDispatcher::from_file(path)?
            }
            None => PolicyDispatcher::default_policy()?,
        };
        Ok(Self::new(config, taint, stack, Arc::new(dispatcher)))
    }

    /// Hook every enabled primitive in `host`.
    pub fn install(&self, host: &mut dyn HostRuntime) -> Result<Vec<Primitive>, InstallError> {
        self.hooks.install(host)
    }

    /// Evaluate one call directly, without going through a host.
    pub fn on_call(&self, call: &InterceptedCall) -> HostAction {
        self.hooks.on_call(call)
    }

    pub fn hooks(&self) -> &Arc<HookManager> {
        &self.hooks
    }
}

/// Initialize env_logger. `RUST_LOG` wins over the configured level.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(config: &AgentConfig) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .try_init();
}
