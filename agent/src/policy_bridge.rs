//! Bridge between the policy engine and the hook pipeline.
//!
//! Evaluates each reported event against the active policy, writes an
//! alarm record for every non-allowed verdict and hands the action back.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use shellguard_policy::{PolicyDecision, PolicyEngine, DEFAULT_POLICY_YAML};
use shellguard_protocol::{Action, AlarmRecord, SecurityEvent};

use crate::dispatch::DecisionDispatcher;
use crate::error::CollaboratorError;

/// Log target for alarm records.
pub const ALARM_TARGET: &str = "shellguard::alarm";

/// Receives every alarm record the dispatcher produces.
pub type AlarmSink = Box<dyn Fn(&AlarmRecord) + Send + Sync>;

/// Decision dispatcher backed by the built-in policy engine.
pub struct PolicyDispatcher {
    engine: PolicyEngine,
    sink: Option<AlarmSink>,
}

impl PolicyDispatcher {
    pub fn new(engine: PolicyEngine) -> Self {
        Self { engine, sink: None }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let engine = PolicyEngine::from_yaml(yaml).context("invalid policy")?;
        Ok(Self::new(engine))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file '{}'", path.display()))?;
        Self::from_yaml(&yaml)
            .with_context(|| format!("Failed to load policy file '{}'", path.display()))
    }

    /// The bundled policy.
    pub fn default_policy() -> Result<Self> {
        Self::from_yaml(DEFAULT_POLICY_YAML)
    }

    /// Also pass alarm records to `sink`, after they are logged.
    pub fn with_alarm_sink(mut self, sink: AlarmSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Evaluate without side effects.
    pub fn decide(&self, event: &SecurityEvent) -> PolicyDecision {
        self.engine.evaluate(event)
    }

    fn raise_alarm(&self, event: &SecurityEvent, decision: &PolicyDecision) {
        let Some(record) = AlarmRecord::for_event(
            event,
            decision.action,
            decision.severity,
            &decision.message,
            decision.matched_rule.clone(),
        ) else {
            return;
        };

        match record.to_json() {
            Ok(json) => info!(target: ALARM_TARGET, "{}", json),
            Err(e) => debug!("Failed to serialize alarm record: {}", e),
        }
        if let Some(sink) = &self.sink {
            sink(&record);
        }
    }
}

impl fmt::Debug for PolicyDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyDispatcher")
            .field("engine", &self.engine)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl DecisionDispatcher for PolicyDispatcher {
    fn dispatch(&self, event: &SecurityEvent) -> Result<Action, CollaboratorError> {
        let decision = self.decide(event);
        debug!(
            "{} -> {:?} ({:?}, rule: {})",
            decision.section,
            decision.action,
            decision.mode,
            decision.matched_rule.as_deref().unwrap_or("-")
        );
        self.raise_alarm(event, &decision);
        Ok(decision.action)
    }
}
