//! Alarm records emitted for blocked or logged command executions.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::event::{Action, EventKind, EventParameters, SecurityEvent, Severity};

/// Plugin name recorded for verdicts reached by the built-in policy.
pub const BUILTIN_PLUGIN_NAME: &str = "shellguard_builtin_policy";

/// Whether the alarmed call was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterceptState {
    Block,
    Log,
}

impl InterceptState {
    /// Map a verdict to an intercept state; `Allow` raises no alarm.
    pub fn from_action(action: Action) -> Option<Self> {
        match action {
            Action::Block => Some(Self::Block),
            Action::Log => Some(Self::Log),
            Action::Allow => None,
        }
    }
}

/// One alarm line, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    /// Seconds since the Unix epoch
    pub event_time: u64,
    pub attack_type: EventKind,
    pub attack_params: EventParameters,
    pub plugin_name: String,
    pub plugin_message: String,
    pub plugin_confidence: Severity,
    pub intercept_state: InterceptState,
    /// Rule that produced the verdict, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl AlarmRecord {
    /// Build an alarm for `event`, or `None` when the verdict raises no alarm.
    pub fn for_event(
        event: &SecurityEvent,
        action: Action,
        severity: Severity,
        message: &str,
        matched_rule: Option<String>,
    ) -> Option<Self> {
        let intercept_state = InterceptState::from_action(action)?;
        Some(Self {
            event_time: unix_now(),
            attack_type: event.event_type,
            attack_params: event.parameters.clone(),
            plugin_name: BUILTIN_PLUGIN_NAME.to_string(),
            plugin_message: message.to_string(),
            plugin_confidence: severity,
            intercept_state,
            matched_rule,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
