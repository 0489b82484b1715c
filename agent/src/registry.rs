//! The hook table: which detectors run for which primitive.
//!
//! Built once at startup and handed to the [`HookManager`](crate::hooks::HookManager).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;
use shellguard_protocol::Primitive;

use crate::detectors::{DetectionMode, Detector};

/// One (primitive, detection mode) pair wired to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration {
    pub primitive: Primitive,
    pub mode: DetectionMode,
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primitive, self.mode)
    }
}

/// Selects registrations to disable.
///
/// Parsed from `"all"`, a detection mode (`"webshell_command"`, `"command"`)
/// or a primitive name (`"open-pipe"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum HookSelector {
    All,
    Mode(DetectionMode),
    Primitive(Primitive),
}

impl HookSelector {
    pub fn matches(&self, registration: &Registration) -> bool {
        match self {
            HookSelector::All => true,
            HookSelector::Mode(mode) => *mode == registration.mode,
            HookSelector::Primitive(primitive) => *primitive == registration.primitive,
        }
    }
}

impl TryFrom<String> for HookSelector {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        if name == "all" {
            return Ok(HookSelector::All);
        }
        if let Some(mode) = DetectionMode::from_name(&name) {
            return Ok(HookSelector::Mode(mode));
        }
        if let Some(primitive) = Primitive::from_name(&name) {
            return Ok(HookSelector::Primitive(primitive));
        }
        Err(format!("unknown hook '{}'", name))
    }
}

/// Registrations grouped by primitive, each group in evaluation order.
pub struct HookRegistry {
    hooks: HashMap<Primitive, Vec<Arc<dyn Detector>>>,
    registrations: Vec<Registration>,
}

impl HookRegistry {
    /// Register every detector for every primitive, minus the ignored pairs.
    ///
    /// Detectors are ordered by mode, so the webshell check always runs
    /// before the policy check.
    pub fn new(mut detectors: Vec<Arc<dyn Detector>>, ignore: &[HookSelector]) -> Self {
        detectors.sort_by_key(|d| d.mode());

        let mut hooks: HashMap<Primitive, Vec<Arc<dyn Detector>>> = HashMap::new();
        let mut registrations = Vec::new();

        for primitive in Primitive::ALL {
            for detector in &detectors {
                let registration = Registration {
                    primitive,
                    mode: detector.mode(),
                };
                if ignore.iter().any(|s| s.matches(&registration)) {
                    debug!("Hook {} disabled by configuration", registration);
                    continue;
                }
                hooks
                    .entry(primitive)
                    .or_default()
                    .push(Arc::clone(detector));
                registrations.push(registration);
            }
        }

        info!(
            "Registered {} command hook(s) on {} primitive(s)",
            registrations.len(),
            hooks.len()
        );

        Self {
            hooks,
            registrations,
        }
    }

    /// Detectors for `primitive`, in evaluation order.
    pub fn detectors_for(&self, primitive: Primitive) -> &[Arc<dyn Detector>] {
        self.hooks.get(&primitive).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Primitives with at least one enabled registration, in registration order.
    pub fn primitives(&self) -> Vec<Primitive> {
        Primitive::ALL
            .into_iter()
            .filter(|p| self.hooks.contains_key(p))
            .collect()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
