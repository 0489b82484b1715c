use std::sync::Arc;

use log::debug;
use shellguard_protocol::{InterceptedCall, SecurityEvent};

use super::{DetectionMode, Detector};
use crate::error::CollaboratorError;
use crate::event::webshell_event;
use crate::normalize;
use crate::taint::TaintPredicate;

/// Reports commands that are byte-identical to request input.
///
/// Only the direct string argument is checked, never a joined argument list.
pub struct WebshellDetector {
    taint: Arc<dyn TaintPredicate>,
}

impl WebshellDetector {
    pub fn new(taint: Arc<dyn TaintPredicate>) -> Self {
        Self { taint }
    }
}

impl Detector for WebshellDetector {
    fn mode(&self) -> DetectionMode {
        DetectionMode::Webshell
    }

    fn evaluate(&self, call: &InterceptedCall) -> Result<Option<SecurityEvent>, CollaboratorError> {
        let Some(command) = normalize::single_string(&call.arguments) else {
            debug!("{}: no string command argument, skipping webshell check", call.primitive);
            return Ok(None);
        };

        if !self.taint.is_tainted_by_request(&command)? {
            return Ok(None);
        }

        Ok(Some(webshell_event(command)))
    }
}
