//! Request taint membership.

use std::collections::HashSet;

use crate::error::CollaboratorError;

/// Answers whether a value appears in the current request's input.
pub trait TaintPredicate: Send + Sync {
    fn is_tainted_by_request(&self, value: &str) -> Result<bool, CollaboratorError>;
}

impl<F> TaintPredicate for F
where
    F: Fn(&str) -> Result<bool, CollaboratorError> + Send + Sync,
{
    fn is_tainted_by_request(&self, value: &str) -> Result<bool, CollaboratorError> {
        self(value)
    }
}

/// Where a request value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Query,
    Body,
    Header,
    Cookie,
}

/// A fixed set of input values, matched exactly.
///
/// The agent holds its predicate for its whole lifetime, so a `RequestInput`
/// suits an agent built per request and tests. Long-lived hosts implement
/// [`TaintPredicate`] over their own current-request state instead.
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
    values: HashSet<String>,
}

impl RequestInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the values of one input source. Empty strings are not tracked.
    pub fn add<I, S>(&mut self, source: InputSource, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.values.len();
        self.values
            .extend(values.into_iter().map(Into::into).filter(|v| !v.is_empty()));
        log::trace!(
            "Tracked {} {:?} value(s)",
            self.values.len() - before,
            source
        );
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TaintPredicate for RequestInput {
    fn is_tainted_by_request(&self, value: &str) -> Result<bool, CollaboratorError> {
        Ok(self.values.contains(value))
    }
}
