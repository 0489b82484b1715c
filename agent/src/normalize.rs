//! Argument normalization: turn raw hook arguments into one command line.
//!
//! Single-string primitives carry the command as their first argument.
//! Argument-list primitives carry a program token plus an optional list that
//! is space-joined onto it. Anything that does not fit the shape yields
//! `None` and the call is left alone.

use shellguard_protocol::{CallShape, InterceptedCall, Value};
use thiserror::Error;

/// Separator between the program token and each joined argument.
pub const ARG_SEPARATOR: &str = " ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("nothing to join")]
    Empty,

    #[error("element {0} has no string form")]
    NotStringConvertible(usize),
}

/// Join list elements with `sep`, converting scalars to their string form.
pub fn join_with_separator(values: &[Value], sep: &str) -> Result<String, JoinError> {
    if values.is_empty() {
        return Err(JoinError::Empty);
    }
    let mut parts = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        parts.push(
            value
                .to_joinable()
                .ok_or(JoinError::NotStringConvertible(idx))?,
        );
    }
    Ok(parts.join(sep))
}

/// The command string of a single-string call: the first argument, if it is a string.
pub fn single_string(arguments: &[Value]) -> Option<String> {
    arguments.first()?.as_str().map(str::to_owned)
}

/// The command line of an argument-list call.
///
/// A second argument that is present but not a list makes the call
/// unreadable (`None`); a list that cannot be joined falls back to the token.
pub fn string_plus_arg_list(arguments: &[Value]) -> Option<String> {
    let token = arguments.first()?.as_str()?;

    let Some(second) = arguments.get(1) else {
        return Some(token.to_owned());
    };
    let list = second.as_list()?;

    match join_with_separator(list, ARG_SEPARATOR) {
        Ok(joined) => Some(format!("{}{}{}", token, ARG_SEPARATOR, joined)),
        Err(e) => {
            log::debug!("Argument list not joinable ({}), using command token only", e);
            Some(token.to_owned())
        }
    }
}

/// Extract the command value using the rule for `shape`.
pub fn command_value(shape: CallShape, arguments: &[Value]) -> Option<String> {
    match shape {
        CallShape::SingleString => single_string(arguments),
        CallShape::StringPlusArgList => string_plus_arg_list(arguments),
    }
}

/// Extract the command value using the primitive's own shape.
pub fn normalize(call: &InterceptedCall) -> Option<String> {
    command_value(call.primitive.shape(), &call.arguments)
}
