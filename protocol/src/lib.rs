//! Common types shared between the shellguard agent and policy engine.

pub mod event;
pub mod protocol;

pub use event::*;
pub use protocol::*;
