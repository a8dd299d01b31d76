//! WebSocket event protocol.

pub mod types;
pub mod validator;

pub use types::{ClientEvent, ServerEvent};
