//! # notify-realtime
//!
//! Real-time delivery for the notification engine: one live WebSocket
//! session per user identity, bearer-credential handshake, and the JSON
//! event protocol spoken over the socket.

pub mod connection;
pub mod gateway;
pub mod message;
pub mod server;

pub use connection::{ConnectionRegistry, HandshakeError, SessionHandle, WsAuthenticator};
pub use gateway::RealtimeGateway;
pub use message::{ClientEvent, ServerEvent};
pub use server::RealtimeHub;
