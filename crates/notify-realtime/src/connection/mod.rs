//! Connection lifecycle: handshake, per-session handles, the registry, and
//! keepalive.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod registry;

pub use authenticator::{AuthenticatedUser, HandshakeError, WsAuthenticator};
pub use handle::SessionHandle;
pub use registry::ConnectionRegistry;
