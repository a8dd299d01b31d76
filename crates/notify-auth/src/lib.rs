//! # notify-auth
//!
//! Bearer credential handling for the real-time handshake.
//!
//! ## Modules
//!
//! - `jwt`: access token creation and validation

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
