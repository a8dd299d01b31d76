//! # notify-api
//!
//! HTTP surface of the notification engine built on Axum: the `/ws`
//! upgrade endpoint carrying the real-time protocol and `/api/health`.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
