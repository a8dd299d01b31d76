//! # notify-core
//!
//! Core crate for the notification engine. Contains configuration schemas,
//! pagination types, the tagged [`Outcome`] result used by degradable
//! operations, and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod outcome;
pub mod result;
pub mod types;

pub use error::AppError;
pub use outcome::Outcome;
pub use result::AppResult;
