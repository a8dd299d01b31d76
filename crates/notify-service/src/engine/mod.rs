//! The notification engine: creation pipeline and query pipeline.

pub mod request;
pub mod service;

pub use request::{CreateNotification, CreateOutcome, SkipReason};
pub use service::NotificationEngine;
