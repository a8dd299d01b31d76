//! Preference loading with lazy defaults and whitelisted updates.

pub mod service;

pub use service::PreferenceService;
