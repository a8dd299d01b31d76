//! In-process store implementing every store trait.
//!
//! Used when `engine.store = "memory"` and by the test suites. Each storage
//! area can be switched into a failing state to exercise degraded paths.

mod store;

pub use store::{MemoryStore, StoreArea};
