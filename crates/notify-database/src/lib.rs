//! # notify-database
//!
//! Storage seams for the notification engine. [`store`] defines one async
//! trait per persisted concern; [`repositories`] implements them against
//! PostgreSQL and [`memory`] implements them in-process. [`Stores`] bundles
//! the configured implementation for the engine.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;
pub mod stores;

pub use connection::{DatabasePool, DatabaseStatus};
pub use memory::{MemoryStore, StoreArea};
pub use store::{
    ActivityStore, DeliveryStore, NotificationStore, PreferenceStore, SpamGuardStore,
    TransactionalStore,
};
pub use stores::Stores;
