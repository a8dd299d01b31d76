//! Bundle of store handles handed to the engine.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use notify_core::config::{AppConfig, StoreBackend};
use notify_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    ActivityRepository, DeliveryRepository, NotificationRepository, PreferenceRepository,
    SpamGuardRepository, TransactionalRepository,
};
use crate::store::{
    ActivityStore, DeliveryStore, NotificationStore, PreferenceStore, SpamGuardStore,
    TransactionalStore,
};

/// One handle per persisted concern.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Notification rows.
    pub notifications: Arc<dyn NotificationStore>,
    /// Preference records.
    pub preferences: Arc<dyn PreferenceStore>,
    /// Spam guard markers.
    pub spam_guard: Arc<dyn SpamGuardStore>,
    /// Delivery audit.
    pub deliveries: Arc<dyn DeliveryStore>,
    /// Subject ownership and interaction history.
    pub activity: Arc<dyn ActivityStore>,
    /// Ticket/order notifications.
    pub transactional: Arc<dyn TransactionalStore>,
}

impl Stores {
    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            preferences: Arc::new(PreferenceRepository::new(pool.clone())),
            spam_guard: Arc::new(SpamGuardRepository::new(pool.clone())),
            deliveries: Arc::new(DeliveryRepository::new(pool.clone())),
            activity: Arc::new(ActivityRepository::new(pool.clone())),
            transactional: Arc::new(TransactionalRepository::new(pool)),
        }
    }

    /// Every concern served by the same in-memory store.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            notifications: store.clone(),
            preferences: store.clone(),
            spam_guard: store.clone(),
            deliveries: store.clone(),
            activity: store.clone(),
            transactional: store,
        }
    }

    /// Build the backend selected by `engine.store`.
    ///
    /// Returns the pool alongside the stores when PostgreSQL is used so the
    /// caller can close it on shutdown.
    pub async fn from_config(config: &AppConfig) -> AppResult<(Self, Option<DatabasePool>)> {
        match config.engine.store {
            StoreBackend::Memory => {
                info!("Using in-memory notification store");
                Ok((Self::memory(Arc::new(MemoryStore::new())), None))
            }
            StoreBackend::Postgres => {
                let db = DatabasePool::connect(&config.database).await?;
                if config.database.run_migrations {
                    db.migrate().await?;
                }
                Ok((Self::postgres(db.pool().clone()), Some(db)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_needs_no_pool() {
        let mut config = AppConfig::default();
        config.engine.store = StoreBackend::Memory;
        let (stores, pool) = Stores::from_config(&config).await.unwrap();
        assert!(pool.is_none());
        assert_eq!(stores.notifications.count("a@example.com", false).await.unwrap(), 0);
    }
}
