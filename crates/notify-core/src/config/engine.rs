//! Notification engine configuration.

use serde::{Deserialize, Serialize};

/// Which storage backend the engine runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// PostgreSQL via sqlx.
    Postgres,
    /// In-process store; state is lost on restart.
    Memory,
}

/// Notification engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage backend.
    #[serde(default = "default_store")]
    pub store: StoreBackend,
    /// Page size used when a caller does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound on a requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Merge ticket/order notifications into listings and unread counts.
    #[serde(default = "default_true")]
    pub include_transactional: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            include_transactional: true,
        }
    }
}

fn default_store() -> StoreBackend {
    StoreBackend::Postgres
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    100
}

fn default_true() -> bool {
    true
}
