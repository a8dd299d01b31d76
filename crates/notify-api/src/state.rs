//! Application state shared across all handlers.

use std::sync::Arc;

use notify_core::config::AppConfig;
use notify_database::DatabasePool;
use notify_realtime::RealtimeHub;
use notify_service::NotificationEngine;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool; `None` on the in-memory backend.
    pub db: Option<DatabasePool>,
    /// Notification engine.
    pub engine: Arc<NotificationEngine>,
    /// Real-time hub.
    pub realtime: Arc<RealtimeHub>,
}
