//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use notify_database::DatabaseStatus;

use crate::state::AppState;

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `"connected"`, `"unreachable"`, or `"not_configured"`.
    pub database: String,
    /// Live WebSocket sessions.
    pub ws_connections: usize,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match &state.db {
        Some(db) => Some(db.ping().await),
        None => None,
    };
    let database = status.map_or("not_configured", |s| s.as_str());

    Json(HealthResponse {
        status: if status == Some(DatabaseStatus::Unreachable) {
            "degraded"
        } else {
            "ok"
        }
        .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        ws_connections: state.realtime.registry.connection_count(),
    })
}
