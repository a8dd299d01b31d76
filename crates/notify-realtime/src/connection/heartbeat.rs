//! Periodic ping for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use super::handle::SessionHandle;
use crate::message::ServerEvent;

/// Send a ping every `interval` until the session dies.
pub async fn run_heartbeat(handle: Arc<SessionHandle>, interval: Duration) {
    let mut ticker = time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if !handle.is_alive() {
            break;
        }

        if !handle.send(ServerEvent::Ping {
            timestamp: Utc::now(),
        }) {
            tracing::debug!(session_id = %handle.id, "Ping send failed");
            break;
        }
    }

    tracing::debug!(session_id = %handle.id, "Heartbeat loop ended");
}
