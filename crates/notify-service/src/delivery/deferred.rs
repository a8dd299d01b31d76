//! Quiet-hours deferral.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::CreateNotification;

/// Full payload of a notification held back by quiet hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredNotification {
    /// The original creation request.
    pub request: CreateNotification,
    /// When the request was deferred.
    pub deferred_at: DateTime<Utc>,
    /// End of the recipient's quiet window (UTC time of day).
    pub quiet_hours_end: Option<NaiveTime>,
}

/// Receives deferred notifications.
#[async_trait]
pub trait DeferredDelivery: Send + Sync + std::fmt::Debug + 'static {
    /// Take ownership of a deferred payload.
    async fn defer(&self, deferred: DeferredNotification);
}

/// Logs the deferred payload and drops it. Nothing is redelivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDeferral;

#[async_trait]
impl DeferredDelivery for LoggingDeferral {
    async fn defer(&self, deferred: DeferredNotification) {
        match serde_json::to_string(&deferred) {
            Ok(payload) => info!(
                recipient = %deferred.request.recipient,
                action = %deferred.request.action_type,
                payload = %payload,
                "Notification deferred for quiet hours"
            ),
            Err(e) => warn!(
                recipient = %deferred.request.recipient,
                error = %e,
                "Notification deferred for quiet hours, payload not serializable"
            ),
        }
    }
}
