//! Delivery audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel::Channel;

/// Result of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Handed to the channel successfully.
    Sent,
    /// The channel sink returned an error.
    Failed,
}

impl DeliveryStatus {
    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// One delivery attempt of a notification through one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Unique record id.
    pub id: Uuid,
    /// Delivered notification.
    pub notification_id: String,
    /// Channel attempted.
    pub channel: Channel,
    /// Attempt result.
    pub status: DeliveryStatus,
    /// Attempt number (attempts are never retried, so always 1 today).
    pub attempts: i32,
    /// Sink error message for failed attempts.
    pub error: Option<String>,
    /// When the attempt happened.
    pub created_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Build a record for a first attempt.
    pub fn first_attempt(
        notification_id: &str,
        channel: Channel,
        result: Result<(), String>,
        at: DateTime<Utc>,
    ) -> Self {
        let (status, error) = match result {
            Ok(()) => (DeliveryStatus::Sent, None),
            Err(e) => (DeliveryStatus::Failed, Some(e)),
        };
        Self {
            id: Uuid::new_v4(),
            notification_id: notification_id.to_string(),
            channel,
            status,
            attempts: 1,
            error,
            created_at: at,
        }
    }
}
