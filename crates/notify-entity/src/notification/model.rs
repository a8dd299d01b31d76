//! Notification entity model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::ActionType;
use super::channel::Channel;
use super::priority::Priority;

/// Prefix carried by every synthesized (non-persisted) notification id.
pub const FALLBACK_ID_PREFIX: &str = "fallback_";

/// A notification delivered to a user.
///
/// Persisted notifications carry a UUID id. Fallback notifications are
/// synthesized from interaction/comment history, carry an id starting with
/// [`FALLBACK_ID_PREFIX`], and have `is_fallback` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: String,
    /// Recipient identity.
    pub user_email: String,
    /// Identity of the user who acted; `None` for system notifications.
    pub actor_email: Option<String>,
    /// Action that triggered this notification.
    pub action_type: ActionType,
    /// Subject reference (e.g. media id).
    pub subject_id: Option<String>,
    /// Subject title, used when rendering messages.
    pub subject_title: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Channel the notification was routed to.
    pub channel: Channel,
    /// Priority level.
    #[serde(default)]
    pub priority: Priority,
    /// Free-form key/value metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Whether the user has read this notification.
    #[serde(default)]
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// Per-channel read markers.
    #[serde(default)]
    pub read_channels: BTreeMap<Channel, DateTime<Utc>>,
    /// Set on records synthesized from interaction/comment history.
    #[serde(default)]
    pub is_fallback: bool,
}

impl Notification {
    /// Generate a fresh id for a persisted notification.
    pub fn new_id() -> String {
        Uuid::now_v7().to_string()
    }

    /// Check if the notification has been read.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Apply a read marker for `channel` at `at`.
    pub fn mark_read(&mut self, channel: Channel, at: DateTime<Utc>) {
        self.is_read = true;
        self.read_at.get_or_insert(at);
        self.read_channels.insert(channel, at);
    }

    /// Deterministic synthetic id for a record derived from source data.
    pub fn synthetic_id(kind: &str, source_id: &str) -> String {
        format!("{FALLBACK_ID_PREFIX}{kind}_{source_id}")
    }

    /// Whether `id` belongs to a synthesized record.
    pub fn is_synthetic_id(id: &str) -> bool {
        id.starts_with(FALLBACK_ID_PREFIX)
    }
}

/// Echo returned by mark-as-read operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadReceipt {
    /// Notification that was marked.
    pub notification_id: String,
    /// Always `true` on success.
    pub is_read: bool,
    /// Marker timestamp.
    pub read_at: DateTime<Utc>,
    /// Channel the read was recorded for.
    pub channel: Channel,
    /// `true` when the id was synthetic and storage was not touched.
    pub synthetic: bool,
}
