//! Spam guard records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::ActionType;

/// Identity of a duplicate-notification tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpamKey {
    /// Recipient email.
    pub user_email: String,
    /// Actor email; `None` for system notifications.
    pub actor_email: Option<String>,
    /// Action that triggered the notification.
    pub action_type: ActionType,
    /// Subject reference (e.g. media id).
    pub subject_id: Option<String>,
}

/// Marker written each time a notification is created for a [`SpamKey`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamGuardRecord {
    /// Tuple this record guards.
    #[serde(flatten)]
    pub key: SpamKey,
    /// When the guarded notification was created.
    pub created_at: DateTime<Utc>,
}
