//! Client and server event definitions.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notify_entity::{
    Channel, Notification, NotificationPage, NotificationPreference, PreferenceUpdate,
    ReadReceipt, SourceTag,
};

/// Events sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Request a page of notifications.
    GetNotifications {
        /// 1-based page number.
        #[serde(default)]
        page: Option<u64>,
        /// Page size.
        #[serde(default)]
        limit: Option<u64>,
        /// Only unread notifications.
        #[serde(default, alias = "unreadOnly")]
        unread_only: bool,
    },
    /// Mark one notification read.
    MarkNotificationRead {
        /// Notification to mark.
        #[serde(rename = "notificationId", alias = "notification_id")]
        notification_id: String,
        /// Channel the read happened on; in-app when absent.
        #[serde(default)]
        channel: Option<Channel>,
    },
    /// Mark every notification read.
    MarkAllRead,
    /// Request current preferences.
    GetNotificationPreferences,
    /// Partial preference update. Unknown fields are ignored.
    UpdateNotificationPreferences(PreferenceUpdate),
    /// Reply to a server ping.
    Pong,
}

/// Events sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A notification was just created for this user.
    NewNotification(Notification),
    /// Current unread count.
    UnreadCount {
        /// Number of unread notifications.
        count: u64,
        /// Where the count came from.
        source: SourceTag,
    },
    /// Answer to `get_notifications`.
    NotificationsList(NotificationPage),
    /// Answer to `mark_notification_read`.
    NotificationMarkedRead(ReadReceipt),
    /// Answer to `mark_all_read`.
    AllNotificationsMarkedRead {
        /// Rows updated.
        updated: u64,
    },
    /// Answer to `get_notification_preferences`.
    NotificationPreferences(NotificationPreference),
    /// Answer to `update_notification_preferences`.
    NotificationPreferencesUpdated(NotificationPreference),
    /// Broadcast to every connected user.
    SystemNotification {
        /// Broadcast ID.
        id: Uuid,
        /// Title.
        title: String,
        /// Body.
        message: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A client request failed.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// Keepalive.
    Ping {
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewNotification(_) => "new_notification",
            Self::UnreadCount { .. } => "unread_count",
            Self::NotificationsList(_) => "notifications_list",
            Self::NotificationMarkedRead(_) => "notification_marked_read",
            Self::AllNotificationsMarkedRead { .. } => "all_notifications_marked_read",
            Self::NotificationPreferences(_) => "notification_preferences",
            Self::NotificationPreferencesUpdated(_) => "notification_preferences_updated",
            Self::SystemNotification { .. } => "system_notification",
            Self::Error { .. } => "error",
            Self::Ping { .. } => "ping",
        }
    }

    /// Shorthand for an error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_shapes() {
        let raw = r#"{"event":"mark_notification_read","data":{"notificationId":"fallback_comment_3"}}"#;
        match serde_json::from_str::<ClientEvent>(raw).unwrap() {
            ClientEvent::MarkNotificationRead {
                notification_id,
                channel,
            } => {
                assert_eq!(notification_id, "fallback_comment_3");
                assert!(channel.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }

        let raw = r#"{"event":"mark_all_read"}"#;
        assert!(matches!(
            serde_json::from_str::<ClientEvent>(raw).unwrap(),
            ClientEvent::MarkAllRead
        ));

        let raw = r#"{"event":"get_notifications","data":{"page":2,"limit":5}}"#;
        assert!(matches!(
            serde_json::from_str::<ClientEvent>(raw).unwrap(),
            ClientEvent::GetNotifications {
                page: Some(2),
                limit: Some(5),
                unread_only: false
            }
        ));
    }

    #[test]
    fn test_server_event_wire_name_matches_tag() {
        let event = ServerEvent::UnreadCount {
            count: 4,
            source: SourceTag::Primary,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["data"]["count"], 4);
    }
}
