//! Bridges socket events to the notification engine.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use notify_entity::Channel;
use notify_service::NotificationEngine;

use crate::connection::{ConnectionRegistry, SessionHandle};
use crate::message::validator::validate_inbound;
use crate::message::{ClientEvent, ServerEvent};

/// Handles the event exchange for connected sessions.
#[derive(Debug, Clone)]
pub struct RealtimeGateway {
    engine: Arc<NotificationEngine>,
    registry: Arc<ConnectionRegistry>,
    max_message_bytes: usize,
}

impl RealtimeGateway {
    /// Creates a new gateway.
    pub fn new(
        engine: Arc<NotificationEngine>,
        registry: Arc<ConnectionRegistry>,
        max_message_bytes: usize,
    ) -> Self {
        Self {
            engine,
            registry,
            max_message_bytes,
        }
    }

    /// Registry shared with the engine's push path.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Push the current unread count to a freshly registered session.
    pub async fn on_connected(&self, session: &SessionHandle) {
        let unread = self.engine.get_unread_count(&session.user_email).await;
        session.send(ServerEvent::UnreadCount {
            count: unread.count,
            source: unread.source,
        });
    }

    /// Process one text frame from `session` and queue the reply.
    pub async fn handle_client_text(&self, session: &SessionHandle, raw: &str) {
        if let Err(e) = validate_inbound(raw, self.max_message_bytes) {
            session.send(ServerEvent::error(e.message));
            return;
        }

        let event = match serde_json::from_str::<ClientEvent>(raw) {
            Ok(event) => event,
            Err(e) => {
                debug!(session_id = %session.id, error = %e, "Unparseable client event");
                session.send(ServerEvent::error(format!("Invalid event: {e}")));
                return;
            }
        };

        if let Some(reply) = self.handle_event(&session.user_email, event).await {
            session.send(reply);
        }
    }

    /// Answer one client event on behalf of `user_email`.
    pub async fn handle_event(&self, user_email: &str, event: ClientEvent) -> Option<ServerEvent> {
        let reply = match event {
            ClientEvent::GetNotifications {
                page,
                limit,
                unread_only,
            } => {
                let request = self.engine.page_request(page, limit);
                let result = self
                    .engine
                    .get_user_notifications(user_email, &request, unread_only)
                    .await;
                ServerEvent::NotificationsList(result)
            }
            ClientEvent::MarkNotificationRead {
                notification_id,
                channel,
            } => match self
                .engine
                .mark_as_read(&notification_id, user_email, channel.unwrap_or(Channel::InApp))
                .await
            {
                Ok(receipt) => {
                    self.push_unread_count(user_email).await;
                    ServerEvent::NotificationMarkedRead(receipt)
                }
                Err(e) => {
                    warn!(user = %user_email, notification_id = %notification_id, error = %e, "Mark-as-read failed");
                    ServerEvent::error(e.message)
                }
            },
            ClientEvent::MarkAllRead => match self.engine.mark_all_as_read(user_email).await {
                Ok(updated) => {
                    self.push_unread_count(user_email).await;
                    ServerEvent::AllNotificationsMarkedRead { updated }
                }
                Err(e) => {
                    warn!(user = %user_email, error = %e, "Mark-all-read failed");
                    ServerEvent::error(e.message)
                }
            },
            ClientEvent::GetNotificationPreferences => {
                match self.engine.get_user_preferences(user_email).await.into_result() {
                    Ok(pref) => ServerEvent::NotificationPreferences(pref),
                    Err(e) => ServerEvent::error(e.message),
                }
            }
            ClientEvent::UpdateNotificationPreferences(update) => {
                match self.engine.update_user_preferences(user_email, &update).await {
                    Ok(pref) => ServerEvent::NotificationPreferencesUpdated(pref),
                    Err(e) => {
                        warn!(user = %user_email, error = %e, "Preference update failed");
                        ServerEvent::error(e.message)
                    }
                }
            }
            ClientEvent::Pong => return None,
        };
        Some(reply)
    }

    /// Push the latest unread count to `user_email` if online.
    pub async fn push_unread_count(&self, user_email: &str) -> bool {
        if !self.registry.is_online(user_email) {
            return false;
        }
        let unread = self.engine.get_unread_count(user_email).await;
        self.registry.push_to_user(
            user_email,
            ServerEvent::UnreadCount {
                count: unread.count,
                source: unread.source,
            },
        )
    }

    /// Send a `system_notification` to every connected session.
    pub fn broadcast_system(&self, title: &str, message: &str) -> usize {
        self.registry.broadcast(ServerEvent::SystemNotification {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        })
    }
}
