//! Identity-to-session map.
//!
//! At most one live session per identity: registering replaces and closes
//! any previous session. Entries are only removed by the session that owns
//! them, so a late disconnect of a replaced session never evicts its
//! successor.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

use notify_entity::Notification;
use notify_service::RealtimePush;

use super::handle::SessionHandle;
use crate::message::ServerEvent;

/// Live sessions keyed by user identity.
#[derive(Debug)]
pub struct ConnectionRegistry {
    sessions: DashMap<String, Arc<SessionHandle>>,
    buffer_size: usize,
}

impl ConnectionRegistry {
    /// Creates an empty registry whose sessions buffer `buffer_size` events.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Register a session for `user_email`, replacing any existing one.
    ///
    /// Returns the handle and the receiver the socket task drains.
    pub fn register(
        &self,
        user_email: &str,
        display_name: Option<String>,
    ) -> (Arc<SessionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = Arc::new(SessionHandle::new(user_email.to_string(), display_name, tx));

        if let Some(previous) = self.sessions.insert(user_email.to_string(), handle.clone()) {
            info!(
                user = %user_email,
                replaced = %previous.id,
                session_id = %handle.id,
                "Replacing existing session"
            );
            previous.close();
        } else {
            info!(user = %user_email, session_id = %handle.id, "Session registered");
        }

        (handle, rx)
    }

    /// Remove `handle` if it is still the registered session for its user.
    pub fn unregister(&self, handle: &SessionHandle) -> bool {
        handle.mark_dead();
        let removed = self
            .sessions
            .remove_if(&handle.user_email, |_, current| current.id == handle.id)
            .is_some();
        if removed {
            info!(user = %handle.user_email, session_id = %handle.id, "Session unregistered");
        }
        removed
    }

    /// Send an event to one user. No-op returning `false` when offline.
    pub fn push_to_user(&self, user_email: &str, event: ServerEvent) -> bool {
        let Some(handle) = self.sessions.get(user_email).map(|h| h.clone()) else {
            debug!(user = %user_email, event = event.name(), "User offline, event dropped");
            return false;
        };
        handle.send(event)
    }

    /// Send an event to every session. Returns how many accepted it.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        let handles: Vec<Arc<SessionHandle>> =
            self.sessions.iter().map(|e| e.value().clone()).collect();
        handles.iter().filter(|h| h.send(event.clone())).count()
    }

    /// Whether `user_email` has a live session.
    pub fn is_online(&self, user_email: &str) -> bool {
        self.sessions
            .get(user_email)
            .is_some_and(|h| h.is_alive())
    }

    /// Identities with a registered session, sorted.
    pub fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        users.sort();
        users
    }

    /// Number of registered sessions.
    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// Evict and close a user's session.
    pub fn force_disconnect(&self, user_email: &str) -> bool {
        match self.sessions.remove(user_email) {
            Some((_, handle)) => {
                handle.close();
                info!(user = %user_email, session_id = %handle.id, "Session force-disconnected");
                true
            }
            None => false,
        }
    }

    /// Close every session.
    pub fn close_all(&self) {
        let users: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for user in &users {
            self.force_disconnect(user);
        }
        info!(count = users.len(), "Closed all sessions");
    }
}

#[async_trait]
impl RealtimePush for ConnectionRegistry {
    async fn deliver(&self, recipient: &str, notification: &Notification) -> bool {
        self.push_to_user(recipient, ServerEvent::NewNotification(notification.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_to_offline_user_is_noop() {
        let registry = ConnectionRegistry::new(8);
        assert!(!registry.push_to_user("r@example.com", ServerEvent::error("x")));
        assert!(!registry.is_online("r@example.com"));
    }

    #[tokio::test]
    async fn test_new_session_replaces_old() {
        let registry = ConnectionRegistry::new(8);
        let (first, _rx1) = registry.register("r@example.com", None);
        let (second, mut rx2) = registry.register("r@example.com", None);

        assert!(!first.is_alive());
        assert_eq!(registry.connection_count(), 1);

        // The replaced session's disconnect must not evict the new one.
        assert!(!registry.unregister(&first));
        assert!(registry.is_online("r@example.com"));

        assert!(registry.push_to_user("r@example.com", ServerEvent::error("hi")));
        assert!(matches!(rx2.recv().await, Some(ServerEvent::Error { .. })));

        assert!(registry.unregister(&second));
        assert!(!registry.is_online("r@example.com"));
    }

    #[tokio::test]
    async fn test_broadcast_and_force_disconnect() {
        let registry = ConnectionRegistry::new(8);
        let (_a, mut rx_a) = registry.register("a@example.com", None);
        let (b, _rx_b) = registry.register("b@example.com", None);
        assert_eq!(registry.online_users(), vec!["a@example.com", "b@example.com"]);

        assert!(registry.force_disconnect("b@example.com"));
        assert!(!b.is_alive());
        assert!(!registry.force_disconnect("b@example.com"));

        assert_eq!(registry.broadcast(ServerEvent::error("all")), 1);
        assert!(rx_a.recv().await.is_some());

        registry.close_all();
        assert_eq!(registry.connection_count(), 0);
    }
}
