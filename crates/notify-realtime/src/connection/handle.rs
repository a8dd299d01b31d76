//! Handle to one live WebSocket session.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, mpsc};
use uuid::Uuid;

use crate::message::ServerEvent;

/// Sender side of a session plus its identity.
#[derive(Debug)]
pub struct SessionHandle {
    /// Unique session ID.
    pub id: Uuid,
    /// Authenticated identity.
    pub user_email: String,
    /// Display name from the credential.
    pub display_name: Option<String>,
    /// When the session was registered.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<ServerEvent>,
    alive: AtomicBool,
    closed: Notify,
}

impl SessionHandle {
    /// Create a new handle.
    pub fn new(
        user_email: String,
        display_name: Option<String>,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_email,
            display_name,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
            closed: Notify::new(),
        }
    }

    /// Queue an event for the client. Returns `false` when the session is
    /// closed or its buffer is full.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(session_id = %self.id, "Session send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Whether the session can still receive events.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the session dead without signalling the socket task.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Mark dead and wake the socket task so it closes the connection.
    pub fn close(&self) {
        self.mark_dead();
        self.closed.notify_one();
    }

    /// Resolves once [`SessionHandle::close`] has been called.
    pub async fn closed(&self) {
        self.closed.notified().await;
    }
}
