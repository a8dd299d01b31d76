//! Channel delivery sinks.
//!
//! Email and push providers live outside the engine. A sink is the opaque
//! boundary the engine hands a notification to.

use async_trait::async_trait;
use tracing::info;

use notify_core::result::AppResult;
use notify_entity::{Channel, Notification};

/// Hands a notification to one delivery channel.
#[async_trait]
pub trait DeliverySink: Send + Sync + std::fmt::Debug + 'static {
    /// Attempt delivery once. Errors are recorded, never retried.
    async fn send(&self, notification: &Notification) -> AppResult<()>;
}

/// In-app delivery: the persisted row is the inbox entry, so there is
/// nothing left to do.
#[derive(Debug, Clone, Copy, Default)]
pub struct InAppSink;

#[async_trait]
impl DeliverySink for InAppSink {
    async fn send(&self, _notification: &Notification) -> AppResult<()> {
        Ok(())
    }
}

/// Sink that only logs. Default for email and push.
#[derive(Debug, Clone, Copy)]
pub struct LoggingSink {
    channel: Channel,
}

impl LoggingSink {
    /// Sink logging deliveries for `channel`.
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl DeliverySink for LoggingSink {
    async fn send(&self, notification: &Notification) -> AppResult<()> {
        info!(
            channel = %self.channel,
            notification_id = %notification.id,
            recipient = %notification.user_email,
            message = %notification.message,
            "Delivering notification"
        );
        Ok(())
    }
}
