//! Real-time push seam between the engine and the connection layer.

use async_trait::async_trait;

use notify_entity::Notification;

/// Something that can push a finished notification to an online recipient.
#[async_trait]
pub trait RealtimePush: Send + Sync + std::fmt::Debug + 'static {
    /// Push `notification` to `recipient`. Returns `false` when the
    /// recipient has no live session.
    async fn deliver(&self, recipient: &str, notification: &Notification) -> bool;
}

/// Push target that is never connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPush;

#[async_trait]
impl RealtimePush for NoopPush {
    async fn deliver(&self, _recipient: &str, _notification: &Notification) -> bool {
        false
    }
}
