//! Notification query sources.
//!
//! The engine reads from a [`PrimarySource`] and switches to the
//! [`FallbackSynthesizer`] when the primary is empty or unreachable. Both
//! implement [`NotificationSource`] so the engine composes them without a
//! second retrieval path.

pub mod fallback;
pub mod primary;

use async_trait::async_trait;

use notify_core::result::AppResult;
use notify_core::types::PageRequest;
use notify_entity::{NotificationPage, UnreadCount};

pub use fallback::FallbackSynthesizer;
pub use primary::PrimarySource;

/// A readable set of notifications for a recipient.
#[async_trait]
pub trait NotificationSource: Send + Sync + std::fmt::Debug + 'static {
    /// One page, newest first, with the total count.
    async fn page(
        &self,
        user_email: &str,
        request: &PageRequest,
        unread_only: bool,
    ) -> AppResult<NotificationPage>;

    /// Number of unread notifications.
    async fn unread_count(&self, user_email: &str) -> AppResult<UnreadCount>;
}
