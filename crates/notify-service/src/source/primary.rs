//! Persisted notifications, optionally merged with transactional ones.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use notify_core::result::AppResult;
use notify_core::types::PageRequest;
use notify_database::{NotificationStore, TransactionalStore};
use notify_entity::{Notification, NotificationPage, SourceTag, UnreadCount};

use super::NotificationSource;

/// Reads the notification store. When a transactional store is attached its
/// rows are unioned in by creation time.
#[derive(Debug, Clone)]
pub struct PrimarySource {
    notifications: Arc<dyn NotificationStore>,
    transactional: Option<Arc<dyn TransactionalStore>>,
}

impl PrimarySource {
    /// Creates a new primary source.
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        transactional: Option<Arc<dyn TransactionalStore>>,
    ) -> Self {
        Self {
            notifications,
            transactional,
        }
    }

    async fn transactional_rows(
        &self,
        user_email: &str,
        unread_only: bool,
        limit: u64,
    ) -> (Vec<Notification>, u64) {
        let Some(store) = &self.transactional else {
            return (Vec::new(), 0);
        };
        let (rows, count) = tokio::join!(
            store.list(user_email, unread_only, limit),
            store.count(user_email, unread_only)
        );
        match (rows, count) {
            (Ok(rows), Ok(count)) => (rows, count),
            (Err(e), _) | (_, Err(e)) => {
                warn!(user = %user_email, error = %e, "Transactional notifications unavailable");
                (Vec::new(), 0)
            }
        }
    }
}

#[async_trait]
impl NotificationSource for PrimarySource {
    async fn page(
        &self,
        user_email: &str,
        request: &PageRequest,
        unread_only: bool,
    ) -> AppResult<NotificationPage> {
        if self.transactional.is_none() {
            let rows = self
                .notifications
                .list(user_email, unread_only, request.offset(), request.limit())
                .await?;
            let total = self.notifications.count(user_email, unread_only).await?;
            return Ok(NotificationPage::new(rows, request, total, SourceTag::Primary));
        }

        // Both sides must supply every row up to the end of the page before
        // the merged list can be sliced.
        let window = request.end();
        let mut rows = self
            .notifications
            .list(user_email, unread_only, 0, window)
            .await?;
        let total = self.notifications.count(user_email, unread_only).await?;

        let (extra, extra_total) = self.transactional_rows(user_email, unread_only, window).await;
        rows.extend(extra);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(NotificationPage::new(
            request.slice(rows),
            request,
            total + extra_total,
            SourceTag::Primary,
        ))
    }

    async fn unread_count(&self, user_email: &str) -> AppResult<UnreadCount> {
        let count = self.notifications.count(user_email, true).await?;
        let extra = match &self.transactional {
            Some(store) => store.count(user_email, true).await.unwrap_or_else(|e| {
                warn!(user = %user_email, error = %e, "Transactional unread count unavailable");
                0
            }),
            None => 0,
        };
        Ok(UnreadCount {
            count: count + extra,
            source: SourceTag::Primary,
        })
    }
}
