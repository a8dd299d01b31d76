//! Storage traits consumed by the notification engine.
//!
//! Each trait covers one persisted concern. Implementations exist for
//! PostgreSQL ([`crate::repositories`]) and for an in-process store
//! ([`crate::memory`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use notify_core::result::AppResult;
use notify_entity::{
    Channel, Comment, DeliveryRecord, Interaction, Notification, NotificationPreference,
    SpamGuardRecord, SpamKey,
};

/// Persisted notifications (`notifications`).
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new notification.
    async fn insert(&self, notification: &Notification) -> AppResult<()>;

    /// Newest-first slice of a recipient's notifications.
    async fn list(
        &self,
        user_email: &str,
        unread_only: bool,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<Notification>>;

    /// Count a recipient's notifications.
    async fn count(&self, user_email: &str, unread_only: bool) -> AppResult<u64>;

    /// Count a recipient's notifications created at or after `since`.
    async fn count_since(&self, user_email: &str, since: DateTime<Utc>) -> AppResult<u64>;

    /// Mark one notification read. Returns `false` when no row matched.
    async fn mark_read(
        &self,
        id: &str,
        user_email: &str,
        channel: Channel,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Mark every unread notification of a recipient read.
    async fn mark_all_read(&self, user_email: &str, at: DateTime<Utc>) -> AppResult<u64>;
}

/// Per-user preference records (`user_notification_preferences`).
#[async_trait]
pub trait PreferenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the record for `user_email`, if one exists.
    async fn find(&self, user_email: &str) -> AppResult<Option<NotificationPreference>>;

    /// Insert or replace the record.
    async fn upsert(&self, preference: &NotificationPreference)
    -> AppResult<NotificationPreference>;
}

/// Duplicate-notification markers (`notification_spam_prevention`).
#[async_trait]
pub trait SpamGuardStore: Send + Sync + std::fmt::Debug + 'static {
    /// Most recent record for `key` created after `since`.
    async fn latest_since(
        &self,
        key: &SpamKey,
        since: DateTime<Utc>,
    ) -> AppResult<Option<SpamGuardRecord>>;

    /// Write a marker for a freshly created notification.
    async fn insert(&self, record: &SpamGuardRecord) -> AppResult<()>;
}

/// Append-only delivery audit (`notification_deliveries`).
#[async_trait]
pub trait DeliveryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append one attempt.
    async fn insert(&self, record: &DeliveryRecord) -> AppResult<()>;

    /// All attempts recorded for a notification.
    async fn find_for_notification(&self, notification_id: &str) -> AppResult<Vec<DeliveryRecord>>;
}

/// Read-only view of subject ownership and the interaction/comment history
/// on those subjects.
#[async_trait]
pub trait ActivityStore: Send + Sync + std::fmt::Debug + 'static {
    /// Ids of the subjects `owner_email` owns.
    async fn owned_subject_ids(&self, owner_email: &str) -> AppResult<Vec<String>>;

    /// Interactions on `subject_ids` not authored by `exclude_actor`, newest first.
    async fn interactions_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<Vec<Interaction>>;

    /// Comments on `subject_ids` not authored by `exclude_actor`, newest first.
    async fn comments_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<Vec<Comment>>;

    /// Count of [`ActivityStore::interactions_on`].
    async fn count_interactions_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<u64>;

    /// Count of [`ActivityStore::comments_on`].
    async fn count_comments_on(&self, subject_ids: &[String], exclude_actor: &str)
    -> AppResult<u64>;
}

/// Secondary ticket/order notifications merged into primary listings.
#[async_trait]
pub trait TransactionalStore: Send + Sync + std::fmt::Debug + 'static {
    /// Newest-first, at most `limit` rows.
    async fn list(
        &self,
        user_email: &str,
        unread_only: bool,
        limit: u64,
    ) -> AppResult<Vec<Notification>>;

    /// Count a recipient's rows.
    async fn count(&self, user_email: &str, unread_only: bool) -> AppResult<u64>;
}
