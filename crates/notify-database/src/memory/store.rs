//! In-memory store backed by `tokio::sync::RwLock`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use notify_core::error::AppError;
use notify_core::result::AppResult;
use notify_entity::{
    Channel, Comment, DeliveryRecord, Interaction, Notification, NotificationPreference,
    SpamGuardRecord, SpamKey,
};

use crate::store::{
    ActivityStore, DeliveryStore, NotificationStore, PreferenceStore, SpamGuardStore,
    TransactionalStore,
};

/// Storage area that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreArea {
    /// `NotificationStore`.
    Notifications,
    /// `PreferenceStore`.
    Preferences,
    /// `SpamGuardStore`.
    SpamGuard,
    /// `DeliveryStore`.
    Deliveries,
    /// `ActivityStore`.
    Activity,
    /// `TransactionalStore`.
    Transactional,
}

#[derive(Debug, Default)]
struct MemoryState {
    notifications: Vec<Notification>,
    preferences: HashMap<String, NotificationPreference>,
    spam: Vec<SpamGuardRecord>,
    deliveries: Vec<DeliveryRecord>,
    /// subject id -> (owner email, title)
    subjects: HashMap<String, (String, String)>,
    interactions: Vec<Interaction>,
    comments: Vec<Comment>,
    transactional: Vec<Notification>,
}

/// In-memory implementation of all store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    failing: Mutex<HashSet<StoreArea>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `area` to return errors (or stop doing so).
    pub fn set_failing(&self, area: StoreArea, failing: bool) {
        let mut set = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing {
            set.insert(area);
        } else {
            set.remove(&area);
        }
    }

    fn check(&self, area: StoreArea) -> AppResult<()> {
        let set = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if set.contains(&area) {
            return Err(AppError::service_unavailable(format!(
                "{area:?} store unavailable"
            )));
        }
        Ok(())
    }

    /// Register a subject owned by `owner_email`.
    pub async fn add_subject(&self, subject_id: &str, owner_email: &str, title: &str) {
        self.state.write().await.subjects.insert(
            subject_id.to_string(),
            (owner_email.to_string(), title.to_string()),
        );
    }

    /// Record an interaction.
    pub async fn add_interaction(&self, interaction: Interaction) {
        self.state.write().await.interactions.push(interaction);
    }

    /// Record a comment.
    pub async fn add_comment(&self, comment: Comment) {
        self.state.write().await.comments.push(comment);
    }

    /// Add a ticket/order notification.
    pub async fn add_transactional(&self, notification: Notification) {
        self.state.write().await.transactional.push(notification);
    }

    /// Snapshot of every persisted notification.
    pub async fn all_notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    /// Snapshot of every spam guard record.
    pub async fn spam_records(&self) -> Vec<SpamGuardRecord> {
        self.state.read().await.spam.clone()
    }

    /// Snapshot of every delivery record.
    pub async fn delivery_records(&self) -> Vec<DeliveryRecord> {
        self.state.read().await.deliveries.clone()
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|b| std::cmp::Reverse(created_at(b)));
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        self.check(StoreArea::Notifications)?;
        self.state
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        user_email: &str,
        unread_only: bool,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<Notification>> {
        self.check(StoreArea::Notifications)?;
        let state = self.state.read().await;
        let mut rows: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_email == user_email && (!unread_only || n.is_unread()))
            .cloned()
            .collect();
        newest_first(&mut rows, |n| n.created_at);
        Ok(rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, user_email: &str, unread_only: bool) -> AppResult<u64> {
        self.check(StoreArea::Notifications)?;
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.user_email == user_email && (!unread_only || n.is_unread()))
            .count() as u64)
    }

    async fn count_since(&self, user_email: &str, since: DateTime<Utc>) -> AppResult<u64> {
        self.check(StoreArea::Notifications)?;
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.user_email == user_email && n.created_at >= since)
            .count() as u64)
    }

    async fn mark_read(
        &self,
        id: &str,
        user_email: &str,
        channel: Channel,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.check(StoreArea::Notifications)?;
        let mut state = self.state.write().await;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_email == user_email)
        {
            Some(n) => {
                n.mark_read(channel, at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_email: &str, at: DateTime<Utc>) -> AppResult<u64> {
        self.check(StoreArea::Notifications)?;
        let mut state = self.state.write().await;
        let mut updated = 0;
        for n in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_email == user_email && n.is_unread())
        {
            n.mark_read(Channel::InApp, at);
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn find(&self, user_email: &str) -> AppResult<Option<NotificationPreference>> {
        self.check(StoreArea::Preferences)?;
        Ok(self.state.read().await.preferences.get(user_email).cloned())
    }

    async fn upsert(
        &self,
        preference: &NotificationPreference,
    ) -> AppResult<NotificationPreference> {
        self.check(StoreArea::Preferences)?;
        let mut stored = preference.clone();
        stored.updated_at.get_or_insert_with(Utc::now);
        self.state
            .write()
            .await
            .preferences
            .insert(stored.user_email.clone(), stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl SpamGuardStore for MemoryStore {
    async fn latest_since(
        &self,
        key: &SpamKey,
        since: DateTime<Utc>,
    ) -> AppResult<Option<SpamGuardRecord>> {
        self.check(StoreArea::SpamGuard)?;
        let state = self.state.read().await;
        Ok(state
            .spam
            .iter()
            .filter(|r| r.key == *key && r.created_at > since)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn insert(&self, record: &SpamGuardRecord) -> AppResult<()> {
        self.check(StoreArea::SpamGuard)?;
        self.state.write().await.spam.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn insert(&self, record: &DeliveryRecord) -> AppResult<()> {
        self.check(StoreArea::Deliveries)?;
        self.state.write().await.deliveries.push(record.clone());
        Ok(())
    }

    async fn find_for_notification(&self, notification_id: &str) -> AppResult<Vec<DeliveryRecord>> {
        self.check(StoreArea::Deliveries)?;
        let state = self.state.read().await;
        Ok(state
            .deliveries
            .iter()
            .filter(|d| d.notification_id == notification_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn owned_subject_ids(&self, owner_email: &str) -> AppResult<Vec<String>> {
        self.check(StoreArea::Activity)?;
        let state = self.state.read().await;
        let mut ids: Vec<String> = state
            .subjects
            .iter()
            .filter(|(_, (owner, _))| owner == owner_email)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn interactions_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<Vec<Interaction>> {
        self.check(StoreArea::Activity)?;
        let state = self.state.read().await;
        let mut rows: Vec<Interaction> = state
            .interactions
            .iter()
            .filter(|i| {
                subject_ids.contains(&i.subject_id)
                    && !i.actor_email.eq_ignore_ascii_case(exclude_actor)
            })
            .cloned()
            .collect();
        newest_first(&mut rows, |i| i.created_at);
        Ok(rows)
    }

    async fn comments_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<Vec<Comment>> {
        self.check(StoreArea::Activity)?;
        let state = self.state.read().await;
        let mut rows: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| {
                subject_ids.contains(&c.subject_id)
                    && !c.actor_email.eq_ignore_ascii_case(exclude_actor)
            })
            .cloned()
            .collect();
        newest_first(&mut rows, |c| c.created_at);
        Ok(rows)
    }

    async fn count_interactions_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<u64> {
        Ok(self.interactions_on(subject_ids, exclude_actor).await?.len() as u64)
    }

    async fn count_comments_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<u64> {
        Ok(self.comments_on(subject_ids, exclude_actor).await?.len() as u64)
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn list(
        &self,
        user_email: &str,
        unread_only: bool,
        limit: u64,
    ) -> AppResult<Vec<Notification>> {
        self.check(StoreArea::Transactional)?;
        let state = self.state.read().await;
        let mut rows: Vec<Notification> = state
            .transactional
            .iter()
            .filter(|n| n.user_email == user_email && (!unread_only || n.is_unread()))
            .cloned()
            .collect();
        newest_first(&mut rows, |n| n.created_at);
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn count(&self, user_email: &str, unread_only: bool) -> AppResult<u64> {
        self.check(StoreArea::Transactional)?;
        let state = self.state.read().await;
        Ok(state
            .transactional
            .iter()
            .filter(|n| n.user_email == user_email && (!unread_only || n.is_unread()))
            .count() as u64)
    }
}
