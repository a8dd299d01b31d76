//! Notification repository implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use notify_core::error::{AppError, ErrorKind};
use notify_core::result::AppResult;
use notify_entity::{ActionType, Channel, Notification, Priority};

use crate::store::NotificationStore;

/// Row shape of the `notifications` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct NotificationRow {
    pub id: String,
    pub user_email: String,
    pub actor_email: Option<String>,
    pub action_type: String,
    pub subject_id: Option<String>,
    pub subject_title: Option<String>,
    pub message: String,
    pub channel: String,
    pub priority: String,
    pub metadata: Json<BTreeMap<String, serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub read_channels: Json<BTreeMap<Channel, DateTime<Utc>>>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            user_email: row.user_email,
            actor_email: row.actor_email,
            action_type: ActionType::parse(&row.action_type),
            subject_id: row.subject_id,
            subject_title: row.subject_title,
            message: row.message,
            channel: Channel::from_str_value(&row.channel).unwrap_or(Channel::InApp),
            priority: Priority::from_str_value(&row.priority),
            metadata: row.metadata.0,
            created_at: row.created_at,
            is_read: row.is_read,
            read_at: row.read_at,
            read_channels: row.read_channels.0,
            is_fallback: false,
        }
    }
}

/// Repository for the `notifications` table.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert(&self, n: &Notification) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications (id, user_email, actor_email, action_type, subject_id, subject_title, \
             message, channel, priority, metadata, created_at, is_read, read_at, read_channels) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&n.id)
        .bind(&n.user_email)
        .bind(&n.actor_email)
        .bind(n.action_type.as_str())
        .bind(&n.subject_id)
        .bind(&n.subject_title)
        .bind(&n.message)
        .bind(n.channel.as_str())
        .bind(n.priority.as_str())
        .bind(Json(&n.metadata))
        .bind(n.created_at)
        .bind(n.is_read)
        .bind(n.read_at)
        .bind(Json(&n.read_channels))
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to create notification"))?;
        Ok(())
    }

    async fn list(
        &self,
        user_email: &str,
        unread_only: bool,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications WHERE user_email = $1 AND ($2 = FALSE OR is_read = FALSE) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_email)
        .bind(unread_only)
        .bind(super::sql_bound(limit))
        .bind(super::sql_bound(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list notifications"))?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn count(&self, user_email: &str, unread_only: bool) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_email = $1 AND ($2 = FALSE OR is_read = FALSE)",
        )
        .bind(user_email)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count notifications"))?;
        Ok(count.max(0) as u64)
    }

    async fn count_since(&self, user_email: &str, since: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_email = $1 AND created_at >= $2",
        )
        .bind(user_email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count daily notifications"))?;
        Ok(count.max(0) as u64)
    }

    async fn mark_read(
        &self,
        id: &str,
        user_email: &str,
        channel: Channel,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, $3), \
             read_channels = read_channels || jsonb_build_object($4::text, $3) \
             WHERE id = $1 AND user_email = $2",
        )
        .bind(id)
        .bind(user_email)
        .bind(at)
        .bind(channel.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark read"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_email: &str, at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2, \
             read_channels = read_channels || jsonb_build_object('in_app', $2) \
             WHERE user_email = $1 AND is_read = FALSE",
        )
        .bind(user_email)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark all read"))?;
        Ok(result.rows_affected())
    }
}
