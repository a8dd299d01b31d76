//! Ticket/order notifications kept outside the main notification table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use notify_core::error::{AppError, ErrorKind};
use notify_core::result::AppResult;
use notify_entity::{ActionType, Channel, Notification, Priority};

use crate::store::TransactionalStore;

#[derive(Debug, sqlx::FromRow)]
struct TransactionalRow {
    id: String,
    user_email: String,
    kind: String,
    reference_id: Option<String>,
    message: String,
    metadata: Json<BTreeMap<String, serde_json::Value>>,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<TransactionalRow> for Notification {
    fn from(row: TransactionalRow) -> Self {
        Self {
            id: row.id,
            user_email: row.user_email,
            actor_email: None,
            action_type: ActionType::parse(&row.kind),
            subject_id: row.reference_id,
            subject_title: None,
            message: row.message,
            channel: Channel::InApp,
            priority: Priority::High,
            metadata: row.metadata.0,
            created_at: row.created_at,
            is_read: row.is_read,
            read_at: row.read_at,
            read_channels: BTreeMap::new(),
            is_fallback: false,
        }
    }
}

/// Repository for `transactional_notifications`.
#[derive(Debug, Clone)]
pub struct TransactionalRepository {
    pool: PgPool,
}

impl TransactionalRepository {
    /// Create a new transactional repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionalStore for TransactionalRepository {
    async fn list(
        &self,
        user_email: &str,
        unread_only: bool,
        limit: u64,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, TransactionalRow>(
            "SELECT * FROM transactional_notifications \
             WHERE user_email = $1 AND ($2 = FALSE OR is_read = FALSE) \
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(user_email)
        .bind(unread_only)
        .bind(super::sql_bound(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list transactional notifications", e)
        })?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn count(&self, user_email: &str, unread_only: bool) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactional_notifications \
             WHERE user_email = $1 AND ($2 = FALSE OR is_read = FALSE)",
        )
        .bind(user_email)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count transactional notifications", e)
        })?;
        Ok(count.max(0) as u64)
    }
}
