//! Spam guard repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use notify_core::error::{AppError, ErrorKind};
use notify_core::result::AppResult;
use notify_entity::{ActionType, SpamGuardRecord, SpamKey};

use crate::store::SpamGuardStore;

#[derive(Debug, sqlx::FromRow)]
struct SpamRow {
    user_email: String,
    actor_email: Option<String>,
    action_type: String,
    subject_id: Option<String>,
    created_at: DateTime<Utc>,
}

/// Repository for `notification_spam_prevention`.
#[derive(Debug, Clone)]
pub struct SpamGuardRepository {
    pool: PgPool,
}

impl SpamGuardRepository {
    /// Create a new spam guard repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpamGuardStore for SpamGuardRepository {
    async fn latest_since(
        &self,
        key: &SpamKey,
        since: DateTime<Utc>,
    ) -> AppResult<Option<SpamGuardRecord>> {
        // IS NOT DISTINCT FROM so system notifications (NULL actor) and
        // subject-less notifications still match each other.
        let row = sqlx::query_as::<_, SpamRow>(
            "SELECT user_email, actor_email, action_type, subject_id, created_at \
             FROM notification_spam_prevention \
             WHERE user_email = $1 AND actor_email IS NOT DISTINCT FROM $2 AND action_type = $3 \
             AND subject_id IS NOT DISTINCT FROM $4 AND created_at > $5 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(&key.user_email)
        .bind(&key.actor_email)
        .bind(key.action_type.as_str())
        .bind(&key.subject_id)
        .bind(since)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Spam guard lookup failed", e))?;

        Ok(row.map(|r| SpamGuardRecord {
            key: SpamKey {
                user_email: r.user_email,
                actor_email: r.actor_email,
                action_type: ActionType::parse(&r.action_type),
                subject_id: r.subject_id,
            },
            created_at: r.created_at,
        }))
    }

    async fn insert(&self, record: &SpamGuardRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notification_spam_prevention (user_email, actor_email, action_type, subject_id, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.key.user_email)
        .bind(&record.key.actor_email)
        .bind(record.key.action_type.as_str())
        .bind(&record.key.subject_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Spam guard insert failed", e))?;
        Ok(())
    }
}
