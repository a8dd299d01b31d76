//! Read-only repository over media ownership, interactions, and comments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use notify_core::error::{AppError, ErrorKind};
use notify_core::result::AppResult;
use notify_entity::{ActionType, Comment, Interaction};

use crate::store::ActivityStore;

#[derive(Debug, sqlx::FromRow)]
struct InteractionRow {
    id: String,
    subject_id: String,
    subject_title: String,
    owner_email: String,
    actor_email: String,
    actor_name: Option<String>,
    interaction_type: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: String,
    subject_id: String,
    subject_title: String,
    owner_email: String,
    actor_email: String,
    actor_name: Option<String>,
    content: String,
    created_at: DateTime<Utc>,
}

/// Repository over `media`, `media_interactions`, and `media_comments`.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn owned_subject_ids(&self, owner_email: &str) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT id FROM media WHERE owner_email = $1")
            .bind(owner_email)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list owned media", e))
    }

    async fn interactions_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(
            "SELECT i.id, i.media_id AS subject_id, m.title AS subject_title, m.owner_email, \
             i.user_email AS actor_email, i.user_name AS actor_name, i.interaction_type, i.created_at \
             FROM media_interactions i JOIN media m ON m.id = i.media_id \
             WHERE i.media_id = ANY($1) AND lower(i.user_email) <> lower($2) \
             ORDER BY i.created_at DESC",
        )
        .bind(subject_ids)
        .bind(exclude_actor)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list interactions", e))?;

        Ok(rows
            .into_iter()
            .map(|r| Interaction {
                id: r.id,
                subject_id: r.subject_id,
                subject_title: r.subject_title,
                owner_email: r.owner_email,
                actor_email: r.actor_email,
                actor_name: r.actor_name,
                interaction_type: ActionType::parse(&r.interaction_type),
                created_at: r.created_at,
            })
            .collect())
    }

    async fn comments_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.media_id AS subject_id, m.title AS subject_title, m.owner_email, \
             c.user_email AS actor_email, c.user_name AS actor_name, c.content, c.created_at \
             FROM media_comments c JOIN media m ON m.id = c.media_id \
             WHERE c.media_id = ANY($1) AND lower(c.user_email) <> lower($2) \
             ORDER BY c.created_at DESC",
        )
        .bind(subject_ids)
        .bind(exclude_actor)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list comments", e))?;

        Ok(rows
            .into_iter()
            .map(|r| Comment {
                id: r.id,
                subject_id: r.subject_id,
                subject_title: r.subject_title,
                owner_email: r.owner_email,
                actor_email: r.actor_email,
                actor_name: r.actor_name,
                content: r.content,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn count_interactions_on(
        &self,
        subject_ids: &[String],
        exclude_actor: &str,
    ) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM media_interactions \
             WHERE media_id = ANY($1) AND lower(user_email) <> lower($2)",
        )
        .bind(subject_ids)
        .bind(exclude_actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count interactions", e))?;
        Ok(count.max(0) as u64)
    }

    async fn count_comments_on(&self, subject_ids: &[String], exclude_actor: &str) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM media_comments \
             WHERE media_id = ANY($1) AND lower(user_email) <> lower($2)",
        )
        .bind(subject_ids)
        .bind(exclude_actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count comments", e))?;
        Ok(count.max(0) as u64)
    }
}
