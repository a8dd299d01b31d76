//! Preference repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::PgPool;

use notify_core::error::{AppError, ErrorKind};
use notify_core::result::AppResult;
use notify_entity::NotificationPreference;

use crate::store::PreferenceStore;

/// Row shape of `user_notification_preferences`.
#[derive(Debug, sqlx::FromRow)]
struct PreferenceRow {
    user_email: String,
    email_notifications: bool,
    push_notifications: bool,
    in_app_notifications: bool,
    like_notifications: bool,
    favorite_notifications: bool,
    comment_notifications: bool,
    reply_notifications: bool,
    download_notifications: bool,
    digest_enabled: bool,
    quiet_hours_start: Option<NaiveTime>,
    quiet_hours_end: Option<NaiveTime>,
    min_interval_minutes: i32,
    max_daily_notifications: i32,
    updated_at: Option<DateTime<Utc>>,
}

impl From<PreferenceRow> for NotificationPreference {
    fn from(row: PreferenceRow) -> Self {
        Self {
            user_email: row.user_email,
            email_notifications: row.email_notifications,
            push_notifications: row.push_notifications,
            in_app_notifications: row.in_app_notifications,
            like_notifications: row.like_notifications,
            favorite_notifications: row.favorite_notifications,
            comment_notifications: row.comment_notifications,
            reply_notifications: row.reply_notifications,
            download_notifications: row.download_notifications,
            digest_enabled: row.digest_enabled,
            quiet_hours_start: row.quiet_hours_start,
            quiet_hours_end: row.quiet_hours_end,
            min_interval_minutes: row.min_interval_minutes,
            max_daily_notifications: row.max_daily_notifications,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for `user_notification_preferences`.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn find(&self, user_email: &str) -> AppResult<Option<NotificationPreference>> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            "SELECT * FROM user_notification_preferences WHERE user_email = $1",
        )
        .bind(user_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to get preferences", e))?;
        Ok(row.map(NotificationPreference::from))
    }

    async fn upsert(&self, p: &NotificationPreference) -> AppResult<NotificationPreference> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            "INSERT INTO user_notification_preferences (user_email, email_notifications, push_notifications, \
             in_app_notifications, like_notifications, favorite_notifications, comment_notifications, \
             reply_notifications, download_notifications, digest_enabled, quiet_hours_start, quiet_hours_end, \
             min_interval_minutes, max_daily_notifications, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, COALESCE($15, NOW())) \
             ON CONFLICT (user_email) DO UPDATE SET \
             email_notifications = EXCLUDED.email_notifications, push_notifications = EXCLUDED.push_notifications, \
             in_app_notifications = EXCLUDED.in_app_notifications, like_notifications = EXCLUDED.like_notifications, \
             favorite_notifications = EXCLUDED.favorite_notifications, comment_notifications = EXCLUDED.comment_notifications, \
             reply_notifications = EXCLUDED.reply_notifications, download_notifications = EXCLUDED.download_notifications, \
             digest_enabled = EXCLUDED.digest_enabled, quiet_hours_start = EXCLUDED.quiet_hours_start, \
             quiet_hours_end = EXCLUDED.quiet_hours_end, min_interval_minutes = EXCLUDED.min_interval_minutes, \
             max_daily_notifications = EXCLUDED.max_daily_notifications, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(&p.user_email)
        .bind(p.email_notifications)
        .bind(p.push_notifications)
        .bind(p.in_app_notifications)
        .bind(p.like_notifications)
        .bind(p.favorite_notifications)
        .bind(p.comment_notifications)
        .bind(p.reply_notifications)
        .bind(p.download_notifications)
        .bind(p.digest_enabled)
        .bind(p.quiet_hours_start)
        .bind(p.quiet_hours_end)
        .bind(p.min_interval_minutes)
        .bind(p.max_daily_notifications)
        .bind(p.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert preferences", e)
        })?;
        Ok(row.into())
    }
}
