//! Delivery audit repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use notify_core::error::{AppError, ErrorKind};
use notify_core::result::AppResult;
use notify_entity::{Channel, DeliveryRecord, DeliveryStatus};

use crate::store::DeliveryStore;

#[derive(Debug, sqlx::FromRow)]
struct DeliveryRow {
    id: Uuid,
    notification_id: String,
    channel: String,
    status: String,
    attempts: i32,
    error: Option<String>,
    created_at: DateTime<Utc>,
}

/// Repository for `notification_deliveries`.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryStore for DeliveryRepository {
    async fn insert(&self, record: &DeliveryRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notification_deliveries (id, notification_id, channel, status, attempts, error, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id)
        .bind(&record.notification_id)
        .bind(record.channel.as_str())
        .bind(record.status.as_str())
        .bind(record.attempts)
        .bind(&record.error)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record delivery", e))?;
        Ok(())
    }

    async fn find_for_notification(&self, notification_id: &str) -> AppResult<Vec<DeliveryRecord>> {
        let rows = sqlx::query_as::<_, DeliveryRow>(
            "SELECT * FROM notification_deliveries WHERE notification_id = $1 ORDER BY created_at",
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list deliveries", e))?;

        Ok(rows
            .into_iter()
            .map(|r| DeliveryRecord {
                id: r.id,
                notification_id: r.notification_id,
                channel: Channel::from_str_value(&r.channel).unwrap_or(Channel::InApp),
                status: if r.status == "sent" {
                    DeliveryStatus::Sent
                } else {
                    DeliveryStatus::Failed
                },
                attempts: r.attempts,
                error: r.error,
                created_at: r.created_at,
            })
            .collect())
    }
}
