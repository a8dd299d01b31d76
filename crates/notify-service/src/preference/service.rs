//! Per-user notification preference management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use validator::Validate;

use notify_core::error::AppError;
use notify_core::Outcome;
use notify_database::PreferenceStore;
use notify_entity::{NotificationPreference, PreferenceUpdate};

/// Reads and writes preference records.
#[derive(Debug, Clone)]
pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    /// Creates a new preference service.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Load a user's preferences, creating the default record on first
    /// access. Store failures yield the built-in defaults as `Degraded`.
    pub async fn load(&self, user_email: &str, now: DateTime<Utc>) -> Outcome<NotificationPreference> {
        match self.store.find(user_email).await {
            Ok(Some(pref)) => Outcome::Ok(pref),
            Ok(None) => {
                let mut pref = NotificationPreference::default_for_user(user_email);
                pref.updated_at = Some(now);
                match self.store.upsert(&pref).await {
                    Ok(stored) => {
                        info!(user = %user_email, "Created default notification preferences");
                        Outcome::Ok(stored)
                    }
                    Err(e) => {
                        warn!(user = %user_email, error = %e, "Failed to persist default preferences");
                        Outcome::degraded(pref, &e)
                    }
                }
            }
            Err(e) => {
                warn!(user = %user_email, error = %e, "Preference lookup failed, using built-in defaults");
                Outcome::degraded(NotificationPreference::default_for_user(user_email), &e)
            }
        }
    }

    /// Apply a whitelisted partial update and persist the result.
    pub async fn update(
        &self,
        user_email: &str,
        update: &PreferenceUpdate,
        now: DateTime<Utc>,
    ) -> Result<NotificationPreference, AppError> {
        update
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid preference update: {e}")))?;

        let mut pref = self
            .store
            .find(user_email)
            .await?
            .unwrap_or_else(|| NotificationPreference::default_for_user(user_email));

        if update.is_empty() {
            return Ok(pref);
        }

        pref.apply(update, now);
        let stored = self.store.upsert(&pref).await?;
        info!(user = %user_email, "Notification preferences updated");
        Ok(stored)
    }
}
