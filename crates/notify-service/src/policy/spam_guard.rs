//! Minimum-interval suppression of duplicate notifications.
//!
//! The check is a read followed by a later write, so two near-simultaneous
//! calls for the same tuple can both pass.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use notify_core::Outcome;
use notify_database::SpamGuardStore;
use notify_entity::{SpamGuardRecord, SpamKey};

/// Spam guard over a [`SpamGuardStore`].
#[derive(Debug, Clone)]
pub struct SpamGuard {
    store: Arc<dyn SpamGuardStore>,
}

impl SpamGuard {
    /// Creates a new spam guard.
    pub fn new(store: Arc<dyn SpamGuardStore>) -> Self {
        Self { store }
    }

    /// Whether a notification for `key` was created within the last
    /// `min_interval_minutes`. Lookup failures allow the notification.
    pub async fn is_duplicate(
        &self,
        key: &SpamKey,
        min_interval_minutes: i32,
        now: DateTime<Utc>,
    ) -> Outcome<bool> {
        if min_interval_minutes <= 0 {
            return Outcome::Ok(false);
        }
        let since = now - Duration::minutes(i64::from(min_interval_minutes));

        match self.store.latest_since(key, since).await {
            Ok(Some(last)) => {
                debug!(
                    recipient = %key.user_email,
                    action = %key.action_type,
                    last = %last.created_at,
                    "Duplicate notification inside minimum interval"
                );
                Outcome::Ok(true)
            }
            Ok(None) => Outcome::Ok(false),
            Err(e) => {
                warn!(recipient = %key.user_email, error = %e, "Spam guard lookup failed, allowing");
                Outcome::degraded(false, &e)
            }
        }
    }

    /// Write the marker for a freshly created notification.
    pub async fn record(&self, key: SpamKey, now: DateTime<Utc>) -> Outcome<()> {
        let record = SpamGuardRecord {
            key,
            created_at: now,
        };
        match self.store.insert(&record).await {
            Ok(()) => Outcome::Ok(()),
            Err(e) => {
                warn!(recipient = %record.key.user_email, error = %e, "Failed to write spam guard record");
                Outcome::degraded((), &e)
            }
        }
    }
}
