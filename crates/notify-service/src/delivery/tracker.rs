//! Per-channel delivery with an append-only audit trail.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use notify_core::result::AppResult;
use notify_database::DeliveryStore;
use notify_entity::{Channel, DeliveryRecord, Notification};

use super::sink::{DeliverySink, InAppSink, LoggingSink};

/// Sends notifications through channel sinks and records each attempt.
#[derive(Debug, Clone)]
pub struct DeliveryTracker {
    store: Arc<dyn DeliveryStore>,
    sinks: BTreeMap<Channel, Arc<dyn DeliverySink>>,
}

impl DeliveryTracker {
    /// Tracker with the default sinks: in-app is a no-op, email and push log.
    pub fn new(store: Arc<dyn DeliveryStore>) -> Self {
        let mut sinks: BTreeMap<Channel, Arc<dyn DeliverySink>> = BTreeMap::new();
        sinks.insert(Channel::InApp, Arc::new(InAppSink));
        sinks.insert(Channel::Email, Arc::new(LoggingSink::new(Channel::Email)));
        sinks.insert(Channel::Push, Arc::new(LoggingSink::new(Channel::Push)));
        Self { store, sinks }
    }

    /// Replace the sink for `channel`.
    pub fn set_sink(&mut self, channel: Channel, sink: Arc<dyn DeliverySink>) {
        self.sinks.insert(channel, sink);
    }

    /// Attempt delivery on each channel once and append a record per
    /// attempt. Failures are logged and recorded, never returned.
    pub async fn dispatch(
        &self,
        notification: &Notification,
        channels: &[Channel],
        now: DateTime<Utc>,
    ) -> Vec<DeliveryRecord> {
        let mut records = Vec::with_capacity(channels.len());

        for channel in channels {
            let result = match self.sinks.get(channel) {
                Some(sink) => sink.send(notification).await.map_err(|e| e.to_string()),
                None => Err(format!("No delivery sink configured for {channel}")),
            };

            if let Err(reason) = &result {
                warn!(
                    notification_id = %notification.id,
                    channel = %channel,
                    error = %reason,
                    "Notification delivery failed"
                );
            }

            let record = DeliveryRecord::first_attempt(&notification.id, *channel, result, now);
            if let Err(e) = self.store.insert(&record).await {
                warn!(
                    notification_id = %notification.id,
                    channel = %channel,
                    error = %e,
                    "Failed to record delivery attempt"
                );
            } else {
                debug!(
                    notification_id = %notification.id,
                    channel = %channel,
                    status = record.status.as_str(),
                    "Delivery recorded"
                );
            }
            records.push(record);
        }

        records
    }

    /// Delivery attempts recorded for a notification.
    pub async fn history(&self, notification_id: &str) -> AppResult<Vec<DeliveryRecord>> {
        self.store.find_for_notification(notification_id).await
    }
}
