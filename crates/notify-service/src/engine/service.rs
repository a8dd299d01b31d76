//! Orchestrator composing preferences, policies, storage, delivery, and
//! real-time push.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{debug, error, info, warn};

use notify_core::config::EngineConfig;
use notify_core::error::AppError;
use notify_core::result::AppResult;
use notify_core::types::PageRequest;
use notify_core::Outcome;
use notify_database::{NotificationStore, Stores};
use notify_entity::{
    Channel, DeliveryRecord, Notification, NotificationPage, NotificationPreference,
    PreferenceUpdate, ReadReceipt, SourceTag, SpamKey, UnreadCount,
};

use super::request::{CreateNotification, CreateOutcome, SkipReason};
use crate::clock::{Clock, SystemClock};
use crate::delivery::{
    DeferredDelivery, DeferredNotification, DeliverySink, DeliveryTracker, LoggingDeferral,
    NoopPush, RealtimePush,
};
use crate::policy::{ChannelSelector, QuietHoursPolicy, SpamGuard};
use crate::preference::PreferenceService;
use crate::source::{FallbackSynthesizer, NotificationSource, PrimarySource};

/// The notification engine.
///
/// Collaborators are injected at construction; the defaults are the wall
/// clock, a push target that is never connected, log-only deferral, and
/// log-only email/push sinks.
#[derive(Debug, Clone)]
pub struct NotificationEngine {
    notifications: Arc<dyn NotificationStore>,
    preferences: PreferenceService,
    spam_guard: SpamGuard,
    quiet_hours: QuietHoursPolicy,
    channels: ChannelSelector,
    tracker: DeliveryTracker,
    primary: Arc<dyn NotificationSource>,
    fallback: Arc<dyn NotificationSource>,
    push: Arc<dyn RealtimePush>,
    deferral: Arc<dyn DeferredDelivery>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl NotificationEngine {
    /// Build an engine over `stores`.
    pub fn new(stores: Stores, config: EngineConfig) -> Self {
        let transactional = config
            .include_transactional
            .then(|| stores.transactional.clone());

        Self {
            notifications: stores.notifications.clone(),
            preferences: PreferenceService::new(stores.preferences),
            spam_guard: SpamGuard::new(stores.spam_guard),
            quiet_hours: QuietHoursPolicy::new(),
            channels: ChannelSelector::new(),
            tracker: DeliveryTracker::new(stores.deliveries),
            primary: Arc::new(PrimarySource::new(stores.notifications, transactional)),
            fallback: Arc::new(FallbackSynthesizer::new(stores.activity)),
            push: Arc::new(NoopPush),
            deferral: Arc::new(LoggingDeferral),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the real-time push target.
    pub fn with_push(mut self, push: Arc<dyn RealtimePush>) -> Self {
        self.push = push;
        self
    }

    /// Replace the quiet-hours deferral target.
    pub fn with_deferral(mut self, deferral: Arc<dyn DeferredDelivery>) -> Self {
        self.deferral = deferral;
        self
    }

    /// Replace the delivery sink for `channel`.
    pub fn with_sink(mut self, channel: Channel, sink: Arc<dyn DeliverySink>) -> Self {
        self.tracker.set_sink(channel, sink);
        self
    }

    /// Current instant according to the engine's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Page request with configured defaults and bounds applied.
    pub fn page_request(&self, page: Option<u64>, page_size: Option<u64>) -> PageRequest {
        let size = page_size
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        PageRequest::new(page.unwrap_or(1), size)
    }

    /// Run the creation pipeline.
    ///
    /// Policy rejections are `Skipped`, never errors. Store failures in the
    /// policy checks relax the check and mark the outcome `Degraded`. Only a
    /// failure to persist the notification itself is `Failed`.
    pub async fn create_notification(&self, request: CreateNotification) -> Outcome<CreateOutcome> {
        let mut notes = Vec::new();

        if request.is_self_notification() {
            debug!(recipient = %request.recipient, "Skipping self-notification");
            return Outcome::Ok(CreateOutcome::Skipped(SkipReason::SelfNotification));
        }

        let now = self.clock.now();
        let recipient = request.recipient.as_str();

        let preference = absorb(
            self.preferences.load(recipient, now).await,
            "preferences",
            &mut notes,
            || NotificationPreference::default_for_user(recipient),
        );

        if !preference.allows(&request.action_type) {
            debug!(recipient = %recipient, action = %request.action_type, "Action type disabled by preference");
            return finish(CreateOutcome::Skipped(SkipReason::ActionDisabled), notes);
        }

        let key = SpamKey {
            user_email: request.recipient.clone(),
            actor_email: request.actor.clone(),
            action_type: request.action_type.clone(),
            subject_id: request.subject_id.clone(),
        };
        let duplicate = absorb(
            self.spam_guard
                .is_duplicate(&key, preference.min_interval_minutes, now)
                .await,
            "spam_guard",
            &mut notes,
            || false,
        );
        if duplicate {
            info!(
                recipient = %recipient,
                actor = ?request.actor,
                action = %request.action_type,
                subject = ?request.subject_id,
                min_interval_minutes = preference.min_interval_minutes,
                "Notification blocked by spam guard"
            );
            return finish(CreateOutcome::Skipped(SkipReason::SpamBlocked), notes);
        }

        let start_of_day = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let daily = Outcome::fail_open(
            self.notifications.count_since(recipient, start_of_day).await,
            || 0,
        );
        if let Some(reason) = daily.reason() {
            warn!(recipient = %recipient, error = %reason, "Daily count failed, allowing");
        }
        let sent_today = absorb(daily, "daily_count", &mut notes, || 0);
        let daily_cap = u64::try_from(preference.max_daily_notifications).unwrap_or(0);
        if sent_today >= daily_cap {
            info!(recipient = %recipient, sent_today, daily_cap, "Daily notification limit reached");
            return finish(CreateOutcome::Skipped(SkipReason::DailyLimitReached), notes);
        }

        if self.quiet_hours.is_quiet_hours(&preference, now) {
            self.deferral
                .defer(DeferredNotification {
                    request,
                    deferred_at: now,
                    quiet_hours_end: preference.quiet_hours_end,
                })
                .await;
            return finish(CreateOutcome::Skipped(SkipReason::QuietHoursDeferred), notes);
        }

        let notification = Notification {
            id: Notification::new_id(),
            channel: self.channels.select_channel(&preference, &request.action_type),
            user_email: request.recipient,
            actor_email: request.actor,
            action_type: request.action_type,
            subject_id: request.subject_id,
            subject_title: request.subject_title,
            message: request.message,
            priority: request.priority,
            metadata: request.metadata,
            created_at: now,
            is_read: false,
            read_at: None,
            read_channels: Default::default(),
            is_fallback: false,
        };

        if let Err(e) = self.notifications.insert(&notification).await {
            error!(recipient = %notification.user_email, error = %e, "Failed to persist notification");
            return Outcome::Failed(e);
        }

        if let Some(reason) = self.spam_guard.record(key, now).await.reason() {
            notes.push(format!("spam_guard: {reason}"));
        }

        let channels = self.channels.eligible_channels(&preference);
        self.tracker.dispatch(&notification, &channels, now).await;

        let pushed = self.push.deliver(&notification.user_email, &notification).await;

        info!(
            notification_id = %notification.id,
            recipient = %notification.user_email,
            action = %notification.action_type,
            channel = %notification.channel,
            pushed,
            "Notification created"
        );

        finish(CreateOutcome::Created(notification), notes)
    }

    /// One page of a recipient's notifications.
    ///
    /// The primary source is used while it is reachable and holds at least
    /// one row; otherwise the fallback synthesizer answers. The result's
    /// `source` tells the two apart.
    pub async fn get_user_notifications(
        &self,
        user_email: &str,
        request: &PageRequest,
        unread_only: bool,
    ) -> NotificationPage {
        let primary_error = match self.primary.page(user_email, request, unread_only).await {
            Ok(page) if page.total() > 0 => return page,
            Ok(_) => None,
            Err(e) => {
                warn!(user = %user_email, error = %e, "Primary notification store unavailable");
                Some(e)
            }
        };

        match self.fallback.page(user_email, request, unread_only).await {
            Ok(mut page) => {
                page.error = primary_error.map(|e| e.to_string());
                page
            }
            Err(e) => {
                warn!(user = %user_email, error = %e, "Fallback synthesis failed");
                let mut page = NotificationPage::empty(request, SourceTag::FallbackError);
                page.error = Some(e.to_string());
                page
            }
        }
    }

    /// Unread count, falling back to activity counts when the primary store
    /// is unreachable.
    pub async fn get_unread_count(&self, user_email: &str) -> UnreadCount {
        match self.primary.unread_count(user_email).await {
            Ok(count) => count,
            Err(e) => {
                warn!(user = %user_email, error = %e, "Unread count unavailable, using fallback");
                self.fallback
                    .unread_count(user_email)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(user = %user_email, error = %e, "Fallback unread count failed");
                        UnreadCount {
                            count: 0,
                            source: SourceTag::FallbackError,
                        }
                    })
            }
        }
    }

    /// Mark one notification read for `channel`. Synthetic ids succeed
    /// without touching storage.
    pub async fn mark_as_read(
        &self,
        notification_id: &str,
        user_email: &str,
        channel: Channel,
    ) -> AppResult<ReadReceipt> {
        let now = self.clock.now();

        if Notification::is_synthetic_id(notification_id) {
            debug!(notification_id, "Mark-as-read on synthetic notification");
            return Ok(ReadReceipt {
                notification_id: notification_id.to_string(),
                is_read: true,
                read_at: now,
                channel,
                synthetic: true,
            });
        }

        let updated = self
            .notifications
            .mark_read(notification_id, user_email, channel, now)
            .await?;
        if !updated {
            return Err(AppError::not_found(format!(
                "Notification {notification_id} not found"
            )));
        }

        Ok(ReadReceipt {
            notification_id: notification_id.to_string(),
            is_read: true,
            read_at: now,
            channel,
            synthetic: false,
        })
    }

    /// Mark every unread notification of a recipient read.
    pub async fn mark_all_as_read(&self, user_email: &str) -> AppResult<u64> {
        let updated = self
            .notifications
            .mark_all_read(user_email, self.clock.now())
            .await?;
        info!(user = %user_email, updated, "Marked all notifications read");
        Ok(updated)
    }

    /// A user's preferences, created with defaults on first access.
    pub async fn get_user_preferences(&self, user_email: &str) -> Outcome<NotificationPreference> {
        self.preferences.load(user_email, self.clock.now()).await
    }

    /// Apply a whitelisted partial preference update.
    pub async fn update_user_preferences(
        &self,
        user_email: &str,
        update: &PreferenceUpdate,
    ) -> AppResult<NotificationPreference> {
        self.preferences
            .update(user_email, update, self.clock.now())
            .await
    }

    /// Delivery attempts recorded for a notification.
    pub async fn delivery_history(&self, notification_id: &str) -> AppResult<Vec<DeliveryRecord>> {
        self.tracker.history(notification_id).await
    }
}

/// Take the value of a degradable step, noting any degradation.
fn absorb<T>(
    outcome: Outcome<T>,
    step: &str,
    notes: &mut Vec<String>,
    fallback: impl FnOnce() -> T,
) -> T {
    match outcome {
        Outcome::Ok(v) => v,
        Outcome::Degraded { value, reason } => {
            notes.push(format!("{step}: {reason}"));
            value
        }
        Outcome::Failed(e) => {
            notes.push(format!("{step}: {e}"));
            fallback()
        }
    }
}

fn finish(outcome: CreateOutcome, notes: Vec<String>) -> Outcome<CreateOutcome> {
    if notes.is_empty() {
        Outcome::Ok(outcome)
    } else {
        Outcome::Degraded {
            value: outcome,
            reason: notes.join("; "),
        }
    }
}
