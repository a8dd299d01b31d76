//! Notification preference entity.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::action::ActionType;
use super::channel::Channel;

/// Default minimum interval between duplicate notifications, in minutes.
pub const DEFAULT_MIN_INTERVAL_MINUTES: i32 = 5;
/// Default cap on notifications per calendar day.
pub const DEFAULT_MAX_DAILY_NOTIFICATIONS: i32 = 50;

/// Per-user notification delivery preferences. One record per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    /// The user these preferences belong to.
    pub user_email: String,
    /// Deliver through email.
    pub email_notifications: bool,
    /// Deliver through device push.
    pub push_notifications: bool,
    /// Deliver in-app.
    pub in_app_notifications: bool,
    /// Notify on likes.
    pub like_notifications: bool,
    /// Notify on favorites.
    pub favorite_notifications: bool,
    /// Notify on comments.
    pub comment_notifications: bool,
    /// Notify on replies.
    pub reply_notifications: bool,
    /// Notify on downloads.
    pub download_notifications: bool,
    /// Prefer a periodic digest.
    pub digest_enabled: bool,
    /// Start of the do-not-disturb window (time of day).
    pub quiet_hours_start: Option<NaiveTime>,
    /// End of the do-not-disturb window (time of day).
    pub quiet_hours_end: Option<NaiveTime>,
    /// Minimum interval between duplicate notifications, in minutes.
    pub min_interval_minutes: i32,
    /// Maximum notifications per calendar day.
    pub max_daily_notifications: i32,
    /// When preferences were last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl NotificationPreference {
    /// Built-in defaults, used for lazily created records and whenever the
    /// preference store cannot be read.
    pub fn default_for_user(user_email: &str) -> Self {
        Self {
            user_email: user_email.to_string(),
            email_notifications: true,
            push_notifications: false,
            in_app_notifications: true,
            like_notifications: true,
            favorite_notifications: true,
            comment_notifications: true,
            reply_notifications: true,
            download_notifications: true,
            digest_enabled: false,
            quiet_hours_start: None,
            quiet_hours_end: None,
            min_interval_minutes: DEFAULT_MIN_INTERVAL_MINUTES,
            max_daily_notifications: DEFAULT_MAX_DAILY_NOTIFICATIONS,
            updated_at: None,
        }
    }

    /// Whether notifications for `action` are wanted. Unknown actions are
    /// allowed.
    pub fn allows(&self, action: &ActionType) -> bool {
        match action {
            ActionType::Like => self.like_notifications,
            ActionType::Favorite => self.favorite_notifications,
            ActionType::Comment => self.comment_notifications,
            ActionType::Reply => self.reply_notifications,
            ActionType::Download => self.download_notifications,
            ActionType::Other(_) => true,
        }
    }

    /// Whether the given channel is switched on.
    pub fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::InApp => self.in_app_notifications,
            Channel::Email => self.email_notifications,
            Channel::Push => self.push_notifications,
        }
    }

    /// Apply a partial update. Fields absent from `update` are untouched;
    /// an explicit `null` quiet-hours bound clears it.
    pub fn apply(&mut self, update: &PreferenceUpdate, at: DateTime<Utc>) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = update.$field { self.$field = v; })*
            };
        }
        set!(
            email_notifications,
            push_notifications,
            in_app_notifications,
            like_notifications,
            favorite_notifications,
            comment_notifications,
            reply_notifications,
            download_notifications,
            digest_enabled,
            min_interval_minutes,
            max_daily_notifications,
        );
        if let Some(start) = update.quiet_hours_start {
            self.quiet_hours_start = start;
        }
        if let Some(end) = update.quiet_hours_end {
            self.quiet_hours_end = end;
        }
        self.updated_at = Some(at);
    }
}

/// Partial preference update.
///
/// This is the whitelist of updatable fields: any other key in an incoming
/// JSON object is ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PreferenceUpdate {
    /// See [`NotificationPreference::email_notifications`].
    pub email_notifications: Option<bool>,
    /// See [`NotificationPreference::push_notifications`].
    pub push_notifications: Option<bool>,
    /// See [`NotificationPreference::in_app_notifications`].
    pub in_app_notifications: Option<bool>,
    /// See [`NotificationPreference::like_notifications`].
    pub like_notifications: Option<bool>,
    /// See [`NotificationPreference::favorite_notifications`].
    pub favorite_notifications: Option<bool>,
    /// See [`NotificationPreference::comment_notifications`].
    pub comment_notifications: Option<bool>,
    /// See [`NotificationPreference::reply_notifications`].
    pub reply_notifications: Option<bool>,
    /// See [`NotificationPreference::download_notifications`].
    pub download_notifications: Option<bool>,
    /// See [`NotificationPreference::digest_enabled`].
    pub digest_enabled: Option<bool>,
    /// See [`NotificationPreference::quiet_hours_start`]. `Some(None)` clears.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub quiet_hours_start: Option<Option<NaiveTime>>,
    /// See [`NotificationPreference::quiet_hours_end`]. `Some(None)` clears.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub quiet_hours_end: Option<Option<NaiveTime>>,
    /// See [`NotificationPreference::min_interval_minutes`].
    #[validate(range(min = 0, max = 10080))]
    pub min_interval_minutes: Option<i32>,
    /// See [`NotificationPreference::max_daily_notifications`].
    #[validate(range(min = 0, max = 100000))]
    pub max_daily_notifications: Option<i32>,
}

impl PreferenceUpdate {
    /// Whether the update carries no whitelisted field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Keeps a present `null` distinct from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
