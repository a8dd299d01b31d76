//! Creation request and result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use notify_entity::{ActionType, Notification, Priority};

/// Parameters of a notification creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Recipient identity.
    pub recipient: String,
    /// Actor identity; `None` for system notifications.
    pub actor: Option<String>,
    /// Triggering action.
    pub action_type: ActionType,
    /// Subject reference.
    pub subject_id: Option<String>,
    /// Subject title.
    pub subject_title: Option<String>,
    /// Rendered message.
    pub message: String,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
}

impl CreateNotification {
    /// Request from `actor` to `recipient` for `action_type`.
    pub fn new(
        recipient: impl Into<String>,
        actor: Option<&str>,
        action_type: impl Into<ActionType>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            actor: actor.map(str::to_string),
            action_type: action_type.into(),
            subject_id: None,
            subject_title: None,
            message: message.into(),
            metadata: BTreeMap::new(),
            priority: Priority::Normal,
        }
    }

    /// Attach a subject.
    pub fn subject(mut self, id: impl Into<String>, title: Option<&str>) -> Self {
        self.subject_id = Some(id.into());
        self.subject_title = title.map(str::to_string);
        self
    }

    /// Add one metadata entry.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Whether the actor is the recipient.
    pub fn is_self_notification(&self) -> bool {
        self.actor
            .as_deref()
            .is_some_and(|actor| actor.eq_ignore_ascii_case(&self.recipient))
    }
}

/// Why a creation call produced no notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Actor and recipient are the same user.
    SelfNotification,
    /// The recipient disabled this action type.
    ActionDisabled,
    /// A matching notification was created within the minimum interval.
    SpamBlocked,
    /// The recipient reached today's cap.
    DailyLimitReached,
    /// The recipient is in quiet hours; the payload went to deferral.
    QuietHoursDeferred,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SelfNotification => "self_notification",
            Self::ActionDisabled => "action_disabled",
            Self::SpamBlocked => "spam_blocked",
            Self::DailyLimitReached => "daily_limit_reached",
            Self::QuietHoursDeferred => "quiet_hours_deferred",
        };
        write!(f, "{s}")
    }
}

/// Result of the creation pipeline.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// The notification was persisted.
    Created(Notification),
    /// A policy rejected the request.
    Skipped(SkipReason),
}

impl CreateOutcome {
    /// The created notification, if any.
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Created(n) => Some(n),
            Self::Skipped(_) => None,
        }
    }

    /// Consume into the created notification, if any.
    pub fn into_notification(self) -> Option<Notification> {
        match self {
            Self::Created(n) => Some(n),
            Self::Skipped(_) => None,
        }
    }

    /// Skip reason, if any.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Created(_) => None,
            Self::Skipped(r) => Some(*r),
        }
    }
}
