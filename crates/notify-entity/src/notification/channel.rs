//! Delivery channel enumeration.

use serde::{Deserialize, Serialize};

/// Medium through which a notification reaches its recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Shown inside the application (and pushed over the live session).
    InApp,
    /// Sent by email.
    Email,
    /// Sent as a device push notification.
    Push,
}

impl Channel {
    /// Preference order used when picking a fallback channel.
    pub const ALL: [Channel; 3] = [Channel::InApp, Channel::Email, Channel::Push];

    /// Return the channel as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InApp => "in_app",
            Self::Email => "email",
            Self::Push => "push",
        }
    }

    /// Parse from the storage representation.
    pub fn from_str_value(s: &str) -> Option<Self> {
        match s {
            "in_app" => Some(Self::InApp),
            "email" => Some(Self::Email),
            "push" => Some(Self::Push),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
