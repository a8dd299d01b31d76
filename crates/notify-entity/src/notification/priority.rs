//! Notification priority levels.

use serde::{Deserialize, Serialize};

/// Notification priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Standard events.
    #[default]
    Normal,
    /// Important events.
    High,
}

impl Priority {
    /// Parse from string; anything unrecognized is `Normal`.
    pub fn from_str_value(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "high" => Self::High,
            _ => Self::Normal,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}
