//! Action type enumeration.

use serde::{Deserialize, Serialize};

/// The user action that triggered a notification.
///
/// Known actions map to dedicated preference toggles. Anything else is
/// carried as [`ActionType::Other`] and is allowed by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// Someone liked the subject.
    Like,
    /// Someone favorited the subject.
    Favorite,
    /// Someone commented on the subject.
    Comment,
    /// Someone replied to a comment.
    Reply,
    /// Someone downloaded the subject.
    Download,
    /// Any other action, stored verbatim (upper-cased).
    Other(String),
}

impl ActionType {
    /// Wire/storage representation, e.g. `"LIKE"`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Like => "LIKE",
            Self::Favorite => "FAVORITE",
            Self::Comment => "COMMENT",
            Self::Reply => "REPLY",
            Self::Download => "DOWNLOAD",
            Self::Other(s) => s,
        }
    }

    /// Parse from any casing. Unknown values become `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "LIKE" => Self::Like,
            "FAVORITE" => Self::Favorite,
            "COMMENT" => Self::Comment,
            "REPLY" => Self::Reply,
            "DOWNLOAD" => Self::Download,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for ActionType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        action.as_str().to_string()
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ActionType::parse("like"), ActionType::Like);
        assert_eq!(ActionType::parse("Download"), ActionType::Download);
        assert_eq!(
            ActionType::parse("share"),
            ActionType::Other("SHARE".to_string())
        );
    }

    #[test]
    fn test_serde_uses_upper_case_strings() {
        let json = serde_json::to_string(&ActionType::Favorite).unwrap();
        assert_eq!(json, "\"FAVORITE\"");
        let parsed: ActionType = serde_json::from_str("\"reply\"").unwrap();
        assert_eq!(parsed, ActionType::Reply);
    }
}
