//! Raw interaction and comment history on user-owned subjects.
//!
//! These rows belong to the media layer; the engine only reads them to
//! synthesize fallback notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notification::ActionType;

/// A like/favorite style interaction on a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Source row id.
    pub id: String,
    /// Subject interacted with.
    pub subject_id: String,
    /// Subject title.
    pub subject_title: String,
    /// Owner of the subject.
    pub owner_email: String,
    /// User who interacted.
    pub actor_email: String,
    /// Display name of the actor, if known.
    pub actor_name: Option<String>,
    /// Kind of interaction (`LIKE`, `FAVORITE`, ...).
    pub interaction_type: ActionType,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// A comment on a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Source row id.
    pub id: String,
    /// Subject commented on.
    pub subject_id: String,
    /// Subject title.
    pub subject_title: String,
    /// Owner of the subject.
    pub owner_email: String,
    /// Comment author.
    pub actor_email: String,
    /// Display name of the author, if known.
    pub actor_name: Option<String>,
    /// Comment body.
    pub content: String,
    /// When it was posted.
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    /// Name shown in rendered messages.
    pub fn display_actor(&self) -> &str {
        self.actor_name.as_deref().unwrap_or(&self.actor_email)
    }
}

impl Comment {
    /// Name shown in rendered messages.
    pub fn display_actor(&self) -> &str {
        self.actor_name.as_deref().unwrap_or(&self.actor_email)
    }
}
