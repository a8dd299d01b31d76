//! Notification-shaped records synthesized from interaction and comment
//! history.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use notify_core::result::AppResult;
use notify_core::types::PageRequest;
use notify_database::ActivityStore;
use notify_entity::{
    ActionType, Channel, Comment, Interaction, Notification, NotificationPage, Priority, SourceTag,
    UnreadCount,
};

use super::NotificationSource;

const INTERACTION_KIND: &str = "interaction";
const COMMENT_KIND: &str = "comment";

/// Builds fallback notifications from activity on subjects the recipient
/// owns. Records are never persisted and are always unread.
#[derive(Debug, Clone)]
pub struct FallbackSynthesizer {
    activity: Arc<dyn ActivityStore>,
}

impl FallbackSynthesizer {
    /// Creates a new synthesizer.
    pub fn new(activity: Arc<dyn ActivityStore>) -> Self {
        Self { activity }
    }

    fn from_interaction(recipient: &str, interaction: &Interaction) -> Notification {
        let verb = past_tense(interaction.interaction_type.as_str());
        let message = format!(
            "{} {} your content \"{}\"",
            interaction.display_actor(),
            verb,
            interaction.subject_title
        );
        synthesized(
            Notification::synthetic_id(INTERACTION_KIND, &interaction.id),
            recipient,
            &interaction.actor_email,
            interaction.interaction_type.clone(),
            &interaction.subject_id,
            &interaction.subject_title,
            message,
            interaction.created_at,
            INTERACTION_KIND,
        )
    }

    fn from_comment(recipient: &str, comment: &Comment) -> Notification {
        let message = format!(
            "{} commented on your content \"{}\"",
            comment.display_actor(),
            comment.subject_title
        );
        synthesized(
            Notification::synthetic_id(COMMENT_KIND, &comment.id),
            recipient,
            &comment.actor_email,
            ActionType::Comment,
            &comment.subject_id,
            &comment.subject_title,
            message,
            comment.created_at,
            COMMENT_KIND,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn synthesized(
    id: String,
    recipient: &str,
    actor: &str,
    action_type: ActionType,
    subject_id: &str,
    subject_title: &str,
    message: String,
    created_at: chrono::DateTime<chrono::Utc>,
    kind: &str,
) -> Notification {
    let mut metadata = BTreeMap::new();
    metadata.insert("fallback_kind".to_string(), serde_json::Value::from(kind));

    Notification {
        id,
        user_email: recipient.to_string(),
        actor_email: Some(actor.to_string()),
        action_type,
        subject_id: Some(subject_id.to_string()),
        subject_title: Some(subject_title.to_string()),
        message,
        channel: Channel::InApp,
        priority: Priority::Normal,
        metadata,
        created_at,
        is_read: false,
        read_at: None,
        read_channels: BTreeMap::new(),
        is_fallback: true,
    }
}

/// `"LIKE"` -> `"liked"`, `"FAVORITE"` -> `"favorited"`.
fn past_tense(action: &str) -> String {
    let lower = action.to_ascii_lowercase();
    if lower.ends_with('e') {
        format!("{lower}d")
    } else {
        format!("{lower}ed")
    }
}

#[async_trait]
impl NotificationSource for FallbackSynthesizer {
    async fn page(
        &self,
        user_email: &str,
        request: &PageRequest,
        _unread_only: bool,
    ) -> AppResult<NotificationPage> {
        let owned = self.activity.owned_subject_ids(user_email).await?;
        if owned.is_empty() {
            return Ok(NotificationPage::empty(request, SourceTag::FallbackEmpty));
        }

        let interactions = self.activity.interactions_on(&owned, user_email).await?;
        let comments = self.activity.comments_on(&owned, user_email).await?;
        let total = self.activity.count_interactions_on(&owned, user_email).await?
            + self.activity.count_comments_on(&owned, user_email).await?;

        let mut items: Vec<Notification> = interactions
            .iter()
            .map(|i| Self::from_interaction(user_email, i))
            .chain(comments.iter().map(|c| Self::from_comment(user_email, c)))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!(
            user = %user_email,
            subjects = owned.len(),
            total,
            "Synthesized fallback notifications"
        );

        Ok(NotificationPage::new(
            request.slice(items),
            request,
            total,
            SourceTag::Fallback,
        ))
    }

    async fn unread_count(&self, user_email: &str) -> AppResult<UnreadCount> {
        let owned = self.activity.owned_subject_ids(user_email).await?;
        if owned.is_empty() {
            return Ok(UnreadCount {
                count: 0,
                source: SourceTag::FallbackEmpty,
            });
        }
        let count = self.activity.count_interactions_on(&owned, user_email).await?
            + self.activity.count_comments_on(&owned, user_email).await?;
        Ok(UnreadCount {
            count,
            source: SourceTag::Fallback,
        })
    }
}
