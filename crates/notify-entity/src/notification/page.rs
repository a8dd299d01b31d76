//! Query result shapes.

use serde::{Deserialize, Serialize};

use notify_core::types::{PageRequest, PageResponse};

use super::model::Notification;

/// Which source answered a notification query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// The notification store.
    Primary,
    /// Synthesized from interaction/comment history.
    Fallback,
    /// Fallback ran, but the recipient owns no subjects.
    FallbackEmpty,
    /// Fallback ran and failed; the result is empty.
    FallbackError,
}

impl SourceTag {
    /// Whether the answer came from the fallback path.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Primary)
    }
}

/// One page of notifications plus where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    /// The page itself.
    #[serde(flatten)]
    pub page: PageResponse<Notification>,
    /// Source that produced the page.
    pub source: SourceTag,
    /// Diagnostic for `fallback_error` results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationPage {
    /// Build a page.
    pub fn new(
        items: Vec<Notification>,
        request: &PageRequest,
        total_items: u64,
        source: SourceTag,
    ) -> Self {
        Self {
            page: PageResponse::new(items, request.page, request.page_size, total_items),
            source,
            error: None,
        }
    }

    /// Build an empty page with the given tag.
    pub fn empty(request: &PageRequest, source: SourceTag) -> Self {
        Self {
            page: PageResponse::empty(request),
            source,
            error: None,
        }
    }

    /// Items on this page.
    pub fn items(&self) -> &[Notification] {
        &self.page.items
    }

    /// Total item count across all pages.
    pub fn total(&self) -> u64 {
        self.page.total_items
    }
}

/// Unread count plus where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    /// Number of unread notifications.
    pub count: u64,
    /// Source that produced the count.
    pub source: SourceTag,
}
