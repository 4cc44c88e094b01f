//! The validated feed entry shared by every stage of a sync run.
//!
//! Sources turn their native entries into `FeedItem`s through
//! [`FeedItem::resolve_id`] so that an entry without any usable identifier
//! is rejected up front instead of flowing into the differ with an empty id.

use chrono::{DateTime, Utc};

/// Title used when an entry carries none.
pub const UNTITLED: &str = "Untitled Post";

/// A single feed entry, normalised from any data source.
///
/// Feed order is authoritative: items are kept newest-first exactly as the
/// source delivered them and are never re-sorted by `published`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedItem {
    /// Stable identifier compared against the stored cursor.
    pub id: String,

    /// Human-readable headline.
    pub title: String,

    /// URL of the full content. Empty when the entry has none.
    pub link: String,

    /// Category terms as written in the feed.
    pub tags: Vec<String>,

    /// Publication timestamp, only used for log output.
    pub published: Option<DateTime<Utc>>,
}

impl FeedItem {
    /// Pick an identifier by priority: the explicit id, then the secondary
    /// id, then the link. Blank candidates are ignored.
    ///
    /// Returns `None` when nothing resolves; such entries must be dropped.
    pub fn resolve_id(
        explicit: Option<&str>,
        secondary: Option<&str>,
        link: Option<&str>,
    ) -> Option<String> {
        [explicit, secondary, link]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map(String::from)
    }

    /// Whether any tag equals `wanted`, ignoring case.
    pub fn has_tag(&self, wanted: &str) -> bool {
        let wanted = wanted.to_lowercase();
        self.tags.iter().any(|tag| tag.to_lowercase() == wanted)
    }
}
