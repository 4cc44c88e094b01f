//! Feed differ: which items are newer than the cursor.

use tracing::{debug, warn};

use crate::source::FeedItem;

/// Items of `feed` (newest first) that are strictly newer than `cursor`.
///
/// Returns the prefix preceding the cursor's item. Without a cursor, or when
/// the cursor's item has aged out of the feed window, the whole feed is
/// returned: resurfacing old items is preferred over silently skipping new
/// ones.
pub fn new_items<'a>(feed: &'a [FeedItem], cursor: Option<&str>) -> &'a [FeedItem] {
    let Some(cursor) = cursor else {
        return feed;
    };

    match feed.iter().position(|item| item.id == cursor) {
        Some(pos) => {
            debug!(cursor, position = pos, "found last synced entry");
            &feed[..pos]
        }
        None => {
            warn!(
                cursor,
                entries = feed.len(),
                "last synced entry is no longer in the feed, treating every entry as new"
            );
            feed
        }
    }
}
