//! Feed source abstraction layer.
//!
//! This module defines the [`FeedSource`] trait and the common [`FeedItem`]
//! type. The sync engine only ever sees a `Vec<FeedItem>` (newest first) or
//! a [`FeedError`]; how the feed is fetched and parsed stays behind the
//! trait.

mod feed_item;
mod rss;

pub use feed_item::FeedItem;
pub use rss::RssSource;

#[cfg(test)]
pub(crate) use feed_item::tests::make_item;

use crate::error::FeedError;

/// Trait that every feed source must implement.
pub trait FeedSource {
    /// Where the feed is read from, for log output.
    fn location(&self) -> &str;

    /// Fetch the current snapshot of the feed, newest item first.
    ///
    /// Any error is fatal to the run.
    fn fetch(&self) -> Result<Vec<FeedItem>, FeedError>;
}
