//! RSS feed source.
//!
//! Reads an RSS 2.0 channel either over HTTP or from a local file and
//! converts its entries into validated [`FeedItem`]s, preserving the
//! channel's own (newest-first) order.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::feed_item::UNTITLED;
use super::{FeedItem, FeedSource};
use crate::error::{feed_io_err, FeedError};

/// An RSS feed data source.
pub struct RssSource {
    /// Feed location: an `http(s)://` URL or a filesystem path.
    pub location: String,
    /// Timeout applied to HTTP fetches.
    pub timeout: Duration,
}

impl RssSource {
    /// Create a new RSS source.
    ///
    /// # Arguments
    ///
    /// * `location` — feed URL (e.g. `https://example.com/index.xml`) or the
    ///   path of a feed file on disk.
    /// * `timeout` — upper bound for the whole HTTP request.
    pub fn new(location: impl Into<String>, timeout: Duration) -> Self {
        Self {
            location: location.into(),
            timeout,
        }
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    fn read_bytes(&self) -> Result<Vec<u8>, FeedError> {
        if self.is_remote() {
            let client = reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()?;
            let body = client
                .get(&self.location)
                .send()?
                .error_for_status()?
                .bytes()?;
            Ok(body.to_vec())
        } else {
            let path = Path::new(&self.location);
            std::fs::read(path).map_err(|e| feed_io_err(path, e))
        }
    }

    /// Parse an already-fetched [`rss::Channel`] into [`FeedItem`]s.
    ///
    /// Entries whose identifier cannot be resolved are dropped with a
    /// warning. This is a pure function so tests can exercise it without
    /// any I/O.
    pub fn parse_channel(channel: &rss::Channel) -> Vec<FeedItem> {
        channel
            .items()
            .iter()
            .filter_map(|item| {
                let title = item
                    .title()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(UNTITLED)
                    .to_string();

                let secondary = item
                    .dublin_core_ext()
                    .and_then(|dc| dc.identifiers().first())
                    .map(String::as_str);

                let Some(id) =
                    FeedItem::resolve_id(item.guid().map(|g| g.value()), secondary, item.link())
                else {
                    warn!(title = %title, "skipping entry with no guid, identifier or link");
                    return None;
                };

                // Parse RFC-2822 date; gracefully degrade to None on failure.
                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                Some(FeedItem {
                    id,
                    title,
                    link: item.link().unwrap_or_default().to_string(),
                    tags: item
                        .categories()
                        .iter()
                        .map(|c| c.name().trim().to_string())
                        .filter(|c| !c.is_empty())
                        .collect(),
                    published,
                })
            })
            .collect()
    }
}

impl FeedSource for RssSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn fetch(&self) -> Result<Vec<FeedItem>, FeedError> {
        let body = self.read_bytes()?;
        let channel = rss::Channel::read_from(body.as_slice())?;
        let items = Self::parse_channel(&channel);
        debug!(
            entries = channel.items().len(),
            accepted = items.len(),
            "parsed feed"
        );
        Ok(items)
    }
}
