//! Error types for feedsync.
//!
//! Each concern gets its own enum so the sync driver can tell a per-item
//! problem (skip and continue) from a run-level one (stop publishing).

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain the feed. Always fatal to the run.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch feed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feed: {0}")]
    Parse(#[from] rss::Error),
}

/// An item could not be turned into publishable text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown placeholder {{{0}}} in template")]
    UnknownPlaceholder(String),

    #[error("unbalanced '{brace}' at byte {offset} in template")]
    Malformed { brace: char, offset: usize },

    #[error("text of {len} chars cannot be truncated to a limit of {limit}")]
    TruncationImpossible { len: usize, limit: usize },
}

/// The cursor could not be persisted.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A publish attempt failed for a reason other than a duplicate.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("missing API credentials")]
    MissingCredentials,

    #[error("failed to sign request")]
    Signing,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub(crate) fn feed_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FeedError {
    FeedError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn cursor_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CursorError {
    CursorError::Io {
        path: path.into(),
        source,
    }
}
