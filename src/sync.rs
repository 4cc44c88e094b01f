//! Sync driver: one resumable run from feed snapshot to published posts.
//!
//! ```text
//! Init → CursorLoaded → Diffed → Filtered → [FirstRunCollapse] → Publishing → Done | Aborted
//! ```
//!
//! Items are published oldest first and the cursor is committed after every
//! confirmed delivery, so an aborted run resumes exactly after the last post
//! that made it out. A `Duplicate` answer counts as a confirmed delivery.

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::cursor::CursorStore;
use crate::diff;
use crate::error::{CursorError, PublishError};
use crate::filter::TagFilter;
use crate::format::Formatter;
use crate::publish::{PublishOutcome, Publisher};
use crate::source::FeedItem;

/// Courtesy delays towards the downstream channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub before_publish: Duration,
    pub after_success: Duration,
    pub after_duplicate: Duration,
}

impl Pacing {
    pub const fn none() -> Self {
        Self {
            before_publish: Duration::ZERO,
            after_success: Duration::ZERO,
            after_duplicate: Duration::ZERO,
        }
    }

    fn pause(delay: Duration) {
        if !delay.is_zero() {
            debug!(secs = delay.as_secs_f64(), "waiting");
            std::thread::sleep(delay);
        }
    }
}

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub filter: TagFilter,
    pub formatter: Formatter,
    pub pacing: Pacing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    CursorLoaded,
    Diffed,
    Filtered,
    FirstRunCollapse,
    Publishing,
    Done,
    Aborted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::CursorLoaded => "cursor-loaded",
            Phase::Diffed => "diffed",
            Phase::Filtered => "filtered",
            Phase::FirstRunCollapse => "first-run-collapse",
            Phase::Publishing => "publishing",
            Phase::Done => "done",
            Phase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why publishing stopped early.
#[derive(Debug)]
pub enum AbortReason {
    Publish { id: String, error: PublishError },
    CursorPersist { id: String, error: CursorError },
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed,
    Aborted(AbortReason),
}

/// What a run did.
#[derive(Debug)]
pub struct SyncReport {
    /// No cursor was stored when the run started.
    pub first_run: bool,
    /// Items selected for publishing after diff, filter and collapse.
    pub pending: usize,
    pub published: Vec<String>,
    pub duplicates: Vec<String>,
    /// Items dropped by the formatter.
    pub skipped: Vec<String>,
    /// Cursor value at the end of the run.
    pub cursor: Option<String>,
    pub outcome: RunOutcome,
}

impl SyncReport {
    fn new(cursor: Option<String>) -> Self {
        Self {
            first_run: cursor.is_none(),
            pending: 0,
            published: Vec::new(),
            duplicates: Vec::new(),
            skipped: Vec::new(),
            cursor,
            outcome: RunOutcome::Completed,
        }
    }
}

/// Drives a single run. The cursor store is exclusively borrowed for the
/// whole run.
pub struct SyncDriver<'a> {
    settings: &'a SyncSettings,
    cursor: &'a mut dyn CursorStore,
    publisher: &'a dyn Publisher,
    phase: Phase,
}

impl<'a> SyncDriver<'a> {
    pub fn new(
        settings: &'a SyncSettings,
        cursor: &'a mut dyn CursorStore,
        publisher: &'a dyn Publisher,
    ) -> Self {
        Self {
            settings,
            cursor,
            publisher,
            phase: Phase::Init,
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "sync phase");
        self.phase = phase;
    }

    fn abort(&mut self, mut report: SyncReport, reason: AbortReason) -> SyncReport {
        self.enter(Phase::Aborted);
        report.outcome = RunOutcome::Aborted(reason);
        report
    }

    /// Synchronise `feed` (newest first) to the publisher.
    pub fn run(mut self, feed: &[FeedItem]) -> SyncReport {
        let settings = self.settings;
        let loaded = self.cursor.load();
        self.enter(Phase::CursorLoaded);
        info!(cursor = loaded.as_deref().unwrap_or("<none>"), "loaded cursor");
        let mut report = SyncReport::new(loaded.clone());

        let Some(newest) = feed.first() else {
            info!("no entries in the feed");
            self.enter(Phase::Done);
            return report;
        };

        let fresh = diff::new_items(feed, loaded.as_deref());
        self.enter(Phase::Diffed);

        let filter = &settings.filter;
        let mut pending: Vec<&FeedItem> = fresh
            .iter()
            .filter(|item| {
                let keep = filter.accepts(item);
                if keep {
                    info!(
                        id = %item.id,
                        title = %item.title,
                        published = ?item.published,
                        "found new entry"
                    );
                } else {
                    debug!(id = %item.id, title = %item.title, "skipping entry without required tag");
                }
                keep
            })
            .collect();
        self.enter(Phase::Filtered);

        if report.first_run {
            self.enter(Phase::FirstRunCollapse);
            pending.truncate(1);
            match pending.first() {
                Some(item) => info!(
                    id = %item.id,
                    title = %item.title,
                    "first run: only the newest qualifying entry will be published"
                ),
                None => info!(
                    tag = filter.required().unwrap_or("<any>"),
                    "first run: no qualifying entries"
                ),
            }
        } else if pending.is_empty() {
            info!(
                tag = filter.required().unwrap_or("<any>"),
                "no new entries since the last run"
            );
        }
        report.pending = pending.len();

        self.enter(Phase::Publishing);
        let last = pending.len().saturating_sub(1);
        for (n, item) in pending.iter().rev().enumerate() {
            let text = match settings.formatter.format(item) {
                Ok(text) => text,
                Err(e) => {
                    warn!(id = %item.id, title = %item.title, error = %e, "cannot format entry, skipping");
                    report.skipped.push(item.id.clone());
                    continue;
                }
            };

            Pacing::pause(settings.pacing.before_publish);
            info!(id = %item.id, text = %text, "publishing");
            let duplicate = match self.publisher.publish(&text) {
                PublishOutcome::Success => false,
                PublishOutcome::Duplicate => {
                    info!(id = %item.id, "already published, treating as delivered");
                    true
                }
                PublishOutcome::Error(error) => {
                    error!(id = %item.id, error = %error, "publish failed, stopping this run");
                    let reason = AbortReason::Publish {
                        id: item.id.clone(),
                        error,
                    };
                    return self.abort(report, reason);
                }
            };

            if let Err(error) = self.cursor.save(&item.id) {
                error!(id = %item.id, error = %error, "cannot persist cursor, stopping this run");
                let reason = AbortReason::CursorPersist {
                    id: item.id.clone(),
                    error,
                };
                return self.abort(report, reason);
            }
            report.cursor = Some(item.id.clone());

            let delay = if duplicate {
                report.duplicates.push(item.id.clone());
                settings.pacing.after_duplicate
            } else {
                report.published.push(item.id.clone());
                settings.pacing.after_success
            };
            if n < last {
                Pacing::pause(delay);
            }
        }

        // A first run that committed nothing still marks the current head of
        // the feed as seen, so the next run starts from here.
        if report.first_run && report.cursor.is_none() {
            info!(id = %newest.id, "first run: advancing cursor to the newest entry without publishing");
            if let Err(error) = self.cursor.save(&newest.id) {
                error!(id = %newest.id, error = %error, "cannot persist cursor");
                let reason = AbortReason::CursorPersist {
                    id: newest.id.clone(),
                    error,
                };
                return self.abort(report, reason);
            }
            report.cursor = Some(newest.id.clone());
        }

        self.enter(Phase::Done);
        report
    }
}
