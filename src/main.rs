//! feedsync — publish new RSS entries to X, one scheduled run at a time.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ Vec<FeedItem> ┌──────────┐  text   ┌────────────┐
//! │ source/   │ ────────────► │ sync.rs  │ ──────► │ publish/   │
//! │ (RSS)     │               │ (driver) │ ◄────── │ (X API)    │
//! └───────────┘               └──────────┘ outcome └────────────┘
//!                                  │ ▲
//!                          save()  ▼ │ load()
//!                             ┌───────────┐
//!                             │ cursor.rs │
//!                             └───────────┘
//! ```
//!
//! * **`source/`** — the `FeedSource` trait and the RSS implementation.
//! * **`diff`** / **`filter`** — which entries are new and which qualify.
//! * **`format`** — renders an entry into bounded post text.
//! * **`publish/`** — the `Publisher` trait, the X client and a dry-run stub.
//! * **`cursor`** — the persisted id of the last delivered entry.
//! * **`sync`** — the run state machine tying the pieces together.
//! * **`main`** — parses configuration, fetches the feed, runs the driver and
//!   maps the result onto the exit status.
//!
//! Runs do not coordinate with each other: invoking two at once against the
//! same state file is the scheduler's problem to prevent.

mod config;
mod cursor;
mod diff;
mod error;
mod filter;
mod format;
mod publish;
mod source;
mod sync;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use config::Cli;
use cursor::{CursorStore, FileCursorStore, ReadOnlyCursor};
use publish::{DryRunPublisher, Publisher, XPublisher};
use source::{FeedSource, RssSource};
use sync::{AbortReason, RunOutcome, SyncDriver, SyncReport};

fn init_tracing() {
    use std::io::IsTerminal;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

fn summarize(report: &SyncReport) {
    match &report.outcome {
        RunOutcome::Completed => info!(
            first_run = report.first_run,
            pending = report.pending,
            published = report.published.len(),
            duplicates = report.duplicates.len(),
            skipped = report.skipped.len(),
            cursor = report.cursor.as_deref().unwrap_or("<none>"),
            "sync finished"
        ),
        RunOutcome::Aborted(AbortReason::Publish { id, error }) => warn!(
            published = report.published.len(),
            failed = %id,
            error = %error,
            "sync stopped early, the next run will retry from the last delivered entry"
        ),
        RunOutcome::Aborted(AbortReason::CursorPersist { id, error }) => error!(
            published = report.published.len(),
            entry = %id,
            error = %error,
            "sync stopped because the state file could not be updated"
        ),
    }
}

fn run(mut cli: Cli) -> Result<ExitCode> {
    let settings = cli.settings();
    info!(
        tag = settings.filter.required().unwrap_or("<any>"),
        template = settings.formatter.template(),
        dry_run = cli.dry_run,
        "starting feed sync"
    );

    let source = RssSource::new(cli.feed.clone(), cli.http_timeout());
    info!(feed = source.location(), "fetching feed");
    let feed = match source.fetch() {
        Ok(feed) => feed,
        Err(e) => {
            error!(feed = source.location(), error = %e, "cannot read feed");
            return Ok(ExitCode::FAILURE);
        }
    };

    let store = FileCursorStore::new(&cli.state_file);
    info!(state_file = %store.path().display(), entries = feed.len(), "feed loaded");
    let report = if cli.dry_run {
        let mut store = ReadOnlyCursor(store);
        sync_with(&settings, &mut store, &DryRunPublisher, &feed)
    } else {
        let credentials = cli.take_credentials();
        if credentials.is_none() {
            warn!("X API credentials are incomplete, publishing will fail");
        }
        let publisher = XPublisher::new(credentials, cli.http_timeout())
            .context("failed to build HTTP client")?
            .with_endpoint(cli.api_endpoint.clone());
        let mut store = store;
        sync_with(&settings, &mut store, &publisher, &feed)
    };

    summarize(&report);
    Ok(ExitCode::SUCCESS)
}

fn sync_with(
    settings: &sync::SyncSettings,
    store: &mut dyn CursorStore,
    publisher: &dyn Publisher,
    feed: &[source::FeedItem],
) -> SyncReport {
    SyncDriver::new(settings, store, publisher).run(feed)
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
