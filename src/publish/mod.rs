//! Publisher adapters.
//!
//! A publisher takes finished post text and reports one of three outcomes.
//! `Duplicate` means the channel already holds this exact post, which the
//! sync driver treats as a delivery confirmed by an earlier partial run.

mod oauth;
mod x;

pub use x::{Credentials, XPublisher, DEFAULT_ENDPOINT};

use tracing::info;

use crate::error::PublishError;

/// Result of a single publish attempt.
#[derive(Debug)]
pub enum PublishOutcome {
    Success,
    Duplicate,
    Error(PublishError),
}

/// Submits post text to a downstream channel. Calls block until the channel
/// has answered.
pub trait Publisher {
    fn publish(&self, text: &str) -> PublishOutcome;
}

/// Logs the text instead of posting it.
#[derive(Debug, Default)]
pub struct DryRunPublisher;

impl Publisher for DryRunPublisher {
    fn publish(&self, text: &str) -> PublishOutcome {
        info!(text, "[dry-run] would publish");
        PublishOutcome::Success
    }
}
