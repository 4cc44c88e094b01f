//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through the environment, so the
//! binary can run unchanged from a scheduled CI job. The parsed [`Cli`] is
//! turned into an immutable [`SyncSettings`] once at startup.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::filter::TagFilter;
use crate::format::{Formatter, DEFAULT_MAX_LENGTH, DEFAULT_TEMPLATE};
use crate::publish::{Credentials, DEFAULT_ENDPOINT};
use crate::sync::{Pacing, SyncSettings};

#[derive(Parser, Debug)]
#[command(
    name = "feedsync",
    version,
    about = "Publish new RSS entries to X, resuming where the last run stopped",
    long_about = None,
)]
pub struct Cli {
    /// Feed URL (http/https) or path to a feed file.
    #[arg(long, env = "RSS_FEED_URL")]
    pub feed: String,

    /// File holding the id of the last synced entry.
    #[arg(long, env = "STATE_FILE_PATH", default_value = "last_post_guid.txt")]
    pub state_file: PathBuf,

    /// Only entries with this category are published (case-insensitive).
    /// Leave unset to publish every entry.
    #[arg(long, env = "REQUIRED_TAG")]
    pub required_tag: Option<String>,

    /// Post template; supports {title} and {link}.
    #[arg(long = "format", env = "TWEET_FORMAT", default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Maximum post length in characters.
    #[arg(long, env = "POST_MAX_LENGTH", default_value_t = DEFAULT_MAX_LENGTH)]
    pub max_length: usize,

    /// Seconds to wait before each publish attempt.
    #[arg(long, env = "PRE_PUBLISH_DELAY_SECS", default_value_t = 5)]
    pub pre_publish_delay: u64,

    /// Seconds to wait after a successful post.
    #[arg(long, env = "SUCCESS_DELAY_SECS", default_value_t = 10)]
    pub success_delay: u64,

    /// Seconds to wait after a post was reported as a duplicate.
    #[arg(long, env = "DUPLICATE_DELAY_SECS", default_value_t = 5)]
    pub duplicate_delay: u64,

    /// Timeout in seconds for each HTTP request.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout: u64,

    /// X API endpoint for creating posts.
    #[arg(long, env = "X_API_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    /// Log what would be posted without posting or updating the state file.
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, env = "X_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "X_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    #[arg(long, env = "X_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "X_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub access_token_secret: Option<String>,
}

impl Cli {
    pub fn settings(&self) -> SyncSettings {
        SyncSettings {
            filter: TagFilter::new(self.required_tag.as_deref()),
            formatter: Formatter::new(self.template.clone(), self.max_length),
            pacing: Pacing {
                before_publish: Duration::from_secs(self.pre_publish_delay),
                after_success: Duration::from_secs(self.success_delay),
                after_duplicate: Duration::from_secs(self.duplicate_delay),
            },
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    /// Consumes the credential fields; `None` unless all four are set.
    pub fn take_credentials(&mut self) -> Option<Credentials> {
        Credentials::from_parts(
            self.api_key.take(),
            self.api_secret.take(),
            self.access_token.take(),
            self.access_token_secret.take(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("feedsync").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_build_settings() {
        let cli = parse(&[
            "--feed",
            "feed.xml",
            "--required-tag",
            "X",
            "--format",
            "New: {title}",
            "--max-length",
            "100",
            "--pre-publish-delay",
            "0",
            "--success-delay",
            "1",
            "--duplicate-delay",
            "2",
        ]);
        let settings = cli.settings();

        assert_eq!(settings.filter.required(), Some("X"));
        assert_eq!(settings.formatter.template(), "New: {title}");
        assert_eq!(settings.pacing.before_publish, Duration::ZERO);
        assert_eq!(settings.pacing.after_success, Duration::from_secs(1));
        assert_eq!(settings.pacing.after_duplicate, Duration::from_secs(2));
    }

    #[test]
    fn feed_is_required() {
        assert!(Cli::try_parse_from(["feedsync", "--dry-run"]).is_err());
    }

    #[test]
    fn partial_credentials_are_none() {
        let mut cli = parse(&["--feed", "f", "--api-key", "k", "--api-secret", "s"]);
        assert!(cli.take_credentials().is_none());

        let mut cli = parse(&[
            "--feed",
            "f",
            "--api-key",
            "k",
            "--api-secret",
            "s",
            "--access-token",
            "t",
            "--access-token-secret",
            "ts",
        ]);
        assert!(cli.take_credentials().is_some());
        assert!(cli.api_secret.is_none());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
