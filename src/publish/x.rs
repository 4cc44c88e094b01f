//! X (Twitter) API v2 publisher.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::oauth::{self, authorization_header};
use super::{PublishOutcome, Publisher};
use crate::error::PublishError;

pub use super::oauth::Credentials;

pub const DEFAULT_ENDPOINT: &str = "https://api.twitter.com/2/tweets";

#[derive(Serialize)]
struct CreatePost<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
}

/// Posts text to an X account.
///
/// Without credentials every attempt fails with
/// [`PublishError::MissingCredentials`] before any network I/O.
pub struct XPublisher {
    credentials: Option<Credentials>,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl XPublisher {
    pub fn new(credentials: Option<Credentials>, timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            credentials,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn send(&self, credentials: &Credentials, text: &str) -> Result<PublishOutcome, PublishError> {
        let auth = authorization_header(
            credentials,
            "POST",
            &self.endpoint,
            &[],
            &oauth::nonce(),
            Utc::now().timestamp(),
        )?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/json")
            .json(&CreatePost { text })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        Ok(classify(status, &body))
    }
}

/// Map an API response onto a publish outcome.
///
/// X answers a repeated post with `403 Forbidden` and a message mentioning
/// a duplicate.
fn classify(status: StatusCode, body: &str) -> PublishOutcome {
    if status.is_success() {
        match serde_json::from_str::<CreatePostResponse>(body) {
            Ok(created) => info!(post_id = %created.data.id, "posted successfully"),
            Err(_) => info!(status = status.as_u16(), "posted successfully"),
        }
        return PublishOutcome::Success;
    }

    if status == StatusCode::FORBIDDEN && body.to_lowercase().contains("duplicate") {
        warn!("post rejected as a duplicate");
        return PublishOutcome::Duplicate;
    }

    PublishOutcome::Error(PublishError::Rejected {
        status: status.as_u16(),
        body: body.to_string(),
    })
}

impl Publisher for XPublisher {
    fn publish(&self, text: &str) -> PublishOutcome {
        let Some(credentials) = &self.credentials else {
            error!("missing API credentials");
            return PublishOutcome::Error(PublishError::MissingCredentials);
        };

        match self.send(credentials, text) {
            Ok(outcome) => outcome,
            Err(e) => PublishOutcome::Error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_fail_without_network() {
        // Unroutable endpoint: reaching the network would hang or fail differently.
        let publisher = XPublisher::new(None, Duration::from_secs(1))
            .unwrap()
            .with_endpoint("http://192.0.2.1/2/tweets");
        assert!(matches!(
            publisher.publish("hello"),
            PublishOutcome::Error(PublishError::MissingCredentials)
        ));
    }

    #[test]
    fn created_is_success() {
        let body = r#"{"data":{"id":"1445880548472328192","text":"hello"}}"#;
        assert!(matches!(
            classify(StatusCode::CREATED, body),
            PublishOutcome::Success
        ));
    }

    #[test]
    fn forbidden_duplicate_is_duplicate() {
        let body = r#"{"detail":"You are not allowed to create a Tweet with duplicate content.","type":"about:blank","title":"Forbidden","status":403}"#;
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, body),
            PublishOutcome::Duplicate
        ));
    }

    #[test]
    fn other_forbidden_is_error() {
        let body = r#"{"title":"Forbidden","detail":"You are not permitted to perform this action.","status":403}"#;
        match classify(StatusCode::FORBIDDEN, body) {
            PublishOutcome::Error(PublishError::Rejected { status, .. }) => assert_eq!(status, 403),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn rate_limit_is_error() {
        assert!(matches!(
            classify(StatusCode::TOO_MANY_REQUESTS, r#"{"title":"Too Many Requests"}"#),
            PublishOutcome::Error(PublishError::Rejected { status: 429, .. })
        ));
    }
}
