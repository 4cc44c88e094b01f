//! OAuth 1.0a request signing (HMAC-SHA1), as required by the X API for
//! user-context writes.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

use crate::error::PublishError;

type HmacSha1 = Hmac<Sha1>;

/// User-context credentials for the X API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    /// All four values must be present and non-blank.
    pub fn from_parts(
        api_key: Option<String>,
        api_secret: Option<String>,
        access_token: Option<String>,
        access_token_secret: Option<String>,
    ) -> Option<Self> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self {
            api_key: present(api_key)?,
            api_secret: present(api_secret)?,
            access_token: present(access_token)?,
            access_token_secret: present(access_token_secret)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

pub(crate) fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Base64 HMAC-SHA1 signature over the request.
///
/// `params` holds query and form parameters; a JSON body is not signed.
fn signature(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, PublishError> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&param_string)
    );
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| PublishError::Signing)?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Value for the `Authorization` header of a signed request.
pub(crate) fn authorization_header(
    credentials: &Credentials,
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> Result<String, PublishError> {
    let timestamp = timestamp.to_string();
    let mut oauth: Vec<(String, String)> = vec![
        ("oauth_consumer_key".into(), credentials.api_key.clone()),
        ("oauth_nonce".into(), nonce.into()),
        ("oauth_signature_method".into(), "HMAC-SHA1".into()),
        ("oauth_timestamp".into(), timestamp),
        ("oauth_token".into(), credentials.access_token.clone()),
        ("oauth_version".into(), "1.0".into()),
    ];

    let mut all = oauth.clone();
    all.extend(
        request_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    let sig = signature(
        method,
        url,
        &all,
        &credentials.api_secret,
        &credentials.access_token_secret,
    )?;
    oauth.push(("oauth_signature".into(), sig));
    oauth.sort();

    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {fields}"))
}
