//! Explicit AWS session context.
//!
//! # Invariants
//! - Secrets never appear in `Debug` output or log events.
//! - `validate()` must pass before a client is built from the session.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use url::Url;

static REGION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("valid region regex"));

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Lookup keys accepted by `AwsSession::from_lookup`.
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const ENV_ENDPOINT_URL_S3: &str = "AWS_ENDPOINT_URL_S3";
pub const ENV_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";

/// Session configuration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    MissingValue(&'static str),
    InvalidRegion(String),
    InvalidEndpoint(String),
    InvalidTimeout,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingValue(name) => write!(f, "session value is missing: {name}"),
            Self::InvalidRegion(value) => write!(f, "region is invalid: `{value}`"),
            Self::InvalidEndpoint(value) => write!(f, "endpoint is invalid: {value}"),
            Self::InvalidTimeout => write!(f, "timeout_secs must be greater than zero"),
        }
    }
}

impl Error for SessionError {}

/// Static access key credentials.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Resolved session context handed to adapter constructors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AwsSession {
    pub region: String,
    /// Overrides the regional service endpoint, e.g. a local S3 emulator.
    #[serde(default)]
    pub endpoint: Option<String>,
    pub credentials: Credentials,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl AwsSession {
    pub fn new(region: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            credentials,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Builds a session from named values, e.g. `|name| std::env::var(name).ok()`.
    ///
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let access_key_id = get(ENV_ACCESS_KEY_ID).ok_or(SessionError::MissingValue(ENV_ACCESS_KEY_ID))?;
        let secret_access_key =
            get(ENV_SECRET_ACCESS_KEY).ok_or(SessionError::MissingValue(ENV_SECRET_ACCESS_KEY))?;
        let region = get(ENV_REGION)
            .or_else(|| get(ENV_DEFAULT_REGION))
            .ok_or(SessionError::MissingValue(ENV_REGION))?;

        let mut credentials = Credentials::new(access_key_id, secret_access_key);
        credentials.session_token = get(ENV_SESSION_TOKEN);

        let session = Self {
            region,
            endpoint: get(ENV_ENDPOINT_URL_S3).or_else(|| get(ENV_ENDPOINT_URL)),
            credentials,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        };
        session.validate()?;
        Ok(session)
    }

    /// Checks the session before any client is built from it.
    ///
    /// # Errors
    /// - `MissingValue` for blank credentials.
    /// - `InvalidRegion` when the region is not shaped like `eu-west-1`.
    /// - `InvalidEndpoint` when the override is not an absolute http(s) URL.
    /// - `InvalidTimeout` when `timeout_secs` is zero.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.credentials.access_key_id.trim().is_empty() {
            return Err(SessionError::MissingValue(ENV_ACCESS_KEY_ID));
        }
        if self.credentials.secret_access_key.trim().is_empty() {
            return Err(SessionError::MissingValue(ENV_SECRET_ACCESS_KEY));
        }
        if !REGION_RE.is_match(&self.region) {
            return Err(SessionError::InvalidRegion(self.region.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(SessionError::InvalidTimeout);
        }
        if self.endpoint.is_some() {
            self.s3_endpoint()?;
        }
        Ok(())
    }

    /// Returns the S3 endpoint: the override when set, else the regional one.
    pub fn s3_endpoint(&self) -> Result<Url, SessionError> {
        let raw = match &self.endpoint {
            Some(endpoint) => endpoint.trim().to_string(),
            None => format!("https://s3.{}.amazonaws.com", self.region),
        };
        let url = Url::parse(&raw)
            .map_err(|err| SessionError::InvalidEndpoint(format!("`{raw}`: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(SessionError::InvalidEndpoint(format!(
                "`{raw}`: expected an absolute http(s) URL"
            )));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::{AwsSession, Credentials, SessionError};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_required_and_optional_values() {
        let session = AwsSession::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "token"),
            ("AWS_DEFAULT_REGION", "eu-central-1"),
            ("AWS_ENDPOINT_URL", "http://localhost:9000"),
        ]))
        .expect("session should resolve");

        assert_eq!(session.region, "eu-central-1");
        assert_eq!(session.credentials.session_token.as_deref(), Some("token"));
        assert_eq!(session.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn from_lookup_prefers_region_over_default_region() {
        let session = AwsSession::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_REGION", "us-west-2"),
            ("AWS_DEFAULT_REGION", "eu-central-1"),
        ]))
        .expect("session should resolve");
        assert_eq!(session.region, "us-west-2");
    }

    #[test]
    fn from_lookup_treats_blank_values_as_missing() {
        let err = AwsSession::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "  "),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_REGION", "us-east-1"),
        ]))
        .expect_err("blank key id should fail");
        assert_eq!(err, SessionError::MissingValue("AWS_ACCESS_KEY_ID"));
    }

    #[test]
    fn validate_rejects_bad_region_and_endpoint() {
        let credentials = Credentials::new("AKID", "secret");
        let bad_region = AwsSession::new("Europe", credentials.clone());
        assert!(matches!(
            bad_region.validate(),
            Err(SessionError::InvalidRegion(_))
        ));

        let bad_endpoint =
            AwsSession::new("us-gov-west-1", credentials).with_endpoint("ftp://example.com");
        assert!(matches!(
            bad_endpoint.validate(),
            Err(SessionError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn default_endpoint_is_regional() {
        let session = AwsSession::new("ap-southeast-2", Credentials::new("AKID", "secret"));
        let url = session.s3_endpoint().expect("endpoint should build");
        assert_eq!(url.host_str(), Some("s3.ap-southeast-2.amazonaws.com"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credentials = Credentials::new("AKID", "super-secret").with_session_token("tok");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("\"tok\""));
    }
}
