//! Adapter error taxonomy.
//!
//! # Invariants
//! - Transport, throttling and credential failures surface as
//!   `ProviderUnavailable` and are never retried here.
//! - Every other provider-reported failure keeps its original code inside
//!   `Provider` so callers can tell permission errors from missing tags.

use crate::model::tag::TagValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Error codes that mean "try again later" rather than "request is wrong".
const THROTTLING_CODES: &[&str] = &[
    "SlowDown",
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
];

/// Error codes caused by the session context the core was handed.
const CREDENTIAL_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "TokenRefreshRequired",
];

/// Failure reported by a provider API in its own vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status when the provider answered over HTTP.
    pub status: Option<u16>,
    /// Provider error code, e.g. `NoSuchTagSet` or `AccessDenied`.
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns whether this failure is outside the caller's control.
    pub fn is_unavailable(&self) -> bool {
        let server_side = self.status.is_some_and(|status| status >= 500);
        server_side
            || THROTTLING_CODES.contains(&self.code.as_str())
            || CREDENTIAL_CODES.contains(&self.code.as_str())
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {status}): {}", self.code, self.message)?,
            None => write!(f, "{}: {}", self.code, self.message)?,
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " [request id {request_id}]")?;
        }
        Ok(())
    }
}

impl Error for ApiError {}

/// Why a provider could not serve a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableCause {
    /// Connection, TLS, DNS or timeout failure before a response arrived.
    Transport(String),
    /// Provider answered with a throttling, credential or server error.
    Api(ApiError),
}

/// Contract-level error returned by every adapter operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    ProviderUnavailable(UnavailableCause),
    /// Provider rejected the request; propagated unchanged.
    Provider(ApiError),
    /// Provider answered but the body could not be decoded.
    MalformedResponse(String),
    /// Caller supplied a tag that must not reach the provider.
    InvalidTag(TagValidationError),
}

impl AdapterError {
    /// Classifies a provider error into the contract taxonomy.
    pub fn from_api(error: ApiError) -> Self {
        if error.is_unavailable() {
            Self::ProviderUnavailable(UnavailableCause::Api(error))
        } else {
            Self::Provider(error)
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable(UnavailableCause::Transport(message.into()))
    }

    /// Returns the provider error code when one was reported.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Provider(err) => Some(err.code.as_str()),
            Self::ProviderUnavailable(UnavailableCause::Api(err)) => Some(err.code.as_str()),
            _ => None,
        }
    }

    /// Stable short name used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::Provider(_) => "provider",
            Self::MalformedResponse(_) => "malformed_response",
            Self::InvalidTag(_) => "invalid_tag",
        }
    }
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProviderUnavailable(UnavailableCause::Transport(message)) => {
                write!(f, "provider unavailable: {message}")
            }
            Self::ProviderUnavailable(UnavailableCause::Api(err)) => {
                write!(f, "provider unavailable: {err}")
            }
            Self::Provider(err) => write!(f, "provider error: {err}"),
            Self::MalformedResponse(message) => {
                write!(f, "malformed provider response: {message}")
            }
            Self::InvalidTag(err) => write!(f, "invalid tag: {err}"),
        }
    }
}

impl Error for AdapterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ProviderUnavailable(UnavailableCause::Api(err)) => Some(err),
            Self::Provider(err) => Some(err),
            Self::InvalidTag(err) => Some(err),
            Self::ProviderUnavailable(UnavailableCause::Transport(_)) => None,
            Self::MalformedResponse(_) => None,
        }
    }
}

impl From<ApiError> for AdapterError {
    fn from(value: ApiError) -> Self {
        Self::from_api(value)
    }
}

impl From<TagValidationError> for AdapterError {
    fn from(value: TagValidationError) -> Self {
        Self::InvalidTag(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{AdapterError, ApiError, UnavailableCause};

    #[test]
    fn throttling_and_credential_codes_are_unavailable() {
        for code in ["SlowDown", "InvalidAccessKeyId", "ExpiredToken"] {
            let err = AdapterError::from_api(ApiError::new(400, code, "x"));
            assert!(
                matches!(err, AdapterError::ProviderUnavailable(UnavailableCause::Api(_))),
                "{code} should be unavailable"
            );
        }
    }

    #[test]
    fn server_errors_are_unavailable() {
        let err = AdapterError::from_api(ApiError::new(503, "ServiceUnavailable", "busy"));
        assert_eq!(err.kind(), "provider_unavailable");
        assert_eq!(err.provider_code(), Some("ServiceUnavailable"));
    }

    #[test]
    fn access_denied_is_propagated_as_provider_error() {
        let err = AdapterError::from_api(ApiError::new(403, "AccessDenied", "nope"));
        assert!(matches!(err, AdapterError::Provider(ref api) if api.code == "AccessDenied"));
    }

    #[test]
    fn display_includes_code_status_and_request_id() {
        let err = ApiError::new(404, "NoSuchBucket", "missing").with_request_id("REQ1");
        assert_eq!(
            err.to_string(),
            "NoSuchBucket (HTTP 404): missing [request id REQ1]"
        );
    }
}
