//! SDK error types.
//!
//! [`OpenSkyError`] is the single error type returned by every fallible
//! operation in the SDK. Authentication failures and rate limiting get
//! their own variants; every other failure (unexpected status, transport,
//! malformed payload) is one of the remaining variants.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use opensky_models::ModelError;

/// Header carrying the number of seconds to wait after a 429 answer.
pub const RETRY_AFTER_HEADER: &str = "x-rate-limit-retry-after-seconds";

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum OpenSkyError {
    /// Bad or missing credentials (HTTP 401/403, or an endpoint that
    /// requires an account was called anonymously).
    #[error("authentication failed: {reason}")]
    Authentication {
        /// Human-readable explanation.
        reason: String,
    },

    /// The credit or request quota is exhausted (HTTP 429).
    #[error("too many requests{}", retry_hint(.retry_after))]
    TooManyRequests {
        /// How long the server asked the caller to wait, when it said so.
        retry_after: Option<Duration>,
    },

    /// Any other non-2xx answer.
    #[error("unexpected HTTP status {status}")]
    Status {
        /// The status returned by the server.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("timeout while communicating with the OpenSky API")]
    Timeout,

    /// Transport-level failure (DNS, connect, TLS, broken body).
    #[error("error communicating with the OpenSky API: {0}")]
    Connection(#[source] reqwest::Error),

    /// A 2xx answer that is not JSON.
    #[error("unexpected response from the OpenSky API (content type `{content_type}`)")]
    UnexpectedResponse {
        /// The `Content-Type` header received, empty if missing.
        content_type: String,
        /// Response body, for diagnostics.
        body: String,
    },

    /// JSON body that does not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid query parameters (e.g. a bounding box out of range).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Invalid client configuration (e.g. bad API URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP session was closed before the request was sent.
    #[error("HTTP session is closed")]
    SessionClosed,
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after
        .map(|d| format!(", retry after {}s", d.as_secs()))
        .unwrap_or_default()
}

impl From<reqwest::Error> for OpenSkyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OpenSkyError::Timeout
        } else {
            OpenSkyError::Connection(e)
        }
    }
}

impl OpenSkyError {
    /// Map a non-success status to its error, `None` for 2xx.
    ///
    /// The body is only kept for the catch-all [`OpenSkyError::Status`].
    pub fn from_status(status: StatusCode, headers: &HeaderMap, body: String) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        let err = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => OpenSkyError::Authentication {
                reason: format!("server answered {status}"),
            },
            StatusCode::TOO_MANY_REQUESTS => OpenSkyError::TooManyRequests {
                retry_after: headers
                    .get(RETRY_AFTER_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs),
            },
            _ => OpenSkyError::Status { status, body },
        };
        Some(err)
    }

    /// Whether this error is an authentication failure.
    pub fn is_authentication(&self) -> bool {
        matches!(self, OpenSkyError::Authentication { .. })
    }

    /// Whether this error is a rate-limit answer.
    pub fn is_too_many_requests(&self) -> bool {
        matches!(self, OpenSkyError::TooManyRequests { .. })
    }
}
