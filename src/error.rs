//! Error types for the XRP ticker

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when fetching the market summary
///
/// Every variant renders a message fit for showing to the user next to a
/// retry action; callers are not expected to branch on the variant.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body was not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The fetcher was shut down
    #[error("Fetcher has been shut down")]
    Closed,
}

impl FetchError {
    /// Creates a Decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a Status error
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

/// Errors raised while reading configuration from the environment or flags
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// Auto-update window must be at least one second
    #[error("Auto-update window must be at least 1 second")]
    ZeroWindow,

    /// Request timeout must be positive
    #[error("Request timeout must be at least 1 second")]
    ZeroTimeout,
}

impl ConfigError {
    /// Creates an InvalidValue error
    pub fn invalid_value(key: &str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.into(),
        }
    }
}
