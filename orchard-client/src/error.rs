//! Client error types
//!
//! Every failure the client surfaces is a [`ClientError`]. The type is `Clone`
//! so a single refresh outcome can be handed to every caller waiting on it.

use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Fallback text when the server gives no usable message
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Failures surfaced by [`ApiClient`](crate::ApiClient)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// A refresh was needed but no refresh token is stored
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The server refused the refresh token; local session state was cleared
    #[error("Refresh token rejected: {0}")]
    RefreshRejected(String),

    /// The access token expired and there is nothing to renew it with
    #[error("Access token expired and no refresh token is available")]
    TokenExpiredNoRefresh,

    /// Non-success HTTP response
    #[error("{message}")]
    RequestFailed {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Server message or the generic fallback
        message: String,
    },

    /// The request was retried once after an invalid-token response and failed again
    #[error("Request rejected after token refresh: {0}")]
    InvalidTokenRetryExhausted(String),

    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Persisting session state failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The task leading a refresh was dropped before the refresh settled
    #[error("Token refresh was abandoned before completing")]
    RefreshAbandoned,

    /// The client could not be set up
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// `RequestFailed` with the generic text when `message` is absent
    pub fn request_failed(status: Option<u16>, message: Option<&str>) -> Self {
        ClientError::RequestFailed {
            status,
            message: message.unwrap_or(GENERIC_FAILURE_MESSAGE).to_string(),
        }
    }

    /// True when the session cannot be recovered without logging in again
    pub fn is_auth_lost(&self) -> bool {
        matches!(
            self,
            ClientError::NoRefreshToken
                | ClientError::RefreshRejected(_)
                | ClientError::TokenExpiredNoRefresh
                | ClientError::InvalidTokenRetryExhausted(_)
        )
    }

    /// HTTP status of the failed response, if the failure came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<StorageError> for ClientError {
    fn from(err: StorageError) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
