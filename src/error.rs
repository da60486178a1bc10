//! Error types.
//!
//! Fetching goes wrong in one of three ways, captured by [`ApiError`].  Those
//! details matter for logs, but the caller only ever shows a single message,
//! so every [`ApiError`] collapses into a [`UserError`] before it is stored in
//! a [`LoadState::Failed`](crate::LoadState::Failed).

use thiserror::Error;

/// Failures raised while fetching leagues or teams.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// A response arrived but was not a 2xx or could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::InvalidUrl(err.to_string())
        } else if err.is_decode() || err.is_status() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}

/// An error that can be presented to users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UserError {
    pub message: String,
}

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ApiError> for UserError {
    fn from(err: ApiError) -> Self {
        let message = match err {
            ApiError::InvalidUrl(_) => "Invalid URL",
            ApiError::Network(_) => "Network Error",
            ApiError::InvalidResponse(_) => "Invalid Response",
        };
        UserError::new(message)
    }
}
