//! Error types for the Box Office API client

use thiserror::Error;

/// Errors that can occur when talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, bad URL)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The backend answered but refused the request
    #[error("Request rejected (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the body, if any
        message: Option<String>,
    },
}

impl ApiError {
    /// The backend's own explanation, when it gave one
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
