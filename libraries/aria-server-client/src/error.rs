//! Error types for the Aria server client.

use aria_core::AriaError;
use thiserror::Error;

/// Errors that can occur when talking to the Aria backend.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The endpoint needs a token and none (or an expired one) was sent
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

/// Result type for server client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;

impl From<ServerClientError> for AriaError {
    fn from(err: ServerClientError) -> Self {
        match err {
            ServerClientError::Request(_) | ServerClientError::ServerUnreachable(_) => {
                AriaError::network(err.to_string())
            }
            ServerClientError::ServerError { status: 404, message } => {
                AriaError::not_found("resource", message)
            }
            ServerClientError::ServerError { .. } => AriaError::network(err.to_string()),
            ServerClientError::InvalidUrl(msg) => AriaError::invalid_input(msg),
            ServerClientError::AuthRequired | ServerClientError::ParseError(_) => {
                AriaError::Other(err.to_string())
            }
        }
    }
}
