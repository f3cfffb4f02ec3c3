//! Error types for playback management
//!
//! Controller operations never fail; these cover the persistence and catalog
//! plumbing around them.

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// State store could not be read or written
    #[error("State store error: {0}")]
    Store(String),

    /// Persisted state could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Track catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] aria_core::AriaError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
