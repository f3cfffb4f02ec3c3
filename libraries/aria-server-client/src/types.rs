//! Types for the Aria backend API.

use aria_core::Track;
use serde::{Deserialize, Serialize};

/// Configuration for connecting to the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL (e.g., "https://music.example.com")
    pub url: String,
    /// User whose liked songs are fetched
    pub user_id: Option<String>,
    /// Bearer token sent with every request
    pub access_token: Option<String>,
}

impl ServerConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_id: None,
            access_token: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }
}

/// Track list as returned by the list endpoints
///
/// Older deployments wrap the array in an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TrackListResponse {
    List(Vec<Track>),
    Wrapped { tracks: Vec<Track> },
}

impl TrackListResponse {
    pub(crate) fn into_tracks(self) -> Vec<Track> {
        match self {
            Self::List(tracks) | Self::Wrapped { tracks } => tracks,
        }
    }
}

/// Response of the like endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
}
