//! Main Aria backend client.

use crate::error::{Result, ServerClientError};
use crate::tracks::TrackClient;
use crate::types::ServerConfig;
use aria_core::{PlaybackSource, Track, TrackCatalog};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// Client for the track and like API of the Aria backend.
///
/// Implements [`TrackCatalog`], so a player session can use it directly.
///
/// # Example
///
/// ```ignore
/// use aria_server_client::{AriaServerClient, ServerConfig};
///
/// let config = ServerConfig::new("https://music.example.com").with_user("42");
/// let client = AriaServerClient::new(config)?;
///
/// let tracks = client.get_tracks().await?;
/// println!("Found {} tracks", tracks.len());
/// ```
pub struct AriaServerClient {
    http: Client,
    base_url: Url,
    config: Arc<RwLock<ServerConfig>>,
}

impl AriaServerClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        let base_url =
            Url::parse(&url).map_err(|e| ServerClientError::InvalidUrl(format!("{url}: {e}")))?;

        let normalized_config = ServerConfig { url, ..config };

        // Create HTTP client with reasonable defaults
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("AriaPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServerClientError::Request)?;

        Ok(Self {
            http,
            base_url,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// User whose liked songs are fetched.
    pub async fn user_id(&self) -> Option<String> {
        self.config.read().await.user_id.clone()
    }

    /// Switch to another user (e.g. after sign-in).
    pub async fn set_user(&self, user_id: Option<String>, access_token: Option<String>) {
        let mut config = self.config.write().await;
        config.user_id = user_id;
        config.access_token = access_token;
        info!(user_id = ?config.user_id, "Switched user");
    }

    /// Check if the client has an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Get every track.
    pub async fn get_tracks(&self) -> Result<Vec<Track>> {
        let token = self.config.read().await.access_token.clone();
        TrackClient::new(&self.http, &self.base_url, token.as_deref())
            .get_tracks()
            .await
    }

    /// Get the liked songs of the configured user (empty without one).
    pub async fn get_liked_songs(&self) -> Result<Vec<Track>> {
        let config = self.config.read().await;
        let token = config.access_token.clone();
        let user_id = config.user_id.clone();
        drop(config);

        let Some(user_id) = user_id else {
            debug!("No user configured, no liked songs");
            return Ok(Vec::new());
        };

        TrackClient::new(&self.http, &self.base_url, token.as_deref())
            .get_liked_songs(&user_id)
            .await
    }

    /// Toggle the like of a track for the configured user.
    pub async fn toggle_like(&self, track: &Track) -> Result<bool> {
        let config = self.config.read().await;
        let token = config.access_token.clone();
        let user_id = config.user_id.clone();
        drop(config);

        let liked = TrackClient::new(&self.http, &self.base_url, token.as_deref())
            .toggle_like(track, user_id.as_deref())
            .await?;

        info!(track_id = %track.id, liked, "Like toggled");
        Ok(liked)
    }
}

#[async_trait]
impl TrackCatalog for AriaServerClient {
    async fn fetch_tracks(&self, source: PlaybackSource) -> aria_core::Result<Vec<Track>> {
        let tracks = match source {
            PlaybackSource::All => self.get_tracks().await?,
            PlaybackSource::Liked => self.get_liked_songs().await?,
        };
        Ok(tracks)
    }

    async fn toggle_like(&self, track: &Track) -> aria_core::Result<bool> {
        Ok(AriaServerClient::toggle_like(self, track).await?)
    }
}
