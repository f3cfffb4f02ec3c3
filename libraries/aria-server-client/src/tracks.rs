//! Track and like endpoints of the Aria backend.

use crate::error::{Result, ServerClientError};
use crate::types::{LikeResponse, TrackListResponse};
use aria_core::Track;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use tracing::debug;
use url::Url;

/// Track client for the Aria backend.
pub struct TrackClient<'a> {
    http: &'a Client,
    base_url: &'a Url,
    access_token: Option<&'a str>,
}

impl<'a> TrackClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a Url, access_token: Option<&'a str>) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Get every track (`GET /api/tracks`).
    pub async fn get_tracks(&self) -> Result<Vec<Track>> {
        let url = self.endpoint(&["api", "tracks"])?;
        debug!(url = %url, "Fetching tracks");

        let response = self.send(self.http.get(url)).await?;
        let tracks = self.parse_tracks(response).await?;

        debug!(tracks = tracks.len(), "Fetched tracks");
        Ok(tracks)
    }

    /// Get the liked songs of a user.
    ///
    /// Uses `GET /api/users/{id}/liked-songs`, falling back to
    /// `GET /api/liked-songs?userId={id}` on servers without the nested route.
    pub async fn get_liked_songs(&self, user_id: &str) -> Result<Vec<Track>> {
        let url = self.endpoint(&["api", "users", user_id, "liked-songs"])?;
        debug!(url = %url, user_id = %user_id, "Fetching liked songs");

        let response = self.send(self.http.get(url)).await?;
        if response.status() != StatusCode::NOT_FOUND {
            return self.parse_tracks(response).await;
        }

        let mut url = self.endpoint(&["api", "liked-songs"])?;
        url.query_pairs_mut().append_pair("userId", user_id);
        debug!(url = %url, "Liked songs route missing, using query form");

        let response = self.send(self.http.get(url)).await?;
        self.parse_tracks(response).await
    }

    /// Toggle the like of a track, returning the new state.
    ///
    /// External tracks go to `POST /api/external-tracks/{id}/like` with the
    /// full track so the backend can store it; the rest to
    /// `POST /api/tracks/{id}/like`.
    pub async fn toggle_like(&self, track: &Track, user_id: Option<&str>) -> Result<bool> {
        let id = track.id.to_string();
        let request = if track.external {
            let url = self.endpoint(&["api", "external-tracks", &id, "like"])?;
            debug!(url = %url, track_id = %id, "Toggling like of external track");
            self.http.post(url).json(track)
        } else {
            let url = self.endpoint(&["api", "tracks", &id, "like"])?;
            debug!(url = %url, track_id = %id, "Toggling like");
            self.http.post(url).json(&json!({ "userId": user_id }))
        };

        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let like: LikeResponse = response.json().await.map_err(|e| {
            ServerClientError::ParseError(format!("Failed to parse like response: {}", e))
        })?;
        Ok(like.liked)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServerClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send an authorized request, telling an unreachable backend apart
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorized(request).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ServerClientError::ServerUnreachable(e.to_string())
            } else {
                ServerClientError::Request(e)
            }
        })
    }

    async fn parse_tracks(&self, response: Response) -> Result<Vec<Track>> {
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let list: TrackListResponse = response.json().await.map_err(|e| {
            ServerClientError::ParseError(format!("Failed to parse track list: {}", e))
        })?;

        Ok(list
            .into_tracks()
            .into_iter()
            .map(|track| resolve_urls(track, self.base_url))
            .collect())
    }
}

/// Error for a non-success response
async fn error_for(response: Response) -> ServerClientError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return ServerClientError::AuthRequired;
    }

    let message = response.text().await.unwrap_or_default();
    ServerClientError::ServerError {
        status: status.as_u16(),
        message,
    }
}

/// Make relative audio and artwork URLs absolute against the backend
fn resolve_urls(mut track: Track, base_url: &Url) -> Track {
    track.audio_url = resolve(base_url, &track.audio_url);
    track.artwork_url = track.artwork_url.map(|artwork| resolve(base_url, &artwork));
    track
}

fn resolve(base_url: &Url, reference: &str) -> String {
    if reference.is_empty() {
        return String::new();
    }

    // Joining against a directory keeps a base path such as "/app"
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }

    base.join(reference)
        .map_or_else(|_| reference.to_string(), |url| url.to_string())
}
