/// Track domain type
use super::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duration assumed for tracks whose length the backend does not report
pub const ESTIMATED_TRACK_DURATION: Duration = Duration::from_secs(180);

/// A playable track as served by the backend
///
/// Immutable once fetched. Field names follow the backend's camelCase JSON;
/// the aliases cover the older and external-source record shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,

    pub title: String,

    #[serde(default)]
    pub artist: String,

    #[serde(default)]
    pub album: Option<String>,

    /// Length in seconds, if known
    #[serde(default, rename = "duration")]
    pub duration_secs: Option<f64>,

    /// Streamable audio URL (absolute, or relative to the backend)
    #[serde(alias = "url", alias = "src", alias = "filePath")]
    pub audio_url: String,

    #[serde(default, alias = "coverImage", alias = "cover")]
    pub artwork_url: Option<String>,

    #[serde(default)]
    pub play_count: Option<u64>,

    /// Track from a third-party source the backend may not have stored yet
    #[serde(default, alias = "isExternal")]
    pub external: bool,
}

impl Track {
    /// Create a track with the required fields
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: String::new(),
            album: None,
            duration_secs: None,
            audio_url: audio_url.into(),
            artwork_url: None,
            play_count: None,
            external: false,
        }
    }

    /// Set the artist
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Set the album
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_secs = Some(duration.as_secs_f64());
        self
    }

    /// Mark the track as coming from an external source
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Track length, estimated when the backend did not report one
    pub fn duration(&self) -> Duration {
        self.reported_duration().unwrap_or(ESTIMATED_TRACK_DURATION)
    }

    /// Whether `duration()` is an estimate
    pub fn is_duration_estimated(&self) -> bool {
        self.reported_duration().is_none()
    }

    /// Backend duration, if it is positive and fits a `Duration`
    fn reported_duration(&self) -> Option<Duration> {
        self.duration_secs
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Last path segment of the audio URL, without query or fragment
    pub fn file_name(&self) -> Option<&str> {
        let path = self
            .audio_url
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        path.rsplit('/').next().filter(|name| !name.is_empty())
    }
}
