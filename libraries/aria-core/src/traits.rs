/// Collaborator traits for Aria Player
use crate::error::Result;
use crate::types::{PlaybackSource, Track};
use async_trait::async_trait;

/// Track catalog trait
///
/// The backend seen from the player: it lists the tracks of a playback source
/// and flips the liked state of a track. Implemented over HTTP by
/// `aria-server-client`; tests provide in-memory versions.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Fetch the ordered track list for a playback source
    ///
    /// # Errors
    /// Returns an error if the backend cannot be reached or answers with
    /// something that is not a track list
    async fn fetch_tracks(&self, source: PlaybackSource) -> Result<Vec<Track>>;

    /// Toggle the liked state of a track
    ///
    /// Returns the liked state reported by the backend after the toggle.
    ///
    /// # Errors
    /// Returns an error if the backend rejects or cannot receive the request
    async fn toggle_like(&self, track: &Track) -> Result<bool>;
}
