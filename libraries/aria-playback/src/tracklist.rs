//! Track lists per playback source
//!
//! Holds the "all" and "liked" lists side by side and which of the two is
//! active. Indices handed around the controller always refer to the active
//! list.

use aria_core::{PlaybackSource, Track, TrackId};

/// The two track collections and the active selector
#[derive(Debug, Clone, Default)]
pub struct TrackLists {
    all: Vec<Track>,
    liked: Vec<Track>,
    active: PlaybackSource,
}

impl TrackLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks of a source
    pub fn get(&self, source: PlaybackSource) -> &[Track] {
        match source {
            PlaybackSource::All => &self.all,
            PlaybackSource::Liked => &self.liked,
        }
    }

    /// Replace the tracks of a source
    pub fn set(&mut self, source: PlaybackSource, tracks: Vec<Track>) {
        match source {
            PlaybackSource::All => self.all = tracks,
            PlaybackSource::Liked => self.liked = tracks,
        }
    }

    /// Tracks of the active source
    pub fn active(&self) -> &[Track] {
        self.get(self.active)
    }

    pub fn active_source(&self) -> PlaybackSource {
        self.active
    }

    pub fn set_active(&mut self, source: PlaybackSource) {
        self.active = source;
    }

    /// Track at an index of the active list
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.active().get(index)
    }

    /// Number of tracks in the active list
    pub fn len(&self) -> usize {
        self.active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }

    /// Index of a track in the active list
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.active().iter().position(|t| t.id.matches(id))
    }

    /// Index of a track in the active list by audio file name
    pub fn position_of_file(&self, file_name: &str) -> Option<usize> {
        self.active()
            .iter()
            .position(|t| t.file_name() == Some(file_name))
    }
}
