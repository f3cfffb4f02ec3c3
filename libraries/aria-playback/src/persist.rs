//! Persisted mirror of the playback state
//!
//! One small JSON document, rewritten on every meaningful change and read back
//! when a page starts or another page announces its state.

use crate::types::{secs_to_duration, RepeatMode};
use aria_core::{PlaybackSource, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot of everything needed to resume playback elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    /// Index into the active list
    pub current_index: usize,
    pub playing: bool,
    pub volume: f32,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    /// Shuffle order over the active list (empty when shuffle is off)
    pub shuffle_queue: Vec<usize>,
    pub source: PlaybackSource,
    /// ID of the current track, used to re-find it if the list moved
    pub track_id: Option<TrackId>,
    /// Audio file name of the current track
    pub track_file: Option<String>,
    pub elapsed_secs: f64,
}

impl PersistedState {
    /// Elapsed offset, with garbage values mapped to zero
    pub fn elapsed(&self) -> Duration {
        secs_to_duration(self.elapsed_secs)
    }
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            current_index: 0,
            playing: false,
            volume: 1.0,
            muted: false,
            shuffle: false,
            repeat: RepeatMode::None,
            shuffle_queue: Vec::new(),
            source: PlaybackSource::All,
            track_id: None,
            track_file: None,
            elapsed_secs: 0.0,
        }
    }
}
