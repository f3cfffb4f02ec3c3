//! Playback Events
//!
//! Event-based communication for UI synchronization. The controller queues
//! events as it changes state; hosts drain them after each call and forward
//! them to whatever renders the player.

use crate::types::{FailureReason, PlaybackState, RepeatMode};
use aria_core::{PlaybackSource, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PlaybackEvent {
    /// Playback state changed (playing, paused, stopped, loading)
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A different track was loaded
    TrackChanged {
        /// Index in the active list
        index: usize,
        /// ID of the new track
        track_id: TrackId,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Sequential playback reached the end of the list and stopped
    QueueEnded,

    /// Play head moved
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration (reported by the output, or estimated)
        duration_ms: u64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        volume: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    ShuffleChanged {
        enabled: bool,
    },

    RepeatChanged {
        mode: RepeatMode,
    },

    /// The active list switched to another source
    SourceChanged {
        source: PlaybackSource,
    },

    /// A track list was (re)installed
    TracksChanged {
        source: PlaybackSource,
        length: usize,
    },

    /// Liked state of a track changed (optimistically or confirmed)
    LikeChanged {
        track_id: TrackId,
        liked: bool,
    },

    /// The output could not load or play; the controller stays usable
    PlaybackFailed {
        reason: FailureReason,
        /// Track that failed, if one was loaded
        track_id: Option<TrackId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(PlaybackEvent::PlaybackFailed {
            reason: FailureReason::AutoplayBlocked,
            track_id: Some(TrackId::from(4_i64)),
        })
        .unwrap();

        assert_eq!(json["type"], "playback-failed");
        assert_eq!(json["reason"], "autoplay-blocked");
        assert_eq!(json["track_id"], 4);
    }
}
