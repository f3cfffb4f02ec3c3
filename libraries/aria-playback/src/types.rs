//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No track loaded
    Stopped,

    /// Source assigned, waiting for readiness or for the output to start
    Loading,

    /// Currently playing
    Playing,

    /// Track loaded, not playing
    Paused,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// No repetition
    #[default]
    None,

    /// Loop the active list
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the toggle cycle: none -> all -> one -> none
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }
}

/// Why the output could not play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// Fetching the media was aborted
    Aborted,

    /// Network failure while fetching the media
    Network,

    /// The media could not be decoded
    Decode,

    /// The source URL or format is not supported
    Unsupported,

    /// The host refused to start audio without a user gesture
    AutoplayBlocked,
}

impl FailureReason {
    /// Map an HTML `MediaError.code` (1-4) to a failure reason
    pub fn from_media_error_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Aborted),
            2 => Some(Self::Network),
            3 => Some(Self::Decode),
            4 => Some(Self::Unsupported),
            _ => None,
        }
    }

    /// Whether this is a normal condition rather than a fault
    ///
    /// Autoplay blocking only means a user gesture is needed.
    pub fn is_expected(self) -> bool {
        matches!(self, Self::AutoplayBlocked)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aborted => "aborted",
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Unsupported => "unsupported",
            Self::AutoplayBlocked => "autoplay-blocked",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureReason {
    type Err = String;

    /// Accepts the kebab-case names and the DOMException names a browser
    /// rejects `HTMLMediaElement.play()` with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aborted" | "AbortError" => Ok(Self::Aborted),
            "network" | "NetworkError" => Ok(Self::Network),
            "decode" | "EncodingError" => Ok(Self::Decode),
            "unsupported" | "NotSupportedError" => Ok(Self::Unsupported),
            "autoplay-blocked" | "NotAllowedError" => Ok(Self::AutoplayBlocked),
            other => Err(format!("unknown failure reason: {}", other)),
        }
    }
}

/// Identifier of one load or play attempt
///
/// Tickets increase monotonically per controller. A host callback carrying a
/// ticket that is no longer current belongs to a superseded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(u64);

impl Ticket {
    /// Rebuild a ticket from the raw value handed to a host
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Elapsed time after which "previous" restarts the current track (default: 3s)
    pub restart_threshold_secs: f64,

    /// Offset difference tolerated before another page forces a seek (default: 3s)
    pub sync_tolerance_secs: f64,

    /// Minimum time between persists caused by time updates (default: 5s)
    pub persist_interval_secs: f64,

    /// Sequential playback loops at the end of the list (default: true)
    ///
    /// When false, repeat `none` stops after the last track and only repeat
    /// `all` loops.
    pub wrap_at_end: bool,

    /// Seed for the shuffle generator (default: random)
    pub shuffle_seed: Option<u64>,
}

impl PlaybackConfig {
    pub fn restart_threshold(&self) -> Duration {
        secs_to_duration(self.restart_threshold_secs)
    }

    pub fn sync_tolerance(&self) -> Duration {
        secs_to_duration(self.sync_tolerance_secs)
    }

    pub fn persist_interval(&self) -> Duration {
        secs_to_duration(self.persist_interval_secs)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            restart_threshold_secs: 3.0,
            sync_tolerance_secs: 3.0,
            persist_interval_secs: 5.0,
            wrap_at_end: true,
            shuffle_seed: None,
        }
    }
}

/// Seconds to `Duration`, mapping negative and non-finite input to zero
pub(crate) fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
