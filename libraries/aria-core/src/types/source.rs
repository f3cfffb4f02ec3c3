use crate::error::AriaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which track collection feeds playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackSource {
    /// Every track the backend knows
    #[default]
    All,

    /// The user's liked songs
    Liked,
}

impl PlaybackSource {
    /// Both sources, in display order
    pub const ALL: [PlaybackSource; 2] = [PlaybackSource::All, PlaybackSource::Liked];

    /// Wire name of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Liked => "liked",
        }
    }

    /// The source that is not this one
    pub fn other(&self) -> Self {
        match self {
            Self::All => Self::Liked,
            Self::Liked => Self::All,
        }
    }
}

impl fmt::Display for PlaybackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackSource {
    type Err = AriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "liked" => Ok(Self::Liked),
            other => Err(AriaError::invalid_input(format!(
                "unknown playback source '{}' (expected 'all' or 'liked')",
                other
            ))),
        }
    }
}
