/// ID types for Aria Player entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track identifier
///
/// The backend hands out integer ids for tracks it stores and string ids for
/// tracks proxied from external sources. Both forms survive a serde round trip
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackId {
    /// Integer id (tracks stored by the backend)
    Numeric(i64),
    /// String id (external tracks)
    Text(String),
}

impl TrackId {
    /// Create a string track ID
    pub fn new(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }

    /// Whether two ids name the same track, ignoring representation
    ///
    /// `7` and `"7"` refer to the same track once they went through a
    /// query string or a storage round trip.
    pub fn matches(&self, other: &TrackId) -> bool {
        self == other || self.to_string() == other.to_string()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{}", id),
            Self::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}
