/// Domain types for Aria Player
mod ids;
mod source;
mod track;

pub use ids::TrackId;
pub use source::PlaybackSource;
pub use track::{Track, ESTIMATED_TRACK_DURATION};
