//! Aria Player Core
//!
//! Platform-agnostic core types, traits, and error handling for Aria Player.
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `PlaybackSource`
//! - **Collaborator Traits**: `TrackCatalog` (the backend seam used by playback)
//! - **Error Handling**: Unified `AriaError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use aria_core::{PlaybackSource, Track};
//!
//! let track = Track::new(7_i64, "Intro", "/tracks/intro.mp3")
//!     .with_artist("The Openers");
//!
//! assert_eq!(track.file_name(), Some("intro.mp3"));
//! assert_eq!("liked".parse::<PlaybackSource>().unwrap(), PlaybackSource::Liked);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{AriaError, Result};
pub use traits::TrackCatalog;
pub use types::{PlaybackSource, Track, TrackId, ESTIMATED_TRACK_DURATION};
