//! Aria Player - Playback Control
//!
//! Platform-agnostic playback state machine for Aria Player.
//!
//! This crate provides:
//! - Two track lists (all tracks, liked tracks) with one active
//! - Shuffle with a materialized queue (current track pinned first)
//! - Repeat modes (none, all, one), mutually exclusive with shuffle
//! - Volume (0.0-1.0) with mute
//! - A persisted snapshot of the player and cross-page synchronization
//!
//! # Architecture
//!
//! The audio element (or device) is driven through the `AudioOutput` trait.
//! Loading and starting playback are asynchronous on every real platform, so
//! each request carries a `Ticket` and the host reports back through the
//! controller's `on_*` callbacks and `settle_play`. Answers quoting an old
//! ticket are ignored, which keeps rapid skipping race-free.
//!
//! `PlayerSession` adds the collaborators: a `TrackCatalog` for fetching and
//! liking, a `StateStore` for the snapshot, and a `SyncTransport` to the
//! other pages.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use aria_core::{PlaybackSource, Track};
//! use aria_playback::{ChannelOutput, OutputCommand, PlaybackConfig, PlaybackController};
//!
//! let (output, mut commands) = ChannelOutput::new();
//! let mut controller = PlaybackController::new(output, PlaybackConfig::default());
//!
//! controller.set_tracks(
//!     PlaybackSource::All,
//!     vec![
//!         Track::new(1_i64, "First", "/audio/first.mp3"),
//!         Track::new(2_i64, "Second", "/audio/second.mp3"),
//!     ],
//! );
//!
//! controller.load_track(0, true);
//!
//! // The host loads the URL and reports back with the ticket it was given
//! let ticket = controller.load_ticket().unwrap();
//! controller.on_source_ready(ticket, None);
//!
//! let play = controller.pending_play_ticket().unwrap();
//! controller.settle_play(play, Ok(()));
//! assert!(controller.is_playing());
//!
//! # let _ = commands.try_recv();
//! ```
//!
//! # Example: Shuffle and Repeat
//!
//! ```rust
//! use aria_playback::{ChannelOutput, PlaybackConfig, PlaybackController, RepeatMode};
//!
//! let (output, _commands) = ChannelOutput::new();
//! let mut controller = PlaybackController::new(output, PlaybackConfig::default());
//!
//! controller.toggle_shuffle();
//! assert!(controller.shuffle());
//!
//! // Any repeat mode turns shuffle off
//! controller.toggle_repeat();
//! assert_eq!(controller.repeat(), RepeatMode::All);
//! assert!(!controller.shuffle());
//! ```

mod controller;
mod error;
mod events;
mod output;
mod persist;
mod session;
mod shuffle;
pub mod store;
pub mod sync;
mod tracklist;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use output::{AudioOutput, ChannelOutput, OutputCommand};
pub use persist::PersistedState;
pub use session::PlayerSession;
pub use shuffle::ShuffleQueue;
pub use store::{FileStore, MemoryStore, StateStore};
pub use sync::{SyncChannel, SyncEnvelope, SyncHandle, SyncMessage, SyncTransport};
pub use tracklist::TrackLists;
pub use types::{FailureReason, PlaybackConfig, PlaybackState, RepeatMode, Ticket};
pub use volume::Volume;
