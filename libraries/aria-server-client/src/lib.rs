//! Aria Player Server Client
//!
//! HTTP client for the track and like API of the Aria backend.
//!
//! # Features
//!
//! - **Tracks**: Fetch all tracks, with relative media URLs made absolute
//! - **Liked songs**: Fetch a user's liked songs (both route shapes)
//! - **Likes**: Toggle likes of stored and external tracks
//! - **Catalog**: Implements `aria_core::TrackCatalog` for the player
//!
//! # Example
//!
//! ```ignore
//! use aria_server_client::{AriaServerClient, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new("https://music.example.com")
//!         .with_user("42")
//!         .with_token("secret");
//!     let client = AriaServerClient::new(config)?;
//!
//!     let liked = client.get_liked_songs().await?;
//!     println!("{} liked songs", liked.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod tracks;
mod types;

// Re-export main types
pub use client::AriaServerClient;
pub use error::{Result, ServerClientError};
pub use tracks::TrackClient;
pub use types::{LikeResponse, ServerConfig};
