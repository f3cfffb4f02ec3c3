//! Player session - the context object a UI talks to
//!
//! Wraps the controller with the collaborators around it: the track catalog
//! (fetching lists, liking), the state store, and the other pages.
//! Every user-facing operation delegates to the controller and then persists.

use crate::{
    controller::PlaybackController,
    error::Result,
    events::PlaybackEvent,
    output::AudioOutput,
    persist::PersistedState,
    store::StateStore,
    sync::{SyncMessage, SyncTransport},
    types::{FailureReason, RepeatMode, Ticket},
};
use aria_core::{PlaybackSource, Track, TrackCatalog, TrackId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One page's player
pub struct PlayerSession<O: AudioOutput> {
    controller: PlaybackController<O>,
    catalog: Arc<dyn TrackCatalog>,
    store: Box<dyn StateStore>,
    sync: Option<Box<dyn SyncTransport>>,

    /// Sources fetched successfully during this session
    cached: HashSet<PlaybackSource>,

    /// IDs of liked tracks, keyed by their string form
    liked_ids: HashSet<String>,

    /// Play head at the last persist, for throttling time updates
    persisted_position: Duration,
}

impl<O: AudioOutput> PlayerSession<O> {
    pub fn new(
        controller: PlaybackController<O>,
        catalog: Arc<dyn TrackCatalog>,
        store: impl StateStore + 'static,
    ) -> Self {
        Self {
            controller,
            catalog,
            store: Box::new(store),
            sync: None,
            cached: HashSet::new(),
            liked_ids: HashSet::new(),
            persisted_position: Duration::ZERO,
        }
    }

    /// Connect to the other pages and ask them for their state
    pub fn join_sync(&mut self, transport: impl SyncTransport + 'static) {
        let mut transport: Box<dyn SyncTransport> = Box::new(transport);
        transport.publish(SyncMessage::StateRequested);
        self.sync = Some(transport);
    }

    // ===== Library =====

    /// Tracks of a source, fetched once per session
    ///
    /// A catalog failure is logged and yields an empty list; it is not
    /// cached, so the next call retries.
    pub async fn load_tracks(&mut self, source: PlaybackSource) -> Vec<Track> {
        if self.cached.contains(&source) {
            return self.controller.tracks(source).to_vec();
        }

        match self.refresh_tracks(source).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(%source, error = %e, "Failed to load tracks");
                Vec::new()
            }
        }
    }

    /// Fetch a source from the catalog, bypassing the cache
    pub async fn refresh_tracks(&mut self, source: PlaybackSource) -> Result<Vec<Track>> {
        let tracks = self.catalog.fetch_tracks(source).await?;
        info!(%source, count = tracks.len(), "Loaded tracks");

        if source == PlaybackSource::Liked {
            self.liked_ids = tracks.iter().map(|t| t.id.to_string()).collect();
        }
        self.controller.set_tracks(source, tracks.clone());
        self.cached.insert(source);
        Ok(tracks)
    }

    /// Switch between all and liked tracks
    ///
    /// Both lists are fetched if needed; an empty liked list falls back to
    /// all tracks.
    pub async fn set_playback_source(&mut self, source: PlaybackSource) {
        self.load_tracks(source).await;
        self.load_tracks(source.other()).await;
        self.controller.set_playback_source(source);
        self.persist();
    }

    /// Whether a track is liked, as far as this page knows
    pub fn is_liked(&self, track_id: &TrackId) -> bool {
        self.liked_ids.contains(&track_id.to_string())
    }

    /// Like or unlike the current track
    ///
    /// The change shows immediately and is reverted if the backend refuses
    /// it. Returns the resulting liked state, `None` with no current track.
    pub async fn toggle_like(&mut self) -> Option<bool> {
        let Some(track) = self.controller.current_track().cloned() else {
            warn!("Ignoring like, no current track");
            return None;
        };

        let was_liked = self.is_liked(&track.id);
        self.mark_liked(&track.id, !was_liked);

        match self.catalog.toggle_like(&track).await {
            Ok(liked) => {
                info!(track_id = %track.id, liked, "Toggled like");
                if liked == was_liked {
                    self.mark_liked(&track.id, liked);
                }
                if self.controller.active_source() == PlaybackSource::Liked {
                    // Playing from the liked list: it must stop offering the track now
                    if let Err(e) = self.refresh_tracks(PlaybackSource::Liked).await {
                        warn!(error = %e, "Failed to refresh liked tracks");
                        self.cached.remove(&PlaybackSource::Liked);
                    }
                    self.persist();
                } else {
                    // Refetched on next use
                    self.cached.remove(&PlaybackSource::Liked);
                }
                Some(liked)
            }
            Err(e) => {
                warn!(track_id = %track.id, error = %e, "Failed to toggle like, reverting");
                self.mark_liked(&track.id, was_liked);
                Some(was_liked)
            }
        }
    }

    // ===== Persistence & Sync =====

    /// Restore the stored state, fetching the lists it needs
    ///
    /// Returns whether a stored state was found.
    pub async fn restore(&mut self) -> bool {
        let saved = match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Failed to read saved playback state");
                None
            }
        };

        for source in PlaybackSource::ALL {
            self.load_tracks(source).await;
        }

        match saved {
            Some(state) => {
                self.controller.restore(&state);
                self.persisted_position = state.elapsed();
                true
            }
            None => {
                debug!("No saved playback state, starting fresh");
                false
            }
        }
    }

    /// Save the snapshot and announce it to the other pages
    pub fn persist(&mut self) {
        let snapshot = self.persist_local();
        if let Some(sync) = self.sync.as_mut() {
            sync.publish(SyncMessage::StateUpdated(snapshot));
        }
    }

    /// Save the snapshot without announcing it
    pub fn persist_local(&mut self) -> PersistedState {
        let snapshot = self.controller.snapshot();
        if let Err(e) = self.store.save(&snapshot) {
            warn!(error = %e, "Failed to save playback state");
        }
        self.persisted_position = self.controller.position();
        snapshot
    }

    /// Handle everything other pages announced since the last poll
    ///
    /// Returns the number of messages handled.
    pub async fn poll_sync(&mut self) -> usize {
        let messages: Vec<SyncMessage> = match self.sync.as_mut() {
            Some(sync) => std::iter::from_fn(|| sync.try_recv()).collect(),
            None => return 0,
        };

        let count = messages.len();
        for message in messages {
            self.handle_sync(message).await;
        }
        count
    }

    /// Handle one message from another page
    pub async fn handle_sync(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::StateUpdated(remote) => {
                if remote.source != self.controller.active_source() {
                    self.load_tracks(remote.source).await;
                }
                if self.controller.reconcile(&remote) {
                    debug!("Followed state of another page");
                }
                // Not announced again, or pages would echo forever
                self.persist_local();
            }
            SyncMessage::StateRequested => {
                let snapshot = self.controller.snapshot();
                if let Some(sync) = self.sync.as_mut() {
                    debug!("Answering state request from another page");
                    sync.publish(SyncMessage::StateUpdated(snapshot));
                }
            }
        }
    }

    /// The page is going away: save now
    pub fn on_page_hide(&mut self) {
        self.persist();
    }

    // ===== Transport =====

    pub fn load_track(&mut self, index: usize, autoplay: bool) {
        self.controller.load_track(index, autoplay);
        self.persist();
    }

    pub fn play(&mut self) {
        self.controller.play();
        self.persist();
    }

    pub fn pause(&mut self) {
        self.controller.pause();
        self.persist();
    }

    pub fn toggle_play_pause(&mut self) {
        self.controller.toggle_play_pause();
        self.persist();
    }

    pub fn stop(&mut self) {
        self.controller.stop();
        self.persist();
    }

    pub fn play_next(&mut self) {
        self.controller.play_next();
        self.persist();
    }

    pub fn play_previous(&mut self) {
        self.controller.play_previous();
        self.persist();
    }

    pub fn seek(&mut self, position: Duration) {
        self.controller.seek(position);
        self.persist();
    }

    pub fn seek_secs(&mut self, secs: f64) {
        self.controller.seek_secs(secs);
        self.persist();
    }

    // ===== Settings =====

    pub fn toggle_shuffle(&mut self) {
        self.controller.toggle_shuffle();
        self.persist();
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.controller.set_shuffle(enabled);
        self.persist();
    }

    pub fn toggle_repeat(&mut self) {
        self.controller.toggle_repeat();
        self.persist();
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.controller.set_repeat(mode);
        self.persist();
    }

    pub fn set_volume(&mut self, level: f32) {
        self.controller.set_volume(level);
        self.persist();
    }

    pub fn toggle_mute(&mut self) {
        self.controller.toggle_mute();
        self.persist();
    }

    // ===== Output Callbacks =====

    pub fn on_source_ready(&mut self, ticket: Ticket, duration: Option<Duration>) {
        self.controller.on_source_ready(ticket, duration);
        self.persist();
    }

    pub fn settle_play(&mut self, ticket: Ticket, result: std::result::Result<(), FailureReason>) {
        self.controller.settle_play(ticket, result);
        self.persist();
    }

    /// Persists at most once per persist interval of play time
    pub fn on_time_update(&mut self, ticket: Ticket, position: Duration) {
        self.controller.on_time_update(ticket, position);

        let current = self.controller.position();
        let moved = if current > self.persisted_position {
            current - self.persisted_position
        } else {
            self.persisted_position - current
        };
        if moved >= self.controller.config().persist_interval() {
            self.persist();
        }
    }

    pub fn on_track_ended(&mut self, ticket: Ticket) {
        self.controller.on_track_ended(ticket);
        self.persist();
    }

    pub fn on_media_error(&mut self, ticket: Ticket, reason: FailureReason) {
        self.controller.on_media_error(ticket, reason);
        self.persist();
    }

    // ===== Accessors =====

    pub fn controller(&self) -> &PlaybackController<O> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<O> {
        &mut self.controller
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.controller.drain_events()
    }

    fn mark_liked(&mut self, track_id: &TrackId, liked: bool) {
        let key = track_id.to_string();
        let changed = if liked {
            self.liked_ids.insert(key)
        } else {
            self.liked_ids.remove(&key)
        };
        if changed {
            self.controller.emit(PlaybackEvent::LikeChanged {
                track_id: track_id.clone(),
                liked,
            });
        }
    }
}
