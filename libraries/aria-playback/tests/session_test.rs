//! Integration tests for the player session
//!
//! Catalog, store, and cross-page sync working together around the
//! controller. No shallow tests - every test verifies meaningful behavior.

use aria_core::{AriaError, PlaybackSource, Track, TrackCatalog, TrackId};
use aria_playback::{
    ChannelOutput, MemoryStore, OutputCommand, PersistedState, PlaybackConfig, PlaybackController,
    PlaybackEvent, PlayerSession, StateStore, SyncChannel,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

// ===== Test Helpers =====

/// In-memory catalog with switchable failures
struct MockCatalog {
    all: Vec<Track>,
    liked: Mutex<Vec<Track>>,
    fail_fetch: AtomicBool,
    fail_like: AtomicBool,
    fetches: AtomicUsize,
}

impl MockCatalog {
    fn new(count: usize) -> Self {
        Self {
            all: tracks(count),
            liked: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_like: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    fn with_liked(self, indices: &[usize]) -> Self {
        let liked = indices.iter().map(|&i| self.all[i].clone()).collect();
        *self.liked.lock().unwrap() = liked;
        self
    }
}

#[async_trait]
impl TrackCatalog for MockCatalog {
    async fn fetch_tracks(&self, source: PlaybackSource) -> aria_core::Result<Vec<Track>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AriaError::network("connection refused"));
        }
        Ok(match source {
            PlaybackSource::All => self.all.clone(),
            PlaybackSource::Liked => self.liked.lock().unwrap().clone(),
        })
    }

    async fn toggle_like(&self, track: &Track) -> aria_core::Result<bool> {
        if self.fail_like.load(Ordering::SeqCst) {
            return Err(AriaError::network("connection reset"));
        }
        let mut liked = self.liked.lock().unwrap();
        match liked.iter().position(|t| t.id == track.id) {
            Some(position) => {
                liked.remove(position);
                Ok(false)
            }
            None => {
                liked.push(track.clone());
                Ok(true)
            }
        }
    }
}

fn tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            Track::new(i as i64, format!("Song {i}"), format!("/audio/song-{i}.mp3"))
                .with_artist("Test Artist")
                .with_duration(Duration::from_secs(180))
        })
        .collect()
}

fn session(
    catalog: &Arc<MockCatalog>,
    store: &MemoryStore,
) -> (PlayerSession<ChannelOutput>, UnboundedReceiver<OutputCommand>) {
    let (output, rx) = ChannelOutput::new();
    let config = PlaybackConfig {
        shuffle_seed: Some(11),
        ..Default::default()
    };
    let controller = PlaybackController::new(output, config);
    let catalog: Arc<dyn TrackCatalog> = catalog.clone();
    (PlayerSession::new(controller, catalog, store.clone()), rx)
}

// ===== Library =====

#[tokio::test]
async fn test_catalog_failure_yields_empty_list_and_retries() {
    let catalog = Arc::new(MockCatalog::new(3));
    catalog.fail_fetch.store(true, Ordering::SeqCst);
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());

    assert!(session.load_tracks(PlaybackSource::All).await.is_empty());

    // Still usable with nothing to play
    session.play();
    session.play_next();
    assert!(session.controller().current_track().is_none());

    catalog.fail_fetch.store(false, Ordering::SeqCst);
    assert_eq!(session.load_tracks(PlaybackSource::All).await.len(), 3);
    assert_eq!(catalog.fetches.load(Ordering::SeqCst), 2);

    // Cached from here on
    assert_eq!(session.load_tracks(PlaybackSource::All).await.len(), 3);
    assert_eq!(catalog.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_refresh_reports_catalog_errors() {
    let catalog = Arc::new(MockCatalog::new(2));
    catalog.fail_fetch.store(true, Ordering::SeqCst);
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());

    assert!(session.refresh_tracks(PlaybackSource::All).await.is_err());
}

#[tokio::test]
async fn test_empty_liked_list_falls_back_to_all() {
    let catalog = Arc::new(MockCatalog::new(3));
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());

    session.set_playback_source(PlaybackSource::Liked).await;

    assert_eq!(session.controller().active_source(), PlaybackSource::All);
    assert_eq!(session.controller().active_tracks().len(), 3);
}

#[tokio::test]
async fn test_switch_to_liked_keeps_playing_track() {
    let catalog = Arc::new(MockCatalog::new(4).with_liked(&[1, 3]));
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());
    session.load_tracks(PlaybackSource::All).await;
    session.load_track(3, false);

    session.set_playback_source(PlaybackSource::Liked).await;

    let controller = session.controller();
    assert_eq!(controller.active_source(), PlaybackSource::Liked);
    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.current_track().map(|t| t.title.as_str()), Some("Song 3"));
}

// ===== Likes =====

#[tokio::test]
async fn test_toggle_like_is_optimistic_and_reverts_on_failure() {
    let catalog = Arc::new(MockCatalog::new(3));
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());
    session.load_tracks(PlaybackSource::All).await;
    session.load_track(0, false);
    session.drain_events();

    assert_eq!(session.toggle_like().await, Some(true));
    assert!(session.is_liked(&TrackId::from(0_i64)));
    assert!(session.drain_events().contains(&PlaybackEvent::LikeChanged {
        track_id: TrackId::from(0_i64),
        liked: true,
    }));

    catalog.fail_like.store(true, Ordering::SeqCst);
    assert_eq!(session.toggle_like().await, Some(true));
    assert!(session.is_liked(&TrackId::from(0_i64)));

    let likes: Vec<bool> = session
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            PlaybackEvent::LikeChanged { liked, .. } => Some(liked),
            _ => None,
        })
        .collect();
    assert_eq!(likes, vec![false, true]);
}

#[tokio::test]
async fn test_toggle_like_refetches_liked_list() {
    let catalog = Arc::new(MockCatalog::new(3));
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());
    session.load_tracks(PlaybackSource::All).await;
    session.load_tracks(PlaybackSource::Liked).await;
    session.load_track(2, false);

    session.toggle_like().await;
    let liked = session.load_tracks(PlaybackSource::Liked).await;

    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].id, TrackId::from(2_i64));
}

#[tokio::test]
async fn test_unliking_last_liked_track_falls_back_to_all() {
    let catalog = Arc::new(MockCatalog::new(3).with_liked(&[1]));
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());
    session.set_playback_source(PlaybackSource::Liked).await;
    session.load_track(0, false);

    assert_eq!(session.toggle_like().await, Some(false));

    let controller = session.controller();
    assert!(!session.is_liked(&TrackId::from(1_i64)));
    assert!(controller.tracks(PlaybackSource::Liked).is_empty());
    assert_eq!(controller.active_source(), PlaybackSource::All);
    assert_eq!(controller.active_tracks().len(), 3);
    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.current_track().map(|t| t.title.as_str()), Some("Song 1"));
}

#[tokio::test]
async fn test_toggle_like_without_track() {
    let catalog = Arc::new(MockCatalog::new(0));
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());

    assert_eq!(session.toggle_like().await, None);
}

// ===== Persistence =====

#[tokio::test]
async fn test_operations_persist_snapshot() {
    let catalog = Arc::new(MockCatalog::new(5));
    let store = MemoryStore::new();
    let (mut session, _rx) = session(&catalog, &store);
    session.load_tracks(PlaybackSource::All).await;

    session.load_track(1, false);
    session.toggle_shuffle();
    session.set_volume(0.25);

    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.current_index, 1);
    assert!(saved.shuffle);
    assert_eq!(saved.shuffle_queue[0], 1);
    assert_eq!(saved.volume, 0.25);
    assert_eq!(saved.track_id, Some(TrackId::from(1_i64)));
    assert_eq!(saved.track_file.as_deref(), Some("song-1.mp3"));
}

#[tokio::test]
async fn test_restore_resumes_saved_track() {
    let catalog = Arc::new(MockCatalog::new(4));
    let store = MemoryStore::with_state(PersistedState {
        current_index: 0,
        track_id: Some(TrackId::from(2_i64)),
        elapsed_secs: 30.0,
        repeat: aria_playback::RepeatMode::One,
        ..Default::default()
    });
    let (mut session, mut rx) = session(&catalog, &store);

    assert!(session.restore().await);

    let controller = session.controller();
    assert_eq!(controller.current_index(), 2);
    assert_eq!(controller.position(), Duration::from_secs(30));
    assert_eq!(controller.repeat(), aria_playback::RepeatMode::One);

    let mut loaded = None;
    while let Ok(command) = rx.try_recv() {
        if let OutputCommand::Load { url, .. } = command {
            loaded = Some(url);
        }
    }
    assert_eq!(loaded.as_deref(), Some("/audio/song-2.mp3"));
}

#[tokio::test]
async fn test_restore_without_saved_state() {
    let catalog = Arc::new(MockCatalog::new(2));
    let (mut session, _rx) = session(&catalog, &MemoryStore::new());

    assert!(!session.restore().await);
    assert_eq!(session.controller().active_tracks().len(), 2);
}

#[tokio::test]
async fn test_time_updates_persist_throttled() {
    let catalog = Arc::new(MockCatalog::new(2));
    let store = MemoryStore::new();
    let (mut session, _rx) = session(&catalog, &store);
    session.load_tracks(PlaybackSource::All).await;

    session.load_track(0, true);
    let ticket = session.controller().load_ticket().unwrap();
    session.on_source_ready(ticket, None);

    session.on_time_update(ticket, Duration::from_secs(2));
    assert_eq!(store.load().unwrap().unwrap().elapsed_secs, 0.0);

    session.on_time_update(ticket, Duration::from_secs(6));
    assert_eq!(store.load().unwrap().unwrap().elapsed_secs, 6.0);

    // Forced on page hide
    session.on_time_update(ticket, Duration::from_secs(7));
    session.on_page_hide();
    assert_eq!(store.load().unwrap().unwrap().elapsed_secs, 7.0);
}

// ===== Cross-page Sync =====

#[tokio::test]
async fn test_pages_follow_each_other() {
    let catalog = Arc::new(MockCatalog::new(4));
    let store = MemoryStore::new();
    let channel = SyncChannel::default();

    let (mut first, _first_rx) = session(&catalog, &store);
    let (mut second, _second_rx) = session(&catalog, &store);
    first.restore().await;
    second.restore().await;

    first.join_sync(channel.subscribe());
    second.join_sync(channel.subscribe());

    // The first page answers the second page's request
    assert_eq!(first.poll_sync().await, 1);
    assert_eq!(second.poll_sync().await, 1);

    first.load_track(2, false);
    first.set_volume(0.3);
    assert_eq!(second.poll_sync().await, 2);
    assert_eq!(second.controller().current_index(), 2);
    assert_eq!(second.controller().volume(), 0.3);

    // Following does not echo back
    assert_eq!(first.poll_sync().await, 0);
}

#[tokio::test]
async fn test_small_drift_is_tolerated_between_pages() {
    let catalog = Arc::new(MockCatalog::new(3));
    let channel = SyncChannel::default();

    let (mut first, _first_rx) = session(&catalog, &MemoryStore::new());
    let (mut second, mut second_rx) = session(&catalog, &MemoryStore::new());
    first.restore().await;
    second.restore().await;
    first.join_sync(channel.subscribe());
    second.join_sync(channel.subscribe());
    first.poll_sync().await;
    second.poll_sync().await;

    // Both pages on the same track and offset
    first.load_track(1, false);
    let ticket = first.controller().load_ticket().unwrap();
    first.on_source_ready(ticket, None);
    second.poll_sync().await;
    let ticket = second.controller().load_ticket().unwrap();
    second.on_source_ready(ticket, None);
    while second_rx.try_recv().is_ok() {}

    first.seek(Duration::from_secs(2));
    second.poll_sync().await;
    assert!(!second_rx
        .try_recv()
        .map(|c| matches!(c, OutputCommand::Seek { .. }))
        .unwrap_or(false));

    first.seek(Duration::from_secs(60));
    second.poll_sync().await;
    assert_eq!(second.controller().position(), Duration::from_secs(60));
}
