//! WASM-compatible PlaybackController wrapper

use super::{CallbackOutput, LocalStorageStore};
use crate::{
    store::StateStore,
    sync::{SyncEnvelope, SyncMessage},
    FailureReason, PlaybackConfig, PlaybackController, PlaybackState, RepeatMode, Ticket,
};
use aria_core::{PlaybackSource, Track};
use js_sys::Function;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

/// WASM-compatible playback controller
///
/// Wraps the core controller with a JavaScript-friendly API. After every call
/// pending events go to the event callback and the snapshot is written to
/// `localStorage` and handed to the sync callback (as envelope JSON for a
/// `BroadcastChannel`).
#[wasm_bindgen]
pub struct WasmPlaybackController {
    inner: PlaybackController<CallbackOutput>,
    store: LocalStorageStore,
    page_id: Uuid,
    persisted_position: Duration,

    // Callbacks
    on_event: Option<Function>,
    on_sync: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlaybackController {
    /// Create a controller; `config` is an optional `PlaybackConfig` object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlaybackController, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?
        };

        Ok(Self {
            inner: PlaybackController::new(CallbackOutput::new(), config),
            store: LocalStorageStore::new(),
            page_id: Uuid::new_v4(),
            persisted_position: Duration::ZERO,
            on_event: None,
            on_sync: None,
        })
    }

    // ===== Callbacks =====

    /// Receives output commands (`{ command: "play", ticket }`, ...)
    #[wasm_bindgen(js_name = setOnOutput)]
    pub fn set_on_output(&mut self, callback: Function) {
        self.inner.output_mut().set_callback(callback);
    }

    /// Receives playback events (`{ type: "track-changed", ... }`, ...)
    #[wasm_bindgen(js_name = setOnEvent)]
    pub fn set_on_event(&mut self, callback: Function) {
        self.on_event = Some(callback);
    }

    /// Receives sync envelopes as JSON strings for the other pages
    #[wasm_bindgen(js_name = setOnSync)]
    pub fn set_on_sync(&mut self, callback: Function) {
        self.on_sync = Some(callback);
        self.publish(SyncMessage::StateRequested);
    }

    // ===== Library =====

    /// Install a track list; `source` is "all" or "liked"
    #[wasm_bindgen(js_name = setTracks)]
    pub fn set_tracks(&mut self, source: &str, tracks: JsValue) -> Result<(), JsValue> {
        let source: PlaybackSource = source
            .parse()
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {e}")))?;

        self.inner.set_tracks(source, tracks);
        self.flush_events();
        Ok(())
    }

    #[wasm_bindgen(js_name = setPlaybackSource)]
    pub fn set_playback_source(&mut self, source: &str) {
        self.inner.set_playback_source_str(source);
        self.changed();
    }

    // ===== Playback Control =====

    #[wasm_bindgen(js_name = loadTrack)]
    pub fn load_track(&mut self, index: usize, autoplay: bool) {
        self.inner.load_track(index, autoplay);
        self.changed();
    }

    pub fn play(&mut self) {
        self.inner.play();
        self.changed();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
        self.changed();
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) {
        self.inner.toggle_play_pause();
        self.changed();
    }

    pub fn next(&mut self) {
        self.inner.play_next();
        self.changed();
    }

    pub fn previous(&mut self) {
        self.inner.play_previous();
        self.changed();
    }

    /// Seek to position in seconds
    pub fn seek(&mut self, position_secs: f64) {
        self.inner.seek_secs(position_secs);
        self.changed();
    }

    // ===== Shuffle, Repeat & Volume =====

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&mut self) {
        self.inner.toggle_shuffle();
        self.changed();
    }

    #[wasm_bindgen(js_name = toggleRepeat)]
    pub fn toggle_repeat(&mut self) {
        self.inner.toggle_repeat();
        self.changed();
    }

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: f32) {
        self.inner.set_volume(level);
        self.changed();
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.inner.toggle_mute();
        self.changed();
    }

    // ===== Audio Element Events =====

    /// `canplay` for the source loaded under `ticket`
    #[wasm_bindgen(js_name = onSourceReady)]
    pub fn on_source_ready(&mut self, ticket: f64, duration_secs: Option<f64>) {
        let duration = duration_secs
            .filter(|d| *d > 0.0)
            .and_then(|d| Duration::try_from_secs_f64(d).ok());
        self.inner.on_source_ready(ticket_from_js(ticket), duration);
        self.changed();
    }

    /// `timeupdate`; persists at most once per persist interval
    #[wasm_bindgen(js_name = onTimeUpdate)]
    pub fn on_time_update(&mut self, ticket: f64, position_secs: f64) {
        let Ok(position) = Duration::try_from_secs_f64(position_secs) else {
            return;
        };
        self.inner.on_time_update(ticket_from_js(ticket), position);
        self.flush_events();

        let current = self.inner.position();
        let moved = if current > self.persisted_position {
            current - self.persisted_position
        } else {
            self.persisted_position - current
        };
        if moved >= self.inner.config().persist_interval() {
            self.persist();
        }
    }

    /// `ended`
    #[wasm_bindgen(js_name = onTrackEnded)]
    pub fn on_track_ended(&mut self, ticket: f64) {
        self.inner.on_track_ended(ticket_from_js(ticket));
        self.changed();
    }

    /// `error`, with the `MediaError.code` of the element
    #[wasm_bindgen(js_name = onMediaError)]
    pub fn on_media_error(&mut self, ticket: f64, code: u16) {
        let reason = FailureReason::from_media_error_code(code).unwrap_or(FailureReason::Network);
        self.inner.on_media_error(ticket_from_js(ticket), reason);
        self.changed();
    }

    /// Settle the promise returned by `audio.play()`
    ///
    /// `error_name` is the rejection's `DOMException.name`, absent on success.
    #[wasm_bindgen(js_name = settlePlay)]
    pub fn settle_play(&mut self, ticket: f64, error_name: Option<String>) {
        let result = match error_name {
            None => Ok(()),
            Some(name) => Err(name.parse().unwrap_or_else(|_| {
                warn!(%name, "Unknown play rejection");
                FailureReason::Aborted
            })),
        };
        self.inner.settle_play(ticket_from_js(ticket), result);
        self.changed();
    }

    // ===== Persistence & Sync =====

    /// Resume from `localStorage`; call after installing the track lists
    pub fn restore(&mut self) -> bool {
        let saved = match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Failed to read saved playback state");
                None
            }
        };

        let restored = match saved {
            Some(state) => {
                self.inner.restore(&state);
                self.persisted_position = state.elapsed();
                true
            }
            None => false,
        };
        self.flush_events();
        restored
    }

    /// Handle a sync envelope (JSON) posted by another page
    #[wasm_bindgen(js_name = receiveSync)]
    pub fn receive_sync(&mut self, json: &str) {
        let envelope = match SyncEnvelope::from_json(json) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed sync message");
                return;
            }
        };
        if envelope.origin == self.page_id {
            return;
        }

        match envelope.message {
            SyncMessage::StateUpdated(remote) => {
                if self.inner.reconcile(&remote) {
                    debug!("Followed state of another page");
                }
                self.flush_events();
                self.save();
            }
            SyncMessage::StateRequested => {
                let snapshot = self.inner.snapshot();
                self.publish(SyncMessage::StateUpdated(snapshot));
            }
        }
    }

    /// `pagehide`: save now
    #[wasm_bindgen(js_name = onPageHide)]
    pub fn on_page_hide(&mut self) {
        self.persist();
    }

    // ===== State Queries =====

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        match self.inner.state() {
            PlaybackState::Stopped => "stopped".to_string(),
            PlaybackState::Loading => "loading".to_string(),
            PlaybackState::Playing => "playing".to_string(),
            PlaybackState::Paused => "paused".to_string(),
        }
    }

    #[wasm_bindgen(js_name = getCurrentIndex)]
    pub fn get_current_index(&self) -> usize {
        self.inner.current_index()
    }

    #[wasm_bindgen(js_name = getCurrentTrack)]
    pub fn get_current_track(&self) -> JsValue {
        self.inner
            .current_track()
            .and_then(|t| serde_wasm_bindgen::to_value(t).ok())
            .unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> f64 {
        self.inner.position().as_secs_f64()
    }

    #[wasm_bindgen(js_name = getDuration)]
    pub fn get_duration(&self) -> f64 {
        self.inner.duration().as_secs_f64()
    }

    #[wasm_bindgen(js_name = getVolume)]
    pub fn get_volume(&self) -> f32 {
        self.inner.volume()
    }

    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.inner.is_muted()
    }

    #[wasm_bindgen(js_name = getShuffle)]
    pub fn get_shuffle(&self) -> bool {
        self.inner.shuffle()
    }

    #[wasm_bindgen(js_name = getRepeat)]
    pub fn get_repeat(&self) -> String {
        match self.inner.repeat() {
            RepeatMode::None => "none".to_string(),
            RepeatMode::All => "all".to_string(),
            RepeatMode::One => "one".to_string(),
        }
    }

    #[wasm_bindgen(js_name = getPlaybackSource)]
    pub fn get_playback_source(&self) -> String {
        self.inner.active_source().to_string()
    }

    // ===== Internals =====

    fn changed(&mut self) {
        self.flush_events();
        self.persist();
    }

    fn flush_events(&mut self) {
        let events = self.inner.drain_events();
        let Some(callback) = &self.on_event else {
            return;
        };

        for event in events {
            match serde_wasm_bindgen::to_value(&event) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        warn!(error = ?e, "Event callback threw");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to encode playback event"),
            }
        }
    }

    fn persist(&mut self) {
        let snapshot = self.save();
        self.publish(SyncMessage::StateUpdated(snapshot));
    }

    fn save(&mut self) -> crate::PersistedState {
        let snapshot = self.inner.snapshot();
        if let Err(e) = self.store.save(&snapshot) {
            warn!(error = %e, "Failed to save playback state");
        }
        self.persisted_position = self.inner.position();
        snapshot
    }

    fn publish(&self, message: SyncMessage) {
        let Some(callback) = &self.on_sync else {
            return;
        };

        let envelope = SyncEnvelope {
            origin: self.page_id,
            message,
        };
        match envelope.to_json() {
            Ok(json) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    warn!(error = ?e, "Sync callback threw");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode sync message"),
        }
    }
}

fn ticket_from_js(ticket: f64) -> Ticket {
    Ticket::from_raw(ticket as u64)
}
