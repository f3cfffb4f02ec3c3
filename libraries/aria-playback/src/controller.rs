//! Playback controller - core state machine
//!
//! Single authority over what is playing, from where, and what plays next.
//! Coordinates the track lists, shuffle queue, volume, and the audio output.

use crate::{
    events::PlaybackEvent,
    output::AudioOutput,
    persist::PersistedState,
    shuffle::ShuffleQueue,
    tracklist::TrackLists,
    types::{secs_to_duration, FailureReason, PlaybackConfig, PlaybackState, RepeatMode, Ticket},
    volume::Volume,
};
use aria_core::{PlaybackSource, Track, TrackId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The track currently assigned to the output
#[derive(Debug, Clone)]
struct LoadedTrack {
    track: Track,

    /// Index in the active list, `None` once the active list no longer has it
    index: Option<usize>,

    /// Ticket of the load request; readiness, time and end callbacks quote it
    ticket: Ticket,

    /// The output reported the source as playable
    ready: bool,
}

/// Central playback state machine
///
/// Owns:
/// - The "all" and "liked" track lists and which one is active
/// - The current index and the loaded track
/// - Shuffle (with its queue) and repeat modes, mutually exclusive
/// - Volume and mute
/// - Outstanding load/play tickets
///
/// Every operation is synchronous and infallible: bad input is logged and
/// ignored, output failures become `PlaybackEvent::PlaybackFailed`. The host
/// feeds audio-subsystem callbacks back in through the `on_*` methods and
/// `settle_play`, and drains events with `drain_events`.
pub struct PlaybackController<O: AudioOutput> {
    output: O,
    config: PlaybackConfig,

    // Track lists and position in them
    lists: TrackLists,
    current_index: usize,
    loaded: Option<LoadedTrack>,

    // State
    state: PlaybackState,
    position: Duration,
    duration: Option<Duration>,

    // Settings
    volume: Volume,
    shuffle: bool,
    repeat: RepeatMode,
    shuffle_queue: ShuffleQueue,
    rng: StdRng,

    // Asynchronous transport bookkeeping
    autoplay_on_ready: bool,
    resume_at: Option<Duration>,
    pending_play: Option<Ticket>,
    last_ticket: u64,
    last_failure: Option<FailureReason>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl<O: AudioOutput> PlaybackController<O> {
    /// Create a controller driving `output`
    pub fn new(output: O, config: PlaybackConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let volume = Volume::new(config.volume);

        let mut controller = Self {
            output,
            config,
            lists: TrackLists::new(),
            current_index: 0,
            loaded: None,
            state: PlaybackState::Stopped,
            position: Duration::ZERO,
            duration: None,
            volume,
            shuffle: false,
            repeat: RepeatMode::None,
            shuffle_queue: ShuffleQueue::new(),
            rng,
            autoplay_on_ready: false,
            resume_at: None,
            pending_play: None,
            last_ticket: 0,
            last_failure: None,
            pending_events: Vec::new(),
        };
        controller.output.set_volume(controller.volume.gain());
        controller
    }

    // ===== Track Lists =====

    /// Install the track list of a source
    ///
    /// When the source is active the current track is looked up again in the
    /// new list, so a refresh does not move playback.
    pub fn set_tracks(&mut self, source: PlaybackSource, tracks: Vec<Track>) {
        let length = tracks.len();
        let anchor = self.anchor_id();
        self.lists.set(source, tracks);

        debug!(%source, length, "Installed track list");
        self.emit(PlaybackEvent::TracksChanged { source, length });

        if source != self.lists.active_source() {
            return;
        }

        if source == PlaybackSource::Liked && length == 0 {
            warn!("Active liked list is now empty, falling back to all tracks");
            self.lists.set_active(PlaybackSource::All);
            self.reanchor(anchor.as_ref(), 0);
            self.emit(PlaybackEvent::SourceChanged {
                source: PlaybackSource::All,
            });
        } else {
            let fallback = self.current_index.min(length.saturating_sub(1));
            self.reanchor(anchor.as_ref(), fallback);
        }

        if self.shuffle {
            self.regenerate_shuffle();
        }
    }

    /// Switch the active list
    ///
    /// An empty liked list falls back to all tracks so the player is never
    /// left without anything to play. The loaded track keeps playing.
    pub fn set_playback_source(&mut self, source: PlaybackSource) {
        let target = if source == PlaybackSource::Liked && self.lists.get(source).is_empty() {
            warn!("Liked list is empty, falling back to all tracks");
            PlaybackSource::All
        } else {
            source
        };

        if target == self.lists.active_source() {
            return;
        }

        let anchor = self.anchor_id();
        self.lists.set_active(target);
        self.reanchor(anchor.as_ref(), 0);
        if self.shuffle {
            self.regenerate_shuffle();
        }

        info!(source = %target, tracks = self.lists.len(), "Switched playback source");
        self.emit(PlaybackEvent::SourceChanged { source: target });
    }

    /// Switch the active list by name
    ///
    /// Unknown names are logged and ignored.
    pub fn set_playback_source_str(&mut self, source: &str) {
        match source.parse::<PlaybackSource>() {
            Ok(source) => self.set_playback_source(source),
            Err(e) => warn!(error = %e, "Ignoring playback source change"),
        }
    }

    // ===== Transport =====

    /// Load the track at `index` of the active list
    ///
    /// A track that is already loaded and ready is left alone; only a pending
    /// resume (autoplay while paused) is honored. Anything else replaces the
    /// source, resets the elapsed time, and starts playback once the output
    /// reports readiness if `autoplay` is set or playback was in progress.
    pub fn load_track(&mut self, index: usize, autoplay: bool) {
        let Some(track) = self.lists.track(index).cloned() else {
            warn!(index, len = self.lists.len(), "Ignoring load of out-of-range track index");
            return;
        };

        let already_loaded = self
            .loaded
            .as_ref()
            .is_some_and(|l| l.ready && l.index == Some(index) && l.track.id.matches(&track.id));
        if already_loaded {
            if autoplay && !self.playback_in_progress() {
                self.start_playback();
            }
            return;
        }

        let autoplay = autoplay || self.playback_in_progress();
        self.supersede_pending_play();
        if self.loaded.take().is_some() {
            self.output.unload();
        }

        let ticket = self.next_ticket();
        self.output.load(&track.audio_url, ticket);
        debug!(index, track_id = %track.id, %ticket, autoplay, "Loading track");

        let track_id = track.id.clone();
        self.loaded = Some(LoadedTrack {
            track,
            index: Some(index),
            ticket,
            ready: false,
        });
        self.current_index = index;
        self.position = Duration::ZERO;
        self.duration = None;
        self.resume_at = None;
        self.autoplay_on_ready = autoplay;
        self.last_failure = None;

        self.emit(PlaybackEvent::TrackChanged { index, track_id });
        self.emit_position();
        self.set_state(PlaybackState::Loading);
    }

    /// Start or resume playback
    ///
    /// The output answers asynchronously through `settle_play`. With nothing
    /// loaded the current index is loaded with autoplay.
    pub fn play(&mut self) {
        match self.loaded.as_ref().map(|l| l.ready) {
            None => {
                if self.lists.is_empty() {
                    warn!("Nothing to play, active list is empty");
                    return;
                }
                let index = self.current_index.min(self.lists.len() - 1);
                self.load_track(index, true);
            }
            Some(false) => {
                // Starts from on_source_ready
                self.autoplay_on_ready = true;
            }
            Some(true) => {
                if self.state == PlaybackState::Playing || self.pending_play.is_some() {
                    return;
                }
                self.start_playback();
            }
        }
    }

    /// Pause playback
    ///
    /// Any play request still in flight is superseded; its settlement will be
    /// ignored.
    pub fn pause(&mut self) {
        self.autoplay_on_ready = false;
        self.supersede_pending_play();

        if self.loaded.is_some() {
            self.output.pause();
            self.set_state(PlaybackState::Paused);
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.playback_in_progress() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop playback and release the source (lists and settings are kept)
    pub fn stop(&mut self) {
        self.autoplay_on_ready = false;
        self.supersede_pending_play();
        if self.loaded.take().is_some() {
            self.output.unload();
        }
        self.position = Duration::ZERO;
        self.duration = None;
        self.resume_at = None;
        self.set_state(PlaybackState::Stopped);
    }

    /// Advance to the next track
    ///
    /// Shuffle follows the shuffle queue, regenerating it when exhausted.
    /// Sequential playback wraps to the first track; with `wrap_at_end`
    /// disabled only repeat `all` wraps and repeat `none` stops.
    pub fn play_next(&mut self) {
        self.advance(false);
    }

    /// Go back one track
    ///
    /// More than the restart threshold (3s) into the track, this restarts the
    /// current track instead.
    pub fn play_previous(&mut self) {
        if self.lists.is_empty() {
            warn!("Nothing to go back to, active list is empty");
            return;
        }

        if self.loaded.is_some() && self.position > self.config.restart_threshold() {
            debug!(position_ms = self.position.as_millis() as u64, "Restarting current track");
            self.restart_current();
            return;
        }

        match self.previous_index() {
            Some(previous) if !self.is_loaded_and_ready(previous) => {
                // Keeps playing if playback was in progress
                self.load_track(previous, false);
            }
            _ => self.restart_current(),
        }
    }

    /// Seek in the current track, clamped to its duration
    pub fn seek(&mut self, position: Duration) {
        let Some(loaded) = &self.loaded else {
            warn!("Ignoring seek, no track loaded");
            return;
        };

        let position = position.min(self.duration());
        if loaded.ready {
            self.output.seek(position);
        } else {
            self.resume_at = Some(position);
        }
        self.position = position;
        self.emit_position();
    }

    /// Seek by seconds; negative values seek to the start, NaN is ignored
    pub fn seek_secs(&mut self, secs: f64) {
        if secs.is_nan() {
            warn!("Ignoring seek to NaN");
            return;
        }
        let position = if secs == f64::INFINITY {
            Duration::MAX
        } else {
            secs_to_duration(secs)
        };
        self.seek(position);
    }

    // ===== Shuffle & Repeat =====

    /// Flip shuffle; enabling it turns repeat off
    pub fn toggle_shuffle(&mut self) {
        self.set_shuffle(!self.shuffle);
    }

    /// Set shuffle
    ///
    /// Enabling builds a fresh queue with the current track first, so the
    /// current track keeps playing. Disabling leaves playback untouched.
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.shuffle == enabled {
            return;
        }

        self.shuffle = enabled;
        if enabled {
            if self.repeat != RepeatMode::None {
                self.repeat = RepeatMode::None;
                self.emit(PlaybackEvent::RepeatChanged {
                    mode: RepeatMode::None,
                });
            }
            self.regenerate_shuffle();
        } else {
            self.shuffle_queue.clear();
        }

        debug!(enabled, "Shuffle changed");
        self.emit(PlaybackEvent::ShuffleChanged { enabled });
    }

    /// Cycle repeat none -> all -> one -> none; any repeat turns shuffle off
    pub fn toggle_repeat(&mut self) {
        self.set_repeat(self.repeat.cycle());
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat == mode {
            return;
        }

        self.repeat = mode;
        if mode != RepeatMode::None && self.shuffle {
            self.shuffle = false;
            self.shuffle_queue.clear();
            self.emit(PlaybackEvent::ShuffleChanged { enabled: false });
        }

        debug!(?mode, "Repeat changed");
        self.emit(PlaybackEvent::RepeatChanged { mode });
    }

    // ===== Volume =====

    /// Set volume, clamped to 0.0-1.0
    pub fn set_volume(&mut self, level: f32) {
        if !self.volume.set_level(level) {
            warn!("Ignoring non-numeric volume");
            return;
        }
        self.apply_volume();
    }

    pub fn mute(&mut self) {
        self.volume.mute();
        self.apply_volume();
    }

    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    // ===== Output Callbacks =====

    /// The output can play the source loaded under `ticket`
    ///
    /// `duration` replaces the backend's (possibly estimated) length.
    pub fn on_source_ready(&mut self, ticket: Ticket, duration: Option<Duration>) {
        let Some(loaded) = self.loaded.as_mut().filter(|l| l.ticket == ticket) else {
            debug!(%ticket, "Ignoring readiness of superseded source");
            return;
        };
        loaded.ready = true;
        self.duration = duration.filter(|d| !d.is_zero());

        if let Some(at) = self.resume_at.take() {
            let at = at.min(self.duration());
            self.output.seek(at);
            self.position = at;
            self.emit_position();
        }

        if std::mem::take(&mut self.autoplay_on_ready) {
            self.start_playback();
        } else {
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Settle the play request issued under `ticket`
    ///
    /// Settlements of superseded requests are ignored.
    pub fn settle_play(&mut self, ticket: Ticket, result: Result<(), FailureReason>) {
        if self.pending_play != Some(ticket) {
            debug!(%ticket, "Ignoring settlement of superseded play request");
            return;
        }
        self.pending_play = None;

        match result {
            Ok(()) => {
                self.last_failure = None;
                self.set_state(PlaybackState::Playing);
            }
            Err(reason) => {
                let track_id = self.loaded.as_ref().map(|l| l.track.id.clone());
                self.fail(reason, track_id);
            }
        }
    }

    /// Play head report from the output
    pub fn on_time_update(&mut self, ticket: Ticket, position: Duration) {
        if !self.is_current_load(ticket) {
            return;
        }
        self.position = position;
        self.emit_position();
    }

    /// The source loaded under `ticket` played to its end
    ///
    /// Repeat `one` restarts it; otherwise playback advances.
    pub fn on_track_ended(&mut self, ticket: Ticket) {
        if !self.is_current_load(ticket) {
            debug!(%ticket, "Ignoring end of superseded source");
            return;
        }
        if let Some(loaded) = &self.loaded {
            let track_id = loaded.track.id.clone();
            self.emit(PlaybackEvent::TrackFinished { track_id });
        }

        if self.repeat == RepeatMode::One {
            self.restart_current();
            self.supersede_pending_play();
            self.start_playback();
            return;
        }

        self.advance(true);
    }

    /// The source loaded under `ticket` failed
    ///
    /// The source is released; `play()` loads it again.
    pub fn on_media_error(&mut self, ticket: Ticket, reason: FailureReason) {
        if !self.is_current_load(ticket) {
            debug!(%ticket, %reason, "Ignoring error of superseded source");
            return;
        }

        self.supersede_pending_play();
        self.output.unload();
        let track_id = self.loaded.take().map(|l| l.track.id);
        self.resume_at = None;
        self.fail(reason, track_id);
    }

    // ===== Persistence & Sync =====

    /// Snapshot for the state store and other pages
    pub fn snapshot(&self) -> PersistedState {
        let track = self.current_track();
        PersistedState {
            current_index: self.current_index,
            playing: self.playback_in_progress(),
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            shuffle: self.shuffle,
            repeat: self.repeat,
            shuffle_queue: self.shuffle_queue.as_slice().to_vec(),
            source: self.lists.active_source(),
            track_id: track.map(|t| t.id.clone()),
            track_file: track.and_then(|t| t.file_name()).map(str::to_string),
            elapsed_secs: self.position.as_secs_f64(),
        }
    }

    /// Resume from a stored snapshot
    ///
    /// The track lists must already be installed. The saved offset is applied
    /// once the source is ready; a snapshot that was playing requests autoplay,
    /// which the host may block.
    pub fn restore(&mut self, state: &PersistedState) {
        self.volume.set_level(state.volume);
        self.volume.set_muted(state.muted);
        self.apply_volume();

        let source = if self.lists.get(state.source).is_empty() {
            PlaybackSource::All
        } else {
            state.source
        };
        if source != self.lists.active_source() {
            self.lists.set_active(source);
            self.emit(PlaybackEvent::SourceChanged { source });
        }

        if state.shuffle {
            self.set_repeat(RepeatMode::None);
        } else {
            self.set_shuffle(false);
            self.set_repeat(state.repeat);
        }

        let len = self.lists.len();
        if len == 0 {
            debug!("No tracks to restore into");
            self.current_index = 0;
            self.set_shuffle(state.shuffle);
            return;
        }

        let index = self.resolve_index(state);
        self.current_index = index;
        if state.shuffle {
            self.shuffle = true;
            match ShuffleQueue::from_order(state.shuffle_queue.clone(), len) {
                Some(queue) => self.shuffle_queue = queue,
                None => {
                    debug!("Stored shuffle queue does not match the list, regenerating");
                    self.regenerate_shuffle();
                }
            }
            self.emit(PlaybackEvent::ShuffleChanged { enabled: true });
        }

        self.load_track(index, state.playing);
        let elapsed = state.elapsed();
        self.resume_at = Some(elapsed);
        self.position = elapsed;

        info!(
            index,
            source = %source,
            elapsed_ms = elapsed.as_millis() as u64,
            playing = state.playing,
            "Restored playback state"
        );
    }

    /// Follow the state another page announced
    ///
    /// Settings are adopted outright. A different track is loaded (without
    /// forcing playback); the same track is only re-seeked when the offsets
    /// differ by more than the sync tolerance. Returns whether playback was
    /// resynced.
    pub fn reconcile(&mut self, remote: &PersistedState) -> bool {
        if remote.volume != self.volume.level() || remote.muted != self.volume.is_muted() {
            self.volume.set_level(remote.volume);
            self.volume.set_muted(remote.muted);
            self.apply_volume();
        }

        if remote.source != self.lists.active_source() {
            self.set_playback_source(remote.source);
        }
        if remote.shuffle {
            self.set_shuffle(true);
        } else {
            self.set_shuffle(false);
            self.set_repeat(remote.repeat);
        }

        if remote.source != self.lists.active_source() || self.lists.is_empty() {
            debug!(source = %remote.source, "Remote source not available locally");
            return false;
        }

        let len = self.lists.len();
        if self.shuffle {
            if let Some(queue) = ShuffleQueue::from_order(remote.shuffle_queue.clone(), len) {
                self.shuffle_queue = queue;
            }
        }

        let index = self.resolve_index(remote);
        let remote_elapsed = remote.elapsed();
        let same_track = self
            .loaded
            .as_ref()
            .is_some_and(|l| l.index == Some(index));

        let mut resynced = false;
        if same_track {
            let drift = if remote_elapsed > self.position {
                remote_elapsed - self.position
            } else {
                self.position - remote_elapsed
            };
            if drift > self.config.sync_tolerance() {
                debug!(drift_ms = drift.as_millis() as u64, "Resyncing position from another page");
                self.seek(remote_elapsed);
                resynced = true;
            }
        } else {
            info!(index, "Following track change from another page");
            self.load_track(index, false);
            self.resume_at = Some(remote_elapsed);
            self.position = remote_elapsed;
            resynced = true;
        }

        if !remote.playing && self.playback_in_progress() {
            self.pause();
        }

        resynced
    }

    // ===== State Queries =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Playing, or about to (start requested or waiting for the source)
    pub fn playback_in_progress(&self) -> bool {
        self.state == PlaybackState::Playing || self.pending_play.is_some() || self.autoplay_on_ready
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Index in the active list
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The loaded track, or the track at the current index if none is loaded
    pub fn current_track(&self) -> Option<&Track> {
        self.loaded
            .as_ref()
            .map(|l| &l.track)
            .or_else(|| self.lists.track(self.current_index))
    }

    /// Whether the loaded source reported readiness
    pub fn is_ready(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.ready)
    }

    pub fn tracks(&self, source: PlaybackSource) -> &[Track] {
        self.lists.get(source)
    }

    pub fn active_tracks(&self) -> &[Track] {
        self.lists.active()
    }

    pub fn active_source(&self) -> PlaybackSource {
        self.lists.active_source()
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Shuffle order over the active list (empty when shuffle is off)
    pub fn shuffle_queue(&self) -> &[usize] {
        self.shuffle_queue.as_slice()
    }

    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    /// Length of the current track: reported by the output, else the track's
    /// own (possibly estimated) duration
    pub fn duration(&self) -> Duration {
        self.duration
            .or_else(|| self.current_track().map(Track::duration))
            .unwrap_or(Duration::ZERO)
    }

    /// Why the last load or play attempt failed, cleared on success
    pub fn last_failure(&self) -> Option<FailureReason> {
        self.last_failure
    }

    /// Ticket of the loaded source
    pub fn load_ticket(&self) -> Option<Ticket> {
        self.loaded.as_ref().map(|l| l.ticket)
    }

    /// Ticket of the play request awaiting settlement
    pub fn pending_play_ticket(&self) -> Option<Ticket> {
        self.pending_play
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    pub(crate) fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }

    // ===== Internals =====

    fn next_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        Ticket::from_raw(self.last_ticket)
    }

    fn is_current_load(&self, ticket: Ticket) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.ticket == ticket)
    }

    fn is_loaded_and_ready(&self, index: usize) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|l| l.ready && l.index == Some(index))
    }

    fn start_playback(&mut self) {
        let ticket = self.next_ticket();
        self.pending_play = Some(ticket);
        self.last_failure = None;
        self.output.play(ticket);
        debug!(%ticket, "Requested playback start");
        self.set_state(PlaybackState::Loading);
    }

    /// Forget the in-flight play request, if any
    fn supersede_pending_play(&mut self) -> bool {
        match self.pending_play.take() {
            Some(ticket) => {
                debug!(%ticket, "Superseding pending play request");
                true
            }
            None => false,
        }
    }

    fn restart_current(&mut self) {
        if self.loaded.is_none() {
            return;
        }
        self.seek(Duration::ZERO);
    }

    fn advance(&mut self, natural_end: bool) {
        if self.lists.is_empty() {
            warn!("Nothing to advance to, active list is empty");
            return;
        }

        let Some(next) = self.next_index() else {
            self.end_of_list();
            return;
        };

        if self.is_loaded_and_ready(next) {
            // Single-track list: the next track is this one
            self.restart_current();
            if natural_end {
                self.supersede_pending_play();
                self.start_playback();
            }
            return;
        }

        self.load_track(next, natural_end);
    }

    fn next_index(&mut self) -> Option<usize> {
        if self.shuffle {
            return Some(self.shuffle_next());
        }

        let next = self.current_index + 1;
        if next < self.lists.len() {
            Some(next)
        } else if self.config.wrap_at_end || self.repeat == RepeatMode::All {
            Some(0)
        } else {
            None
        }
    }

    fn previous_index(&mut self) -> Option<usize> {
        let len = self.lists.len();
        if self.shuffle {
            self.ensure_shuffle_queue();
            let previous = self
                .shuffle_queue
                .before(self.current_index)
                .or_else(|| self.shuffle_queue.last());
            return previous;
        }

        if self.current_index > 0 {
            Some((self.current_index - 1).min(len - 1))
        } else if self.config.wrap_at_end || self.repeat == RepeatMode::All {
            Some(len - 1)
        } else {
            None
        }
    }

    fn shuffle_next(&mut self) -> usize {
        let current = self.current_index;
        self.ensure_shuffle_queue();

        if let Some(next) = self.shuffle_queue.after(current) {
            return next;
        }

        // Exhausted: a fresh order that continues from the current track
        self.regenerate_shuffle();
        debug!("Shuffle queue exhausted, regenerated");
        self.shuffle_queue.get(1).unwrap_or(current)
    }

    fn ensure_shuffle_queue(&mut self) {
        let len = self.lists.len();
        if !self.shuffle_queue.is_permutation_of(len) {
            self.regenerate_shuffle();
        }
    }

    fn regenerate_shuffle(&mut self) {
        let len = self.lists.len();
        self.shuffle_queue
            .regenerate(len, self.current_index, &mut self.rng);
    }

    fn end_of_list(&mut self) {
        info!("Reached the end of the list");
        self.autoplay_on_ready = false;
        self.supersede_pending_play();
        self.output.pause();
        self.set_state(PlaybackState::Paused);
        self.emit(PlaybackEvent::QueueEnded);
    }

    fn fail(&mut self, reason: FailureReason, track_id: Option<TrackId>) {
        if reason.is_expected() {
            info!(%reason, "Playback needs a user gesture to start");
        } else {
            warn!(%reason, track_id = ?track_id, "Playback failed");
        }

        self.last_failure = Some(reason);
        self.autoplay_on_ready = false;
        let state = if self.loaded.is_some() {
            PlaybackState::Paused
        } else {
            PlaybackState::Stopped
        };
        self.set_state(state);
        self.emit(PlaybackEvent::PlaybackFailed { reason, track_id });
    }

    /// ID of the track playback is anchored to
    fn anchor_id(&self) -> Option<TrackId> {
        self.current_track().map(|t| t.id.clone())
    }

    /// Find the anchor track again after the active list changed
    fn reanchor(&mut self, anchor: Option<&TrackId>, fallback: usize) {
        let found = anchor.and_then(|id| self.lists.position_of(id));
        self.current_index = found.unwrap_or(fallback);

        // The anchor is the loaded track whenever one is loaded
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.index = found;
        }
    }

    /// Index in the active list for a snapshot taken elsewhere
    fn resolve_index(&self, state: &PersistedState) -> usize {
        let len = self.lists.len();
        state
            .track_id
            .as_ref()
            .and_then(|id| self.lists.position_of(id))
            .or_else(|| {
                state
                    .track_file
                    .as_deref()
                    .and_then(|file| self.lists.position_of_file(file))
            })
            .or_else(|| (state.current_index < len).then_some(state.current_index))
            .unwrap_or(0)
    }

    fn apply_volume(&mut self) {
        self.output.set_volume(self.volume.gain());
        self.emit(PlaybackEvent::VolumeChanged {
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.emit(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_position(&mut self) {
        let event = PlaybackEvent::PositionUpdate {
            position_ms: self.position.as_millis() as u64,
            duration_ms: self.duration().as_millis() as u64,
        };
        self.emit(event);
    }
}
