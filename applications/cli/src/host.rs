//! Simulated audio element
//!
//! Stands in for the browser's audio element: it consumes the controller's
//! output commands and answers asynchronously, one tick later, the way a
//! real element fires `canplay`, resolves `play()` and emits `timeupdate`.

use aria_playback::{FailureReason, OutputCommand, Ticket};
use std::time::Duration;
use tracing::{debug, trace};

/// What the simulated element reports back to the player
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    SourceReady { ticket: Ticket, duration: Duration },
    PlaySettled { ticket: Ticket },
    PlayRejected { ticket: Ticket, reason: FailureReason },
    TimeUpdate { ticket: Ticket, position: Duration },
    Ended { ticket: Ticket },
}

#[derive(Debug)]
pub struct SimulatedAudio {
    /// Ticket of the source currently assigned
    source: Option<Ticket>,
    ready_pending: Option<Ticket>,
    play_pending: Option<Ticket>,
    playing: bool,
    position: Duration,
    duration: Duration,
    gain: f32,
    /// Play-time multiplier, so long tracks can be skimmed
    speed: f64,
}

impl SimulatedAudio {
    pub fn new(speed: f64) -> Self {
        Self {
            source: None,
            ready_pending: None,
            play_pending: None,
            playing: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            gain: 1.0,
            speed: if speed.is_finite() && speed > 0.0 { speed } else { 1.0 },
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Apply one command from the controller
    ///
    /// `duration` is the length to simulate for a newly loaded source.
    pub fn apply(&mut self, command: OutputCommand, duration: Duration) {
        trace!(?command, "Output command");
        match command {
            OutputCommand::Load { url, ticket } => {
                debug!(%url, %ticket, "Loading source");
                self.source = Some(ticket);
                self.ready_pending = Some(ticket);
                self.play_pending = None;
                self.playing = false;
                self.position = Duration::ZERO;
                self.duration = duration;
            }
            OutputCommand::Unload => {
                self.source = None;
                self.ready_pending = None;
                self.play_pending = None;
                self.playing = false;
                self.position = Duration::ZERO;
            }
            OutputCommand::Play { ticket } => {
                self.play_pending = Some(ticket);
            }
            OutputCommand::Pause => {
                // A pause before play() resolves leaves that request unanswered
                self.play_pending = None;
                self.playing = false;
            }
            OutputCommand::Seek { position_ms } => {
                self.position = Duration::from_millis(position_ms).min(self.duration);
            }
            OutputCommand::SetVolume { gain } => {
                self.gain = gain;
            }
        }
    }

    /// Advance the element by `elapsed` wall time
    pub fn tick(&mut self, elapsed: Duration) -> Vec<HostEvent> {
        let mut events = Vec::new();

        if let Some(ticket) = self.ready_pending.take() {
            events.push(HostEvent::SourceReady {
                ticket,
                duration: self.duration,
            });
        }

        if let Some(ticket) = self.play_pending.take() {
            if self.source.is_some() {
                self.playing = true;
                events.push(HostEvent::PlaySettled { ticket });
            } else {
                events.push(HostEvent::PlayRejected {
                    ticket,
                    reason: FailureReason::Unsupported,
                });
            }
            // Playback starts with the next tick
            return events;
        }

        let Some(ticket) = self.source else {
            return events;
        };
        if !self.playing {
            return events;
        }

        self.position = (self.position + elapsed.mul_f64(self.speed)).min(self.duration);
        events.push(HostEvent::TimeUpdate {
            ticket,
            position: self.position,
        });

        if self.position >= self.duration {
            self.playing = false;
            events.push(HostEvent::Ended { ticket });
        }

        events
    }
}
