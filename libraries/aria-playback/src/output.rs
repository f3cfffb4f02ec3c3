//! Platform-agnostic audio output trait
//!
//! Abstracts the one audio element (or device) the controller drives.

use crate::types::Ticket;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Platform-agnostic audio output
///
/// Calls are fire-and-forget. The host reports what actually happened back to
/// the controller through its `on_*` callbacks and `settle_play`, quoting the
/// ticket it was given, so late answers to superseded requests can be dropped.
pub trait AudioOutput {
    /// Tear down any current source and start fetching `url`
    ///
    /// The host answers with `on_source_ready(ticket, ..)` or
    /// `on_media_error(ticket, ..)`.
    fn load(&mut self, url: &str, ticket: Ticket);

    /// Release the current source
    fn unload(&mut self);

    /// Begin playback of the loaded source
    ///
    /// The host answers with `settle_play(ticket, ..)` once the platform
    /// accepts or rejects the request.
    fn play(&mut self, ticket: Ticket);

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Move the play head
    fn seek(&mut self, position: Duration);

    /// Set the linear output gain (0.0-1.0)
    fn set_volume(&mut self, gain: f32);
}

/// A request made to the audio output, as data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum OutputCommand {
    Load { url: String, ticket: Ticket },
    Unload,
    Play { ticket: Ticket },
    Pause,
    Seek { position_ms: u64 },
    SetVolume { gain: f32 },
}

/// Output that forwards every request over a channel
///
/// Lets a host drive the real audio element from its own loop (or a test
/// inspect what the controller asked for).
#[derive(Debug, Clone)]
pub struct ChannelOutput {
    tx: mpsc::UnboundedSender<OutputCommand>,
}

impl ChannelOutput {
    /// Create an output and the receiving end of its command stream
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutputCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, command: OutputCommand) {
        if self.tx.send(command).is_err() {
            debug!("Output command dropped, host receiver is gone");
        }
    }
}

impl AudioOutput for ChannelOutput {
    fn load(&mut self, url: &str, ticket: Ticket) {
        self.send(OutputCommand::Load {
            url: url.to_string(),
            ticket,
        });
    }

    fn unload(&mut self) {
        self.send(OutputCommand::Unload);
    }

    fn play(&mut self, ticket: Ticket) {
        self.send(OutputCommand::Play { ticket });
    }

    fn pause(&mut self) {
        self.send(OutputCommand::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.send(OutputCommand::Seek {
            position_ms: position.as_millis() as u64,
        });
    }

    fn set_volume(&mut self, gain: f32) {
        self.send(OutputCommand::SetVolume { gain });
    }
}
