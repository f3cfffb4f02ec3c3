//! Audio output backed by a JavaScript callback

use crate::output::{AudioOutput, OutputCommand};
use crate::types::Ticket;
use js_sys::Function;
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::JsValue;

/// Hands every output request to a JS function as a plain object
/// (`{ command: "load", url, ticket }`, ...)
#[derive(Debug, Default)]
pub struct CallbackOutput {
    callback: Option<Function>,
}

impl CallbackOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&mut self, callback: Function) {
        self.callback = Some(callback);
    }

    fn send(&self, command: OutputCommand) {
        let Some(callback) = &self.callback else {
            return;
        };

        match serde_wasm_bindgen::to_value(&command) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    warn!(error = ?e, "Output callback threw");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode output command"),
        }
    }
}

impl AudioOutput for CallbackOutput {
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
