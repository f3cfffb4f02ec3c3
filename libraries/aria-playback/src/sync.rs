//! Cross-page state synchronization
//!
//! Pages sharing one player announce their snapshot after every change and
//! follow the announcements of others. `SyncChannel` is the in-process bus
//! (one tokio broadcast channel); browsers bridge the same JSON envelopes over
//! a `BroadcastChannel`.

use crate::error::Result;
use crate::persist::PersistedState;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default number of envelopes a slow page may fall behind by
pub const DEFAULT_SYNC_CAPACITY: usize = 64;

/// Message exchanged between pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum SyncMessage {
    /// The sender's state changed
    StateUpdated(PersistedState),

    /// A new page asks the others to announce their state
    StateRequested,
}

/// Message plus the page it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    pub origin: Uuid,
    pub message: SyncMessage,
}

impl SyncEnvelope {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A page's connection to the other pages
pub trait SyncTransport {
    /// Announce a message to every other page
    fn publish(&mut self, message: SyncMessage);

    /// Next message from another page, if one is waiting
    fn try_recv(&mut self) -> Option<SyncMessage>;
}

/// In-process bus shared by several pages
#[derive(Debug, Clone)]
pub struct SyncChannel {
    tx: broadcast::Sender<SyncEnvelope>,
}

impl SyncChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Join the bus as a new page
    pub fn subscribe(&self) -> SyncHandle {
        SyncHandle {
            page_id: Uuid::new_v4(),
            tx: self.tx.clone(),
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for SyncChannel {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_CAPACITY)
    }
}

/// One page's membership of a `SyncChannel`
///
/// Envelopes the page sent itself are skipped on receive.
#[derive(Debug)]
pub struct SyncHandle {
    page_id: Uuid,
    tx: broadcast::Sender<SyncEnvelope>,
    rx: broadcast::Receiver<SyncEnvelope>,
}

impl SyncHandle {
    pub fn page_id(&self) -> Uuid {
        self.page_id
    }

    /// Wait for the next message from another page
    ///
    /// Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SyncMessage> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.origin == self.page_id => continue,
                Ok(envelope) => return Some(envelope.message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Sync receiver lagged, older announcements dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// All messages from other pages waiting right now
    pub fn drain(&mut self) -> Vec<SyncMessage> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl SyncTransport for SyncHandle {
    fn publish(&mut self, message: SyncMessage) {
        let envelope = SyncEnvelope {
            origin: self.page_id,
            message,
        };
        if self.tx.send(envelope).is_err() {
            debug!("No page listening for sync messages");
        }
    }

    fn try_recv(&mut self) -> Option<SyncMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(envelope) if envelope.origin == self.page_id => continue,
                Ok(envelope) => return Some(envelope.message),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Sync receiver lagged, older announcements dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
