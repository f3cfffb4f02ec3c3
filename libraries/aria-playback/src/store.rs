//! Persistent storage for the playback snapshot
//!
//! The snapshot lives under a single key. Stores that are shared between
//! pages (local storage, a file) are also how a freshly opened page resumes.

use crate::error::{PlaybackError, Result};
use crate::persist::PersistedState;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Key (or file stem) the snapshot is stored under
pub const STATE_KEY: &str = "aria-player-state";

/// Storage for the persisted playback state
pub trait StateStore {
    /// Read the stored snapshot
    ///
    /// `Ok(None)` when nothing is stored or the stored value is unreadable.
    fn load(&self) -> Result<Option<PersistedState>>;

    /// Replace the stored snapshot
    fn save(&mut self, state: &PersistedState) -> Result<()>;
}

/// In-memory store
///
/// Clones share the same slot, which makes it a stand-in for storage shared
/// by several pages.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<PersistedState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `state`
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| PlaybackError::Store("memory store lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&mut self, state: &PersistedState) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PlaybackError::Store("memory store lock poisoned".to_string()))?;
        *slot = Some(state.clone());
        Ok(())
    }
}

/// JSON file store
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/aria-player-state.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STATE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved playback state");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable playback state");
                Ok(None)
            }
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
