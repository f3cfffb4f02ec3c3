//! `localStorage` state store

use crate::error::{PlaybackError, Result};
use crate::persist::PersistedState;
use crate::store::{StateStore, STATE_KEY};
use tracing::warn;
use web_sys::Storage;

/// Snapshot stored as JSON under one `localStorage` key
///
/// Every page of the origin sees the same value, so a new page resumes where
/// the others are.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        Self::with_key(STATE_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<Storage> {
        let window = web_sys::window()
            .ok_or_else(|| PlaybackError::Store("no window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| PlaybackError::Store(format!("localStorage denied: {e:?}")))?
            .ok_or_else(|| PlaybackError::Store("localStorage unavailable".to_string()))
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for LocalStorageStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let stored = Self::storage()?
            .get_item(&self.key)
            .map_err(|e| PlaybackError::Store(format!("{e:?}")))?;

        let Some(json) = stored else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable playback state");
                Ok(None)
            }
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        Self::storage()?
            .set_item(&self.key, &json)
            .map_err(|e| PlaybackError::Store(format!("{e:?}")))
    }
}
