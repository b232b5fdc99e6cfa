//! Persisted state - key-value substrate plus the history and saved-request stores
//!
//! Both stores load once at construction and write the whole sequence back
//! after every mutation.

pub mod file;
pub mod history;
pub mod saved;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

pub use file::FileStore;
pub use history::HistoryStore;
pub use saved::SavedRequestStore;

/// Synchronous string-keyed store of JSON blobs
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Unreadable values are reported as absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Handle shared by the stores
pub type SharedStore = Arc<dyn KeyValueStore>;

/// In-memory substrate, used by tests and when no data directory is usable
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // A poisoned map still holds consistent strings
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load a JSON sequence, falling back to empty on absent or malformed content
fn load_sequence<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let Some(raw) = store.get(key) else {
        tracing::debug!(key, "No stored sequence, starting empty");
        return Vec::new();
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored sequence");
            Vec::new()
        }
    }
}

/// Write the full sequence back; failures are logged and swallowed
fn persist_sequence<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) {
    let result = serde_json::to_string(items)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));

    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist sequence");
    }
}

/// Substrate whose writes fail while `failing` is set
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub inner: MemoryStore,
    pub failing: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.set(key, value)
    }
}
