use chrono::Utc;
use uuid::Uuid;

use crate::constants::SAVED_REQUESTS_KEY;
use crate::models::{Request, SavedRequest};
use crate::storage::{load_sequence, persist_sequence, SharedStore};

/// Named requests kept until explicitly deleted
pub struct SavedRequestStore {
    store: SharedStore,
    items: Vec<SavedRequest>,
}

impl SavedRequestStore {
    /// Load saved requests from the substrate (empty if absent or unparsable)
    pub fn new(store: SharedStore) -> Self {
        let items: Vec<SavedRequest> = load_sequence(store.as_ref(), SAVED_REQUESTS_KEY);
        tracing::debug!(count = items.len(), "Loaded saved requests");
        SavedRequestStore { store, items }
    }

    /// Save a request under a fresh id
    pub fn save(&mut self, request: Request) -> SavedRequest {
        let saved = SavedRequest {
            // v7 ids are time-ordered and unique within the process
            id: Uuid::now_v7().to_string(),
            created_at: Utc::now(),
            request,
        };
        self.items.push(saved.clone());
        persist_sequence(self.store.as_ref(), SAVED_REQUESTS_KEY, &self.items);
        saved
    }

    /// Remove the entry with this id. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|saved| saved.id != id);
        persist_sequence(self.store.as_ref(), SAVED_REQUESTS_KEY, &self.items);
        self.items.len() != before
    }

    pub fn list(&self) -> &[SavedRequest] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&SavedRequest> {
        self.items.iter().find(|saved| saved.id == id)
    }
}
