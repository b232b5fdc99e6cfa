use chrono::Utc;

use crate::constants::{HISTORY_CAPACITY, HISTORY_KEY};
use crate::models::{HistoryItem, Request, Response};
use crate::storage::{load_sequence, persist_sequence, SharedStore};

/// Bounded log of completed dispatches, oldest first
pub struct HistoryStore {
    store: SharedStore,
    items: Vec<HistoryItem>,
    capacity: usize,
}

impl HistoryStore {
    /// Load history from the substrate (empty if absent or unparsable)
    pub fn new(store: SharedStore) -> Self {
        Self::with_capacity(store, HISTORY_CAPACITY)
    }

    pub fn with_capacity(store: SharedStore, capacity: usize) -> Self {
        let mut items: Vec<HistoryItem> = load_sequence(store.as_ref(), HISTORY_KEY);
        // Content written by hand may exceed the bound
        if items.len() > capacity {
            items.drain(..items.len() - capacity);
        }
        tracing::debug!(count = items.len(), "Loaded history");

        HistoryStore {
            store,
            items,
            capacity,
        }
    }

    /// Append a completed dispatch, evicting the oldest entries past capacity
    pub fn record(&mut self, request: Request, response: Response) -> HistoryItem {
        let item = HistoryItem {
            request,
            response,
            timestamp: Utc::now(),
        };
        self.items.push(item.clone());

        if self.items.len() > self.capacity {
            let excess = self.items.len() - self.capacity;
            self.items.drain(..excess);
        }

        persist_sequence(self.store.as_ref(), HISTORY_KEY, &self.items);
        item
    }

    /// All entries in insertion order
    pub fn list(&self) -> &[HistoryItem] {
        &self.items
    }

    /// Get history item by index (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Headers, HttpMethod, RequestKind};
    use crate::storage::{FlakyStore, KeyValueStore, MemoryStore};
    use std::sync::atomic::Ordering;
    use serde_json::json;
    use std::sync::Arc;

    fn request(n: usize) -> Request {
        Request {
            name: format!("req {}", n),
            url: format!("https://example.com/{}", n),
            kind: RequestKind::Http {
                method: HttpMethod::GET,
                headers: Headers::new(),
                body: None,
                use_cache: false,
            },
        }
    }

    fn response(n: usize) -> Response {
        Response {
            status: 200,
            headers: None,
            body: json!({ "n": n }),
            duration_ms: n as f64,
            cached: false,
        }
    }

    #[test]
    fn test_record_appends_in_order() {
        let mut history = HistoryStore::new(Arc::new(MemoryStore::new()));
        history.record(request(1), response(1));
        history.record(request(2), response(2));

        let urls: Vec<_> = history.list().iter().map(|i| i.request.url.as_str()).collect();
        assert_eq!(urls, ["https://example.com/1", "https://example.com/2"]);
    }

    #[test]
    fn test_twelve_dispatches_keep_three_through_twelve() {
        let mut history = HistoryStore::new(Arc::new(MemoryStore::new()));
        for n in 1..=12 {
            history.record(request(n), response(n));
        }

        assert_eq!(history.len(), 10);
        let names: Vec<_> = history.list().iter().map(|i| i.request.name.clone()).collect();
        let expected: Vec<_> = (3..=12).map(|n| format!("req {}", n)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_history_survives_reload() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        {
            let mut history = HistoryStore::new(store.clone());
            for n in 1..=11 {
                history.record(request(n), response(n));
            }
        }

        let reloaded = HistoryStore::new(store);
        assert_eq!(reloaded.len(), 10);
        assert_eq!(reloaded.get(0).unwrap().request.name, "req 2");
        assert_eq!(reloaded.get(9).unwrap().response.body, json!({ "n": 11 }));
    }

    #[test]
    fn test_malformed_history_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "not json at all").unwrap();

        let history = HistoryStore::new(store);
        assert!(history.is_empty());
    }

    #[test]
    fn test_oversized_stored_history_is_trimmed_on_load() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        {
            let mut history = HistoryStore::with_capacity(store.clone(), 20);
            for n in 1..=15 {
                history.record(request(n), response(n));
            }
        }

        let history = HistoryStore::new(store);
        assert_eq!(history.len(), 10);
        assert_eq!(history.get(0).unwrap().request.name, "req 6");
    }

    #[test]
    fn test_failed_write_keeps_entry_and_next_write_catches_up() {
        let store = Arc::new(FlakyStore::default());
        let mut history = HistoryStore::new(store.clone());

        store.failing.store(true, Ordering::SeqCst);
        let first = history.record(request(1), response(1));
        assert_eq!(first.request.url, "https://example.com/1");
        assert_eq!(history.list(), &[first.clone()]);
        assert!(store.get(HISTORY_KEY).is_none());

        store.failing.store(false, Ordering::SeqCst);
        history.record(request(2), response(2));

        let reloaded = HistoryStore::new(store.clone());
        let urls: Vec<_> = reloaded.list().iter().map(|i| i.request.url.as_str()).collect();
        assert_eq!(urls, ["https://example.com/1", "https://example.com/2"]);
    }
}
