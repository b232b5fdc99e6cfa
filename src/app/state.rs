//! App state - the draft, both stores, and the in-flight table

use std::collections::HashMap;

use crate::messages::{Notice, RenderState, View};
use crate::models::{Protocol, RawFields, Request, Response};
use crate::storage::{HistoryStore, SavedRequestStore, SharedStore};

/// Lifecycle of the most recent send.
///
/// A send that fails validation never leaves `Draft`; `Completed` is the only
/// phase that writes history.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Phase {
    #[default]
    Draft,
    Dispatched {
        id: u64,
    },
    Completed {
        id: u64,
        request: Request,
        response: Response,
    },
    Failed {
        id: u64,
        message: String,
    },
}

/// Main application state
///
/// Owned by the app actor, so store mutations are applied one at a time.
pub struct AppState {
    // Draft being edited
    pub protocol: Protocol,
    pub fields: RawFields,

    // Dispatch tracking
    pub phase: Phase,
    pub next_request_id: u64,
    pub in_flight: HashMap<u64, Request>,

    // Persisted data
    pub history: HistoryStore,
    pub saved: SavedRequestStore,

    // Output for the next render
    pub notice: Option<Notice>,
    pub view: View,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        AppState {
            protocol: Protocol::Http,
            fields: RawFields::default(),
            phase: Phase::Draft,
            next_request_id: 1,
            in_flight: HashMap::new(),
            history: HistoryStore::new(store.clone()),
            saved: SavedRequestStore::new(store),
            notice: None,
            view: View::Nothing,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Snapshot for the UI; clears the one-shot notice and view
    pub fn take_render_state(&mut self) -> RenderState {
        RenderState {
            protocol: self.protocol,
            fields: self.fields.clone(),
            phase: self.phase.clone(),
            in_flight: self.in_flight.len(),
            notice: self.notice.take(),
            view: std::mem::take(&mut self.view),
        }
    }
}
