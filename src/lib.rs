//! # apiprobe
//!
//! Compose, send and replay HTTP, WebSocket and GraphQL requests from the
//! terminal.
//!
//! ## Features
//! - Typed request model built from raw field text, with JSON validation
//! - Dispatch to a remote execution backend or an in-process executor
//! - Bounded request history (last 10 completed dispatches)
//! - Saved requests, loadable back into the editor
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer - line-oriented terminal front end
//! - App Layer (draft, stores, request lifecycle)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod builder;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod ui;
pub mod validate;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use builder::{build, populate};
pub use config::Config;
pub use dispatch::{Backend, Dispatcher, Endpoint};
pub use error::{Field, TransportError, ValidationError};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{HistoryItem, HttpMethod, Protocol, RawFields, Request, RequestKind, Response, SavedRequest};
pub use network::{LocalBackend, NetworkActor, RemoteBackend};
pub use storage::{FileStore, HistoryStore, KeyValueStore, MemoryStore, SavedRequestStore};
pub use validate::is_valid_json;
