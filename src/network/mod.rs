//! Network layer - execution backends and the actor that drives dispatches
//!
//! The Network actor receives dispatch commands and sends back outcomes.

pub mod actor;
pub mod client;
pub mod executor;
pub mod websocket;

pub use actor::NetworkActor;
pub use client::RemoteBackend;
pub use executor::LocalBackend;
