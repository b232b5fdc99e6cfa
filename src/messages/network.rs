//! Network messages - communication between App and Network layers

use crate::error::TransportError;
use crate::models::{Request, Response};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Dispatch a validated request
    Dispatch { id: u64, request: Request },
    /// Shutdown the network actor
    Shutdown,
}

/// Outcomes sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The backend returned a well-formed response
    Completed { id: u64, response: Response },
    /// Transport failure, nothing to record
    Failed { id: u64, error: TransportError },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
            NetworkResponse::Failed { id, .. } => *id,
        }
    }
}
