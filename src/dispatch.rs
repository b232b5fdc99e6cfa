//! Dispatcher - routes a request to its backend endpoint and normalizes the reply

use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::{Protocol, Request, Response};

/// Backend endpoint, fixed per protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Proxy,
    WebSocket,
    GraphQL,
}

impl Endpoint {
    pub fn for_protocol(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Http => Endpoint::Proxy,
            Protocol::WebSocket => Endpoint::WebSocket,
            Protocol::GraphQL => Endpoint::GraphQL,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Proxy => "/proxy",
            Endpoint::WebSocket => "/ws",
            Endpoint::GraphQL => "/graphql",
        }
    }
}

/// Execution backend: takes a serialized request for an endpoint and
/// returns the raw reply text.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(
        &self,
        endpoint: Endpoint,
        payload: serde_json::Value,
    ) -> Result<String, TransportError>;
}

/// Routes requests to a backend. One attempt per call, no retries.
pub struct Dispatcher<B> {
    backend: B,
}

impl<B: Backend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Dispatcher { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Forward the request and await one reply.
    ///
    /// Any well-formed reply is a success, whatever its `status`.
    pub async fn dispatch(&self, request: &Request) -> Result<Response, TransportError> {
        let endpoint = Endpoint::for_protocol(request.protocol());
        let payload = serde_json::to_value(request)
            .map_err(|e| TransportError::structured(format!("Could not serialize request: {}", e)))?;

        let reply = self.backend.send(endpoint, payload).await?;
        parse_reply(&reply)
    }
}

/// Turn raw reply text into a response, classifying anything else
pub fn parse_reply(text: &str) -> Result<Response, TransportError> {
    let value = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value,
        Err(_) => {
            let trimmed = text.trim();
            return Err(if trimmed.is_empty() {
                TransportError::unrecognized()
            } else {
                TransportError::plain(trimmed)
            });
        }
    };

    if let Ok(response) = serde_json::from_value::<Response>(value.clone()) {
        return Ok(response);
    }

    Err(classify_error(&value))
}

fn classify_error(value: &serde_json::Value) -> TransportError {
    match value {
        serde_json::Value::Object(map) => ["error", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(TransportError::structured)
            .unwrap_or_else(TransportError::unrecognized),
        serde_json::Value::String(text) => TransportError::plain(text.clone()),
        _ => TransportError::unrecognized(),
    }
}
