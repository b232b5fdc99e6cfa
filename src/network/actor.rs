//! Network actor - runs dispatches in the Tokio runtime

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::dispatch::{Backend, Dispatcher};
use crate::messages::{NetworkCommand, NetworkResponse};

/// Network actor that processes dispatch commands.
///
/// Every dispatch runs as its own task, so several may be in flight at once.
/// There is no cancellation: a dispatch runs until it completes or fails.
pub struct NetworkActor<B> {
    dispatcher: Arc<Dispatcher<B>>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl<B: Backend + 'static> NetworkActor<B> {
    pub fn new(backend: B, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            dispatcher: Arc::new(Dispatcher::new(backend)),
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Dispatch { id, request }) => {
                            let response_tx = self.response_tx.clone();
                            let dispatcher = self.dispatcher.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, protocol = %request.protocol(), "Dispatching request");
                                let result = match dispatcher.dispatch(&request).await {
                                    Ok(response) => {
                                        tracing::info!(id, status = response.status, duration_ms = response.duration_ms, "Request completed");
                                        NetworkResponse::Completed { id, response }
                                    }
                                    Err(error) => {
                                        tracing::warn!(id, error = %error, "Request failed");
                                        NetworkResponse::Failed { id, error }
                                    }
                                };
                                let _ = response_tx.send(result);
                            });
                        }

                        Some(NetworkCommand::Shutdown) | None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }

        // In-flight dispatches finish so their results are not lost
        while self.active_requests.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Endpoint;
    use crate::error::TransportError;
    use crate::models::{Request, RequestKind};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Replies after a per-request delay taken from the first message
    struct SlowEcho;

    #[async_trait]
    impl Backend for SlowEcho {
        async fn send(
            &self,
            _endpoint: Endpoint,
            payload: serde_json::Value,
        ) -> Result<String, TransportError> {
            let delay: u64 = payload["messages"][0]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if payload["url"] == "ws://fail" {
                return Err(TransportError::plain("refused"));
            }
            Ok(format!(
                r#"{{"status":200,"body":{},"duration_ms":{}}}"#,
                payload["url"], delay
            ))
        }
    }

    fn ws(url: &str, delay_ms: u64) -> Request {
        Request {
            name: url.to_string(),
            url: url.to_string(),
            kind: RequestKind::WebSocket {
                messages: vec![delay_ms.to_string()],
                duration: None,
            },
        }
    }

    #[tokio::test]
    async fn test_overlapping_dispatches_all_report_back() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        tokio::spawn(NetworkActor::new(SlowEcho, resp_tx).run(cmd_rx));

        cmd_tx.send(NetworkCommand::Dispatch { id: 1, request: ws("ws://slow", 80) }).unwrap();
        cmd_tx.send(NetworkCommand::Dispatch { id: 2, request: ws("ws://fast", 0) }).unwrap();
        cmd_tx.send(NetworkCommand::Dispatch { id: 3, request: ws("ws://fail", 0) }).unwrap();

        let mut completed = Vec::new();
        let mut failed = Vec::new();
        for _ in 0..3 {
            match resp_rx.recv().await.unwrap() {
                NetworkResponse::Completed { id, .. } => completed.push(id),
                NetworkResponse::Failed { id, .. } => failed.push(id),
            }
        }
        completed.sort();
        assert_eq!(completed, vec![1, 2]);
        assert_eq!(failed, vec![3]);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_in_flight() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(NetworkActor::new(SlowEcho, resp_tx).run(cmd_rx));

        cmd_tx.send(NetworkCommand::Dispatch { id: 7, request: ws("ws://slow", 50) }).unwrap();
        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();

        assert_eq!(resp_rx.recv().await.unwrap().id(), 7);
    }
}
