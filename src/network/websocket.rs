//! WebSocket client - runs a scripted send-then-listen exchange

use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::json;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::constants::WS_SEND_GAP;
use crate::models::Response;
use crate::network::executor::elapsed_ms;

/// Direction of WebSocket message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WsDirection {
    Sent,
    Received,
}

/// A WebSocket log entry
#[derive(Clone, Debug, Serialize)]
pub struct WsLogEntry {
    pub direction: WsDirection,
    pub content: String,
    pub timestamp: String,
}

impl WsLogEntry {
    fn now(direction: WsDirection, content: String) -> Self {
        WsLogEntry {
            direction,
            content,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Connect, send every message, then collect replies for the listen window.
///
/// The reply summarizes the whole exchange as one response.
pub async fn run_exchange(
    url: &str,
    messages: &[String],
    window: Duration,
) -> Result<Response, String> {
    let start = Instant::now();

    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| format!("WebSocket connection failed: {}", e))?;
    let (mut write, mut read) = ws_stream.split();
    let mut log = Vec::new();

    for msg in messages {
        if let Err(e) = write.send(Message::Text(msg.clone())).await {
            tracing::error!(error = %e, "Failed to send WebSocket message");
            break;
        }
        log.push(WsLogEntry::now(WsDirection::Sent, msg.clone()));
        tokio::time::sleep(WS_SEND_GAP).await;
    }

    // The window elapsing is the normal way out
    let _ = tokio::time::timeout(window, async {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    log.push(WsLogEntry::now(WsDirection::Received, text));
                }
                Ok(Message::Binary(data)) => {
                    log.push(WsLogEntry::now(
                        WsDirection::Received,
                        format!("[Binary: {} bytes]", data.len()),
                    ));
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    })
    .await;

    let _ = write.close().await;

    Ok(Response {
        status: 200,
        headers: None,
        body: json!({
            "status": "completed",
            "messages": log,
        }),
        duration_ms: elapsed_ms(start),
        cached: false,
    })
}
