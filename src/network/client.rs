//! HTTP client wrapper - forwards serialized requests to a remote execution backend

use async_trait::async_trait;

use crate::constants::EXECUTOR_TIMEOUT;
use crate::dispatch::{Backend, Endpoint};
use crate::error::TransportError;

/// Backend reached over HTTP at `{base_url}{endpoint}`
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        RemoteBackend {
            client: create_client(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    async fn send(
        &self,
        endpoint: Endpoint,
        payload: serde_json::Value,
    ) -> Result<String, TransportError> {
        let url = self.url_for(endpoint);
        tracing::debug!(url = %url, "Forwarding to execution backend");

        let resp = self.client.post(&url).json(&payload).send().await?;
        // Backend status is not interpreted; the reply body decides
        tracing::debug!(url = %url, status = resp.status().as_u16(), "Backend replied");
        let text = resp.text().await?;
        Ok(text)
    }
}

/// Create an HTTP client with default configuration
///
/// No timeout: any bound on a dispatch belongs to the execution backend.
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Create the client used for outbound calls made by the in-process executor
pub fn create_executor_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(EXECUTOR_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::error::TransportCause;
    use crate::models::{Headers, HttpMethod, Request, RequestKind};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn get_request() -> Request {
        Request {
            name: "posts".to_string(),
            url: "https://jsonplaceholder.typicode.com/posts".to_string(),
            kind: RequestKind::Http {
                method: HttpMethod::GET,
                headers: Headers::new(),
                body: None,
                use_cache: false,
            },
        }
    }

    #[test]
    fn test_url_for_joins_base_and_endpoint() {
        let backend = RemoteBackend::new("http://localhost:8000/");
        assert_eq!(backend.url_for(Endpoint::Proxy), "http://localhost:8000/proxy");
        assert_eq!(backend.url_for(Endpoint::GraphQL), "http://localhost:8000/graphql");
    }

    #[tokio::test]
    async fn test_dispatch_posts_to_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proxy"))
            .and(body_partial_json(json!({
                "protocol": "Http",
                "method": "GET",
                "url": "https://jsonplaceholder.typicode.com/posts"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 404,
                "headers": {"content-type": "application/json"},
                "body": {"message": "not found"},
                "duration_ms": 31
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(RemoteBackend::new(server.uri()));
        let response = dispatcher.dispatch(&get_request()).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.duration_ms, 31.0);
        assert_eq!(response.body, json!({"message": "not found"}));
    }

    #[tokio::test]
    async fn test_backend_error_reply_is_structured_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proxy"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "Request failed: dns error"})),
            )
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(RemoteBackend::new(server.uri()));
        let err = dispatcher.dispatch(&get_request()).await.unwrap_err();
        assert_eq!(
            err.cause,
            TransportCause::Structured {
                message: "Request failed: dns error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_reply_is_plain_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proxy"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(RemoteBackend::new(server.uri()));
        let err = dispatcher.dispatch(&get_request()).await.unwrap_err();
        assert_eq!(err.cause, TransportCause::Plain("Bad Gateway".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Nothing listens on port 9 of localhost in test environments
        let dispatcher = Dispatcher::new(RemoteBackend::new("http://127.0.0.1:9"));
        let err = dispatcher.dispatch(&get_request()).await.unwrap_err();
        assert!(matches!(err.cause, TransportCause::Structured { .. }));
    }
}
