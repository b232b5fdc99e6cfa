//! In-process execution backend - performs the real HTTP, GraphQL and
//! WebSocket calls and answers with the same reply shape a remote backend uses

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::json;

use crate::constants::{CACHE_MAX_CAPACITY, CACHE_TIME_TO_LIVE, WS_LISTEN_WINDOW};
use crate::dispatch::{Backend, Endpoint};
use crate::error::TransportError;
use crate::models::{Headers, HttpMethod, Request, RequestKind, Response};
use crate::network::client::create_executor_client;
use crate::network::websocket::run_exchange;

/// Executes requests inside this process
#[derive(Clone)]
pub struct LocalBackend {
    client: reqwest::Client,
    /// Successful GET replies for requests that opt in with `use_cache`
    cache: Cache<String, Response>,
}

impl LocalBackend {
    pub fn new() -> Self {
        LocalBackend {
            client: create_executor_client(),
            cache: Cache::builder()
                .max_capacity(CACHE_MAX_CAPACITY)
                .time_to_live(CACHE_TIME_TO_LIVE)
                .build(),
        }
    }

    async fn execute(&self, endpoint: Endpoint, request: Request) -> Result<Response, String> {
        match (endpoint, request.kind) {
            (
                Endpoint::Proxy,
                RequestKind::Http {
                    method,
                    headers,
                    body,
                    use_cache,
                },
            ) => {
                let key = (use_cache && method == HttpMethod::GET)
                    .then(|| cache_key(method, &request.url, &headers, body.as_ref()));

                if let Some(key) = &key {
                    if let Some(hit) = self.cache.get(key).await {
                        tracing::info!(url = %request.url, "Cache hit");
                        return Ok(Response { cached: true, ..hit });
                    }
                }

                let response =
                    execute_http(&self.client, &request.url, method, &headers, body.as_ref()).await?;
                if let Some(key) = key {
                    if (200..300).contains(&response.status) {
                        self.cache.insert(key, response.clone()).await;
                    }
                }
                Ok(response)
            }
            (Endpoint::GraphQL, RequestKind::GraphQL { query, headers, variables }) => {
                execute_graphql(&self.client, &request.url, &query, variables, &headers).await
            }
            (Endpoint::WebSocket, RequestKind::WebSocket { messages, duration }) => {
                let window = duration.map(Duration::from_secs).unwrap_or(WS_LISTEN_WINDOW);
                run_exchange(&request.url, &messages, window).await
            }
            (endpoint, _) => Err(format!(
                "Request protocol does not match endpoint {}",
                endpoint.path()
            )),
        }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn send(
        &self,
        endpoint: Endpoint,
        payload: serde_json::Value,
    ) -> Result<String, TransportError> {
        let reply = match serde_json::from_value::<Request>(payload) {
            Ok(request) => {
                tracing::info!(endpoint = endpoint.path(), url = %request.url, "Executing in-process");
                match self.execute(endpoint, request).await {
                    Ok(response) => serde_json::to_value(&response)
                        .unwrap_or_else(|e| json!({ "error": e.to_string() })),
                    Err(message) => {
                        tracing::error!(endpoint = endpoint.path(), error = %message, "Execution failed");
                        json!({ "error": message })
                    }
                }
            }
            Err(e) => json!({ "error": format!("Malformed request: {}", e) }),
        };
        Ok(reply.to_string())
    }
}

/// Identity of a cacheable request: method, url, headers and body
fn cache_key(
    method: HttpMethod,
    url: &str,
    headers: &Headers,
    body: Option<&serde_json::Value>,
) -> String {
    format!(
        "{}:{}:{}:{}",
        method.as_str(),
        url,
        serde_json::to_string(headers).unwrap_or_default(),
        serde_json::to_string(&body).unwrap_or_default()
    )
}

/// Convert a header map, skipping names or values reqwest cannot carry
fn to_header_map(headers: &Headers) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(header = %key, "Skipping invalid header"),
        }
    }
    map
}

fn from_header_map(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request timed out ({}s)", crate::constants::EXECUTOR_TIMEOUT.as_secs())
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    }
}

/// Execute an HTTP request and normalize the upstream reply
pub async fn execute_http(
    client: &reqwest::Client,
    url: &str,
    method: HttpMethod,
    headers: &Headers,
    body: Option<&serde_json::Value>,
) -> Result<Response, String> {
    let start = Instant::now();

    let mut req_builder = match method {
        HttpMethod::GET => client.get(url),
        HttpMethod::POST => client.post(url),
        HttpMethod::PUT => client.put(url),
        HttpMethod::PATCH => client.patch(url),
        HttpMethod::DELETE => client.delete(url),
    };
    req_builder = req_builder.headers(to_header_map(headers));
    if let Some(body) = body {
        req_builder = req_builder.json(body);
    }

    let resp = req_builder.send().await.map_err(|e| describe_error(&e))?;
    let status = resp.status().as_u16();
    let response_headers = from_header_map(resp.headers());
    let text = resp
        .text()
        .await
        .map_err(|e| format!("Error reading body: {}", e))?;

    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

    Ok(Response {
        status,
        headers: Some(response_headers),
        body,
        duration_ms: elapsed_ms(start),
        cached: false,
    })
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Execute a GraphQL operation; the reply body carries `data` and `errors`
pub async fn execute_graphql(
    client: &reqwest::Client,
    url: &str,
    query: &str,
    variables: Option<serde_json::Value>,
    headers: &Headers,
) -> Result<Response, String> {
    let start = Instant::now();

    let mut header_map = HeaderMap::new();
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    header_map.extend(to_header_map(headers));

    let payload = json!({
        "query": query,
        "variables": variables,
    });

    let resp = client
        .post(url)
        .headers(header_map)
        .json(&payload)
        .send()
        .await
        .map_err(|e| format!("GraphQL request failed: {}", e))?;

    let status = resp.status().as_u16();
    let response_headers = from_header_map(resp.headers());
    let gql: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| format!("Failed to parse GraphQL response: {}", e))?;

    Ok(Response {
        status,
        headers: Some(response_headers),
        body: json!({
            "data": gql.get("data"),
            "errors": gql.get("errors"),
        }),
        duration_ms: elapsed_ms(start),
        cached: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::error::TransportCause;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_request_is_executed_and_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts"))
            .and(header("x-trace", "abc"))
            .and(body_json(json!({"title": "foo"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 101})))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = Headers::new();
        headers.insert("X-Trace".to_string(), "abc".to_string());
        let request = Request {
            name: "create".to_string(),
            url: format!("{}/posts", server.uri()),
            kind: RequestKind::Http {
                method: HttpMethod::POST,
                headers,
                body: Some(json!({"title": "foo"})),
                use_cache: false,
            },
        };

        let dispatcher = Dispatcher::new(LocalBackend::new());
        let response = dispatcher.dispatch(&request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!({"id": 101}));
        assert!(response.headers.unwrap().contains_key("content-type"));
    }

    #[tokio::test]
    async fn test_non_json_upstream_body_becomes_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let request = Request {
            name: "health".to_string(),
            url: format!("{}/health", server.uri()),
            kind: RequestKind::Http {
                method: HttpMethod::GET,
                headers: Headers::new(),
                body: None,
                use_cache: true,
            },
        };

        let dispatcher = Dispatcher::new(LocalBackend::new());
        let response = dispatcher.dispatch(&request).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, json!("boom"));

        // Error replies are never cached
        let again = dispatcher.dispatch(&request).await.unwrap();
        assert!(!again.cached);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    fn cached_get(url: String, use_cache: bool) -> Request {
        Request {
            name: "users".to_string(),
            url,
            kind: RequestKind::Http {
                method: HttpMethod::GET,
                headers: Headers::new(),
                body: None,
                use_cache,
            },
        }
    }

    #[tokio::test]
    async fn test_cached_get_is_served_once_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(LocalBackend::new());
        let request = cached_get(format!("{}/users", server.uri()), true);

        let first = dispatcher.dispatch(&request).await.unwrap();
        assert!(!first.cached);
        let second = dispatcher.dispatch(&request).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.status, 200);
        assert_eq!(second.body, first.body);
    }

    #[tokio::test]
    async fn test_get_without_cache_flag_always_goes_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(LocalBackend::new());
        let request = cached_get(format!("{}/users", server.uri()), false);
        for _ in 0..2 {
            assert!(!dispatcher.dispatch(&request).await.unwrap().cached);
        }
    }

    #[test]
    fn test_cache_key_distinguishes_headers() {
        let mut headers = Headers::new();
        let plain = cache_key(HttpMethod::GET, "https://example.com", &headers, None);
        headers.insert("Accept".to_string(), "text/plain".to_string());
        let with_accept = cache_key(HttpMethod::GET, "https://example.com", &headers, None);
        assert_ne!(plain, with_accept);
    }

    #[tokio::test]
    async fn test_graphql_body_carries_data_and_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "query": "query($id: ID!) { user(id: $id) { name } }",
                "variables": {"id": 7}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"user": {"name": "Ada"}}
            })))
            .mount(&server)
            .await;

        let request = Request {
            name: "user".to_string(),
            url: format!("{}/graphql", server.uri()),
            kind: RequestKind::GraphQL {
                query: "query($id: ID!) { user(id: $id) { name } }".to_string(),
                headers: Headers::new(),
                variables: Some(json!({"id": 7})),
            },
        };

        let response = Dispatcher::new(LocalBackend::new())
            .dispatch(&request)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"]["user"]["name"], "Ada");
        assert_eq!(response.body["errors"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_graphql_non_json_reply_is_structured_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let request = Request {
            name: "q".to_string(),
            url: format!("{}/graphql", server.uri()),
            kind: RequestKind::GraphQL {
                query: "{ me { id } }".to_string(),
                headers: Headers::new(),
                variables: None,
            },
        };

        let err = Dispatcher::new(LocalBackend::new())
            .dispatch(&request)
            .await
            .unwrap_err();
        match err.cause {
            TransportCause::Structured { message } => {
                assert!(message.starts_with("Failed to parse GraphQL response"))
            }
            other => panic!("unexpected cause: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mismatched_endpoint_is_rejected() {
        let backend = LocalBackend::new();
        let payload = json!({
            "protocol": "WebSocket",
            "name": "ws",
            "url": "ws://127.0.0.1:9",
            "messages": [],
            "duration": 1
        });
        let reply = backend.send(Endpoint::Proxy, payload).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert!(value["error"].as_str().unwrap().contains("/proxy"));
    }

    #[test]
    fn test_invalid_headers_are_skipped() {
        let mut headers = Headers::new();
        headers.insert("Good".to_string(), "yes".to_string());
        headers.insert("bad header".to_string(), "no".to_string());
        let map = to_header_map(&headers);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("good").unwrap(), "yes");
    }
}
