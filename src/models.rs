use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Header map shared by HTTP and GraphQL requests (sorted for stable output)
pub type Headers = BTreeMap<String, String>;

/// Protocol variant of a request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    Http,
    WebSocket,
    GraphQL,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::WebSocket => "ws",
            Protocol::GraphQL => "graphql",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "https" => Ok(Protocol::Http),
            "ws" | "wss" | "websocket" => Ok(Protocol::WebSocket),
            "graphql" | "gql" => Ok(Protocol::GraphQL),
            other => Err(format!("Unknown protocol: {}", other)),
        }
    }
}

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "PATCH" => Ok(HttpMethod::PATCH),
            "DELETE" => Ok(HttpMethod::DELETE),
            other => Err(format!("Unsupported method: {}", other)),
        }
    }
}

/// Protocol-specific part of a request.
///
/// Serialized with a `protocol` tag so a stored or forwarded request always
/// carries its discriminant next to the common fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol")]
pub enum RequestKind {
    Http {
        method: HttpMethod,
        #[serde(default)]
        headers: Headers,
        #[serde(default)]
        body: Option<serde_json::Value>,
        /// Serve a repeated GET from the executor's response cache
        #[serde(default, skip_serializing_if = "is_false")]
        use_cache: bool,
    },
    WebSocket {
        #[serde(default)]
        messages: Vec<String>,
        /// Listen window in seconds; the executor default applies when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
    },
    GraphQL {
        query: String,
        #[serde(default)]
        headers: Headers,
        #[serde(default)]
        variables: Option<serde_json::Value>,
    },
}

/// A validated, immutable request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub kind: RequestKind,
}

impl Request {
    pub fn protocol(&self) -> Protocol {
        match self.kind {
            RequestKind::Http { .. } => Protocol::Http,
            RequestKind::WebSocket { .. } => Protocol::WebSocket,
            RequestKind::GraphQL { .. } => Protocol::GraphQL,
        }
    }

    /// Short label for listings, e.g. `POST https://...` or `ws wss://...`
    pub fn label(&self) -> String {
        match &self.kind {
            RequestKind::Http { method, .. } => format!("{} {}", method.as_str(), self.url),
            _ => format!("{} {}", self.protocol(), self.url),
        }
    }
}

/// Normalized reply from the execution backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    pub body: serde_json::Value,
    #[serde(deserialize_with = "non_negative")]
    pub duration_ms: f64,
    /// Set when the executor answered from its response cache
    #[serde(default, skip_serializing_if = "is_false")]
    pub cached: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!(
            "duration_ms must be a non-negative number, got {}",
            value
        )))
    }
}

/// A request kept by name until explicitly deleted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedRequest {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub request: Request,
}

/// History entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub request: Request,
    pub response: Response,
    pub timestamp: DateTime<Utc>,
}

/// Raw, editable field text as the user typed it.
///
/// For GraphQL requests `body` holds the variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawFields {
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: String,
    pub body: String,
    pub query: String,
    pub messages: String,
    /// WebSocket listen window in seconds, blank for the default
    pub listen: String,
    pub use_cache: bool,
}
