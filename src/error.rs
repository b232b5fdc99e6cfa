//! Error types shared across the request pipeline

use std::fmt;

/// Editable field named by a validation failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Url,
    Headers,
    Body,
    Variables,
    Listen,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Url => "url",
            Field::Headers => "headers",
            Field::Body => "body",
            Field::Variables => "variables",
            Field::Listen => "listen",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised while building a request, before anything leaves the process.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe_field(.field))]
pub struct ValidationError {
    pub field: Field,
}

fn describe_field(field: &Field) -> String {
    match field {
        Field::Url => "URL must not be empty".to_string(),
        Field::Listen => "Listen duration must be a whole number of seconds".to_string(),
        other => format!("Invalid JSON in {}", other),
    }
}

impl ValidationError {
    pub fn new(field: Field) -> Self {
        ValidationError { field }
    }
}

/// Shape of the failure reported by the transport or the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCause {
    /// An error value carrying its own message
    Structured { message: String },
    /// A bare string error
    Plain(String),
    /// Anything else
    Unrecognized,
}

/// Raised by the dispatcher when no well-formed response came back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe_cause(.cause))]
pub struct TransportError {
    pub cause: TransportCause,
}

impl TransportError {
    pub fn structured(message: impl Into<String>) -> Self {
        TransportError {
            cause: TransportCause::Structured {
                message: message.into(),
            },
        }
    }

    pub fn plain(message: impl Into<String>) -> Self {
        TransportError {
            cause: TransportCause::Plain(message.into()),
        }
    }

    pub fn unrecognized() -> Self {
        TransportError {
            cause: TransportCause::Unrecognized,
        }
    }
}

/// Message shown to the user
fn describe_cause(cause: &TransportCause) -> String {
    match cause {
        TransportCause::Structured { message } => format!("Request failed: {}", message),
        TransportCause::Plain(text) => format!("Request failed: {}", text),
        TransportCause::Unrecognized => {
            "Request failed: unexpected reply from execution backend".to_string()
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            "Request timed out".to_string()
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else {
            e.to_string()
        };
        TransportError::structured(message)
    }
}

/// Raised by a persistence substrate write
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}
