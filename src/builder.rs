//! Request builder - turns raw field text into a typed [`Request`] and back

use serde::de::DeserializeOwned;

use crate::error::{Field, ValidationError};
use crate::models::{Headers, Protocol, RawFields, Request, RequestKind};
use crate::validate::is_valid_json;

/// Build a request from raw field text for the given protocol.
///
/// Pure: nothing is sent and nothing is stored. Empty JSON fields mean
/// "not set" and never fail. A body or variables field holding a literal
/// `null` also means "not set".
pub fn build(protocol: Protocol, fields: &RawFields) -> Result<Request, ValidationError> {
    let kind = match protocol {
        Protocol::Http => RequestKind::Http {
            method: fields.method,
            headers: parse_headers(&fields.headers)?,
            body: parse_optional_json(&fields.body, Field::Body)?,
            use_cache: fields.use_cache,
        },
        Protocol::WebSocket => RequestKind::WebSocket {
            messages: split_messages(&fields.messages),
            duration: parse_listen(&fields.listen)?,
        },
        Protocol::GraphQL => RequestKind::GraphQL {
            query: fields.query.clone(),
            headers: parse_headers(&fields.headers)?,
            variables: parse_optional_json(&fields.body, Field::Variables)?,
        },
    };

    let url = fields.url.trim();
    if url.is_empty() {
        return Err(ValidationError::new(Field::Url));
    }

    let name = match fields.name.trim() {
        "" => url.to_string(),
        name => name.to_string(),
    };

    Ok(Request {
        name,
        url: url.to_string(),
        kind,
    })
}

/// Reconstruct editable field text from a request (inverse of [`build`]).
pub fn populate(request: &Request) -> RawFields {
    let mut fields = RawFields {
        name: request.name.clone(),
        url: request.url.clone(),
        ..RawFields::default()
    };

    match &request.kind {
        RequestKind::Http {
            method,
            headers,
            body,
            use_cache,
        } => {
            fields.method = *method;
            fields.headers = format_headers(headers);
            fields.body = format_optional_json(body);
            fields.use_cache = *use_cache;
        }
        RequestKind::WebSocket { messages, duration } => {
            fields.messages = messages.join("\n");
            fields.listen = duration.map(|secs| secs.to_string()).unwrap_or_default();
        }
        RequestKind::GraphQL {
            query,
            headers,
            variables,
        } => {
            fields.query = query.clone();
            fields.headers = format_headers(headers);
            fields.body = format_optional_json(variables);
        }
    }

    fields
}

fn parse_headers(text: &str) -> Result<Headers, ValidationError> {
    Ok(parse_optional(text, Field::Headers)?.unwrap_or_default())
}

fn parse_optional_json(
    text: &str,
    field: Field,
) -> Result<Option<serde_json::Value>, ValidationError> {
    // `null` would not survive storage as a distinct value
    Ok(parse_optional(text, field)?.filter(|value: &serde_json::Value| !value.is_null()))
}

fn parse_listen(text: &str) -> Result<Option<u64>, ValidationError> {
    match text.trim() {
        "" => Ok(None),
        secs => secs
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::new(Field::Listen)),
    }
}

fn parse_optional<T: DeserializeOwned>(text: &str, field: Field) -> Result<Option<T>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    if !is_valid_json(text) {
        return Err(ValidationError::new(field));
    }
    // Valid JSON of the wrong shape (e.g. headers as an array) is still rejected
    serde_json::from_str(text)
        .map(Some)
        .map_err(|_| ValidationError::new(field))
}

fn split_messages(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn format_headers(headers: &Headers) -> String {
    if headers.is_empty() {
        String::new()
    } else {
        serde_json::to_string_pretty(headers).unwrap_or_default()
    }
}

fn format_optional_json(value: &Option<serde_json::Value>) -> String {
    value
        .as_ref()
        .map(|v| serde_json::to_string_pretty(v).unwrap_or_default())
        .unwrap_or_default()
}
