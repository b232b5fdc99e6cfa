//! JSON syntax checks for JSON-bearing text fields

/// True iff `text` parses as a JSON document.
///
/// Callers decide whether empty text means "no constraint"; here it is simply
/// not valid JSON.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}
