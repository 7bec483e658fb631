// Content normalization
//
// Turns the agent service's free-form `content` into display text.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::history::HistoryContent;

/// Literal the model emits to flag an internal function call.
pub const FUNCTION_CALL_MARKER: &str = "<has_function_call>";

/// Flattens history content into a single display string.
///
/// - Text: as-is
/// - Empty: ""
/// - Fragments: each fragment normalized, concatenated without separator
/// - Record with a string `text` field: that field
/// - Anything else: compact JSON, with integral floats written as integers
pub fn stringify_history_content(content: &HistoryContent) -> String {
    match content {
        HistoryContent::Text(text) => text.clone(),
        HistoryContent::Empty => String::new(),
        HistoryContent::Fragments(items) => items.iter().map(stringify_history_content).collect(),
        HistoryContent::Record(map) => stringify_record(map),
        HistoryContent::Scalar(value) => integral_floats_as_integers(value.clone()).to_string(),
    }
}

fn stringify_record(map: &Map<String, Value>) -> String {
    if let Some(Value::String(text)) = map.get("text") {
        return text.clone();
    }

    let value = integral_floats_as_integers(Value::Object(map.clone()));
    serde_json::to_string(&value).unwrap_or_else(|e| {
        debug!("Failed to serialize history content, using placeholder: {}", e);
        "[object Object]".to_string()
    })
}

/// Rewrites `1.0` as `1` so numbers print the way the agent service's clients show them.
fn integral_floats_as_integers(value: Value) -> Value {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < 1e18 => {
                Value::from(f as i64)
            }
            _ => Value::Number(number),
        },
        Value::Array(items) => {
            Value::Array(items.into_iter().map(integral_floats_as_integers).collect())
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, integral_floats_as_integers(item)))
                .collect(),
        ),
        other => other,
    }
}

/// Strips every occurrence of [`FUNCTION_CALL_MARKER`], including ones that
/// only form after an inner marker is removed.
pub fn sanitize_text(text: &str) -> String {
    let mut sanitized = text.replace(FUNCTION_CALL_MARKER, "");
    while sanitized.contains(FUNCTION_CALL_MARKER) {
        sanitized = sanitized.replace(FUNCTION_CALL_MARKER, "");
    }
    sanitized
}
