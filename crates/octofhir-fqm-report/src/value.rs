//! Display formatting for raw computed values
//!
//! Raw values arrive untyped from the engine: booleans, numbers,
//! strings, lists, structured clinical objects, or nothing at all. The
//! same formatting policy applies across every report artifact.

use serde_json::Value;

const MAX_FALLBACK_LEN: usize = 50;

/// Format a raw computed value for display
///
/// Lists collapse to an item-count placeholder; clinical objects show
/// their `value` or `code` field when one is present.
pub fn format_raw_value(raw: Option<&Value>) -> String {
    let Some(value) = raw else {
        return "null".to_string();
    };
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("Array({})", items.len()),
        Value::Object(fields) => fields
            .get("value")
            .or_else(|| fields.get("code"))
            .map(scalar_display)
            .unwrap_or_else(|| "Object".to_string()),
    }
}

fn scalar_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => truncated(other.to_string()),
    }
}

fn truncated(text: String) -> String {
    match text.char_indices().nth(MAX_FALLBACK_LEN) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}
