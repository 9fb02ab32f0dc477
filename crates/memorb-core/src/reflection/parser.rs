//! Lenient JSON parsing of reflection replies.
//!
//! The model is asked for bare JSON but often wraps it in prose or code
//! fences. The candidate object spans the first `{` to the last `}`.
//! Only text that is not a JSON object becomes [`ReflectionOutcome::Error`];
//! fields of a decoded object are read leniently.

use serde_json::{Map, Value};

use memorb_types::reflection::{NOT_APPLICABLE, ReflectionOutcome, ReflectionRecord};

/// Parse a reflection reply. Never fails.
pub fn parse_reflection(text: &str) -> ReflectionOutcome {
    match decode(text) {
        Ok(record) => ReflectionOutcome::Record(record),
        Err(error) => ReflectionOutcome::Error {
            error: format!("failed to parse reflection: {error}"),
            raw: text.to_string(),
        },
    }
}

fn decode(text: &str) -> Result<ReflectionRecord, String> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err("no JSON object in response".into()),
    };
    let object: Map<String, Value> =
        serde_json::from_str(&text[start..=end]).map_err(|e| e.to_string())?;
    Ok(record_from_object(&object))
}

/// Missing, null or non-scalar fields become `"N/A"`.
fn record_from_object(object: &Map<String, Value>) -> ReflectionRecord {
    ReflectionRecord {
        context_tags: tags(object.get("context_tags")),
        conversation_summary: text_field(object.get("conversation_summary")),
        what_worked: text_field(object.get("what_worked")),
        what_to_avoid: text_field(object.get("what_to_avoid")),
    }
}

fn text_field(value: Option<&Value>) -> String {
    scalar(value).unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A list keeps its scalar items; a lone scalar becomes a one-item list.
fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| scalar(Some(v))).collect(),
        other => scalar(other).into_iter().collect(),
    }
}
