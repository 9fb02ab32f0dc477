//! Reflection types: structured takeaways the LLM extracts from a conversation.

use serde::{Deserialize, Serialize};

/// Value the reflection prompt asks for when a field does not apply.
pub const NOT_APPLICABLE: &str = "N/A";

fn not_applicable() -> String {
    NOT_APPLICABLE.to_string()
}

/// Strategic summary of one conversation.
///
/// Fields missing from the model's JSON fall back to `"N/A"` (tags to empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionRecord {
    /// 2-4 keywords identifying similar future conversations.
    #[serde(default)]
    pub context_tags: Vec<String>,
    #[serde(default = "not_applicable")]
    pub conversation_summary: String,
    #[serde(default = "not_applicable")]
    pub what_worked: String,
    #[serde(default = "not_applicable")]
    pub what_to_avoid: String,
}

/// Result of the reflection step. Never an error: unparseable model output
/// becomes the `Error` variant carrying the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReflectionOutcome {
    Record(ReflectionRecord),
    Error { error: String, raw: String },
}

impl ReflectionOutcome {
    pub fn record(&self) -> Option<&ReflectionRecord> {
        match self {
            ReflectionOutcome::Record(record) => Some(record),
            ReflectionOutcome::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReflectionOutcome::Error { .. })
    }
}
