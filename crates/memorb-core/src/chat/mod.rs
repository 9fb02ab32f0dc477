//! Chat flows for memorb.
//!
//! - Persistent chat: retrieval-augmented over the tenant's memory session,
//!   streamed fragment by fragment, remembered afterwards.
//! - Lightweight chat: one reply per request against a per-tenant
//!   in-process transcript (see [`transcript::TranscriptStore`]).
//!
//! Both flows yield [`ChatEvent`]s and always finish with `Done`.

pub mod service;
pub mod transcript;

use serde::Serialize;

/// One server-sent event of a chat response.
///
/// Serializes to `{"content": ..}`, `{"error": ..}` or `{"done": true}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatEvent {
    Content { content: String },
    Error { error: String },
    Done { done: bool },
}

impl ChatEvent {
    pub fn content(text: impl Into<String>) -> Self {
        ChatEvent::Content {
            content: text.into(),
        }
    }

    pub fn error(message: impl ToString) -> Self {
        ChatEvent::Error {
            error: message.to_string(),
        }
    }

    pub fn done() -> Self {
        ChatEvent::Done { done: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_event_wire_shapes() {
        assert_eq!(
            serde_json::to_value(ChatEvent::content("hi")).unwrap(),
            serde_json::json!({"content": "hi"})
        );
        assert_eq!(
            serde_json::to_value(ChatEvent::error("boom")).unwrap(),
            serde_json::json!({"error": "boom"})
        );
        assert_eq!(
            serde_json::to_value(ChatEvent::done()).unwrap(),
            serde_json::json!({"done": true})
        );
    }
}
