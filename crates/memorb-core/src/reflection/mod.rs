//! Episodic reflection.
//!
//! A transcript is rendered as `ROLE: content` lines, substituted into the
//! reflection template, and sent to the LLM as the whole prompt. The reply
//! is parsed leniently into a [`ReflectionOutcome`].

pub mod episodic;
pub mod parser;
pub mod prompt;

use std::sync::Arc;

use memorb_types::config::LlmConfig;
use memorb_types::llm::{CompletionRequest, LlmError, Message, MessageRole};
use memorb_types::reflection::ReflectionOutcome;

use crate::llm::box_provider::BoxLlmProvider;

/// Render a transcript without its leading system message.
///
/// Each remaining turn becomes `<LABEL>: <content>` (`HUMAN`, `AI`).
pub fn format_conversation(messages: &[Message]) -> String {
    let turns = match messages.first() {
        Some(first) if first.role == MessageRole::System => &messages[1..],
        _ => messages,
    };
    turns
        .iter()
        .map(|m| format!("{}: {}", m.role.transcript_label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone)]
pub struct ReflectionPipeline {
    llm: Arc<BoxLlmProvider>,
    settings: LlmConfig,
}

impl ReflectionPipeline {
    pub fn new(llm: Arc<BoxLlmProvider>, settings: LlmConfig) -> Self {
        Self { llm, settings }
    }

    /// Reflect on `messages`.
    ///
    /// Provider failures are returned as `Err`; an unparseable reply is an
    /// `Ok(ReflectionOutcome::Error { .. })`.
    #[tracing::instrument(skip_all, fields(message_count = messages.len()))]
    pub async fn reflect(&self, messages: &[Message]) -> Result<ReflectionOutcome, LlmError> {
        let prompt = prompt::render(&format_conversation(messages));

        let mut request = CompletionRequest::new(self.settings.model.clone(), vec![Message::user(prompt)]);
        request.temperature = Some(self.settings.temperature);
        request.max_tokens = Some(self.settings.max_tokens);

        let response = self.llm.complete(&request).await?;
        let outcome = parser::parse_reflection(&response.content);
        if outcome.is_error() {
            tracing::warn!("reflection reply was not a JSON object");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;

    #[test]
    fn test_format_conversation_skips_system() {
        let messages = vec![
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
        ];
        assert_eq!(format_conversation(&messages), "HUMAN: hi\nAI: hello");
    }

    #[test]
    fn test_format_conversation_without_system() {
        let messages = vec![Message::user("hi")];
        assert_eq!(format_conversation(&messages), "HUMAN: hi");
        assert_eq!(format_conversation(&[]), "");
    }

    #[tokio::test]
    async fn test_reflect_sends_whole_prompt_as_one_message() {
        let llm = ScriptedLlm::replying(
            r#"{"context_tags": ["greeting", "small_talk"], "conversation_summary": "Said hi.", "what_worked": "N/A", "what_to_avoid": "N/A"}"#,
        );
        let log = llm.requests();
        let pipeline = ReflectionPipeline::new(Arc::new(BoxLlmProvider::new(llm)), LlmConfig::default());

        let outcome = pipeline
            .reflect(&[Message::system("sys"), Message::user("hi")])
            .await
            .unwrap();
        assert_eq!(outcome.record().unwrap().conversation_summary, "Said hi.");

        let requests = log.lock().unwrap();
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].messages[0].content.ends_with("HUMAN: hi\n"));
        assert!(!requests[0].messages[0].content.contains("SYSTEM: sys"));
    }

    #[tokio::test]
    async fn test_reflect_without_assistant_turn_never_raises() {
        for reply in ["not json at all", "{\"context_tags\": [\"x\", \"y\"]}"] {
            let pipeline = ReflectionPipeline::new(
                Arc::new(BoxLlmProvider::new(ScriptedLlm::replying(reply))),
                LlmConfig::default(),
            );
            let outcome = pipeline
                .reflect(&[Message::system("sys"), Message::user("only a question")])
                .await;
            assert!(outcome.is_ok());
        }
    }

    #[tokio::test]
    async fn test_reflect_malformed_reply_keeps_raw() {
        let pipeline = ReflectionPipeline::new(
            Arc::new(BoxLlmProvider::new(ScriptedLlm::replying("{oops}"))),
            LlmConfig::default(),
        );
        let outcome = pipeline.reflect(&[Message::user("hi")]).await.unwrap();
        match outcome {
            ReflectionOutcome::Error { raw, .. } => assert_eq!(raw, "{oops}"),
            other => panic!("expected error outcome, got {other:?}"),
        }
    }
}
