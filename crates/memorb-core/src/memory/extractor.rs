//! Fact extraction via LLM.
//!
//! `FactExtractor` asks the memory LLM which facts in a conversation are
//! worth remembering and returns them as self-contained sentences.
//!
//! Unparseable model output logs a warning and yields no facts; transport
//! errors from the provider propagate.

use serde::Deserialize;

use memorb_types::config::MemoryLlmConfig;
use memorb_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

use crate::llm::box_provider::BoxLlmProvider;

const EXTRACTION_SYSTEM_PROMPT: &str = r#"You organise personal information for a conversational assistant. Read the conversation and list the facts about the user that are worth remembering for future conversations.

Rules:
1. Each fact is one short, self-contained sentence.
2. Keep preferences, plans, personal details, and decisions.
3. Skip greetings, small talk, and anything the assistant said about itself.
4. Ignore the system message.

Reply with JSON only, in this shape:
{"facts": ["<fact>", "<fact>"]}

If nothing is worth remembering, reply with {"facts": []}."#;

#[derive(Debug, Deserialize)]
struct RawFacts {
    #[serde(default)]
    facts: Vec<String>,
}

/// Stateless fact extraction over a conversation.
pub struct FactExtractor;

impl FactExtractor {
    #[tracing::instrument(name = "extract_facts", skip_all, fields(message_count = messages.len()))]
    pub async fn extract(
        provider: &BoxLlmProvider,
        settings: &MemoryLlmConfig,
        messages: &[Message],
    ) -> Result<Vec<String>, LlmError> {
        let conversation: Vec<&Message> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .collect();
        if conversation.is_empty() {
            return Ok(Vec::new());
        }

        let rendered = conversation
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let mut request = CompletionRequest::new(
            settings.model.clone(),
            vec![
                Message::system(EXTRACTION_SYSTEM_PROMPT),
                Message::user(rendered),
            ],
        );
        request.temperature = Some(settings.temperature);
        request.max_tokens = Some(settings.max_tokens);
        request.top_p = Some(settings.top_p);

        let response = provider.complete(&request).await?;
        Ok(parse_facts(&response.content))
    }
}

/// Pull the `facts` array out of a model reply, tolerating code fences
/// and prose around the JSON object.
fn parse_facts(content: &str) -> Vec<String> {
    let trimmed = content.trim();
    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    match serde_json::from_str::<RawFacts>(candidate) {
        Ok(raw) => raw
            .facts
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        Err(e) => {
            let preview: String = trimmed.chars().take(200).collect();
            tracing::warn!(
                error = %e,
                content_preview = %preview,
                "Failed to parse fact extraction JSON; storing nothing"
            );
            Vec::new()
        }
    }
}
