//! Chat service driving both chat flows.
//!
//! The service owns no per-request state. Streams it returns are `'static`
//! so handlers can hand them straight to the SSE response.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};

use memorb_types::config::LlmConfig;
use memorb_types::llm::{CompletionRequest, LlmError, Message, StreamEvent};
use memorb_types::memory::MemoryHit;
use memorb_types::tenant::TenantId;

use crate::chat::ChatEvent;
use crate::chat::transcript::TranscriptStore;
use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::session::MemorySession;

/// Render the persistent-chat system prompt with retrieved memories.
pub fn memory_system_prompt(hits: &[MemoryHit]) -> String {
    let memories = hits
        .iter()
        .map(|hit| format!("- {}", hit.memory))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a helpful AI. Answer the question based on query and memories.\nUser Memories:\n{memories}"
    )
}

#[derive(Clone)]
pub struct ChatService {
    llm: Arc<BoxLlmProvider>,
    transcripts: Arc<TranscriptStore>,
    settings: LlmConfig,
    system_prompt: String,
    search_limit: u64,
}

impl ChatService {
    pub fn new(
        llm: Arc<BoxLlmProvider>,
        transcripts: Arc<TranscriptStore>,
        settings: LlmConfig,
        system_prompt: impl Into<String>,
        search_limit: u64,
    ) -> Self {
        Self {
            llm,
            transcripts,
            settings,
            system_prompt: system_prompt.into(),
            search_limit,
        }
    }

    pub fn transcripts(&self) -> &Arc<TranscriptStore> {
        &self.transcripts
    }

    /// Retrieval-augmented chat over the tenant's memory session.
    ///
    /// Each upstream fragment is forwarded as soon as it arrives. After a
    /// clean finish the exchange is handed to [`MemorySession::add`]. Any
    /// failure yields one `Error` event; `Done` always comes last.
    pub fn persistent_chat(
        &self,
        session: MemorySession,
        message: String,
    ) -> impl Stream<Item = ChatEvent> + Send + use<> {
        let llm = Arc::clone(&self.llm);
        let model = self.settings.chat_model.clone();
        let limit = self.search_limit;

        async_stream::stream! {
            let hits = match session.search(&message, limit).await {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::error!(tenant = %session.tenant(), error = %e, "memory search failed");
                    yield ChatEvent::error(e);
                    yield ChatEvent::done();
                    return;
                }
            };
            tracing::debug!(tenant = %session.tenant(), memories = hits.len(), "retrieved memories");

            let system = Message::system(memory_system_prompt(&hits));
            let user = Message::user(message);
            let mut request = CompletionRequest::new(model, vec![system.clone(), user.clone()]);
            request.stream = true;

            let mut upstream = llm.stream(request);
            let mut reply = String::new();
            let mut failure: Option<LlmError> = None;
            while let Some(event) = upstream.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        reply.push_str(&text);
                        yield ChatEvent::content(text);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            if let Some(e) = failure {
                tracing::error!(tenant = %session.tenant(), error = %e, "chat stream failed");
                yield ChatEvent::error(e);
                yield ChatEvent::done();
                return;
            }

            if let Err(e) = session.add(&[system, user, Message::assistant(reply)]).await {
                tracing::error!(tenant = %session.tenant(), error = %e, "failed to store memories");
                yield ChatEvent::error(e);
            }
            yield ChatEvent::done();
        }
    }

    /// One non-streamed reply against the tenant's in-process transcript.
    ///
    /// Holds the tenant's transcript lock for the whole exchange. A new
    /// transcript starts with the configured system prompt. If the model
    /// call fails the user message stays in the transcript.
    #[tracing::instrument(skip(self, message), fields(tenant = %tenant))]
    pub async fn quick_reply(&self, tenant: &TenantId, message: String) -> Result<String, LlmError> {
        let mut transcript = self.transcripts.lock(tenant).await;
        if transcript.is_empty() {
            transcript.push(Message::system(self.system_prompt.clone()));
        }
        transcript.push(Message::user(message));

        let mut request = CompletionRequest::new(self.settings.model.clone(), transcript.clone());
        request.temperature = Some(self.settings.temperature);
        request.max_tokens = Some(self.settings.max_tokens);

        let reply = self.llm.complete(&request).await?.content;
        transcript.push(Message::assistant(reply.clone()));
        Ok(reply)
    }

    /// [`quick_reply`](Self::quick_reply) as a chat event stream.
    pub fn lightweight_chat(
        &self,
        tenant: TenantId,
        message: String,
    ) -> impl Stream<Item = ChatEvent> + Send + use<> {
        let service = self.clone();
        async_stream::stream! {
            match service.quick_reply(&tenant, message).await {
                Ok(reply) => {
                    yield ChatEvent::content(reply);
                }
                Err(e) => {
                    tracing::error!(tenant = %tenant, error = %e, "quick reply failed");
                    yield ChatEvent::error(e);
                }
            }
            yield ChatEvent::done();
        }
    }
}
