//! Storing reflections as episodic memories.
//!
//! Each tenant's reflections live in `<episodic prefix>_<tenant>`. A point's
//! vector embeds the rendered conversation; its payload carries the
//! conversation text and the reflection fields.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use memorb_types::error::{EpisodicError, RepositoryError, TranscriptError};
use memorb_types::llm::Message;
use memorb_types::memory::{MemoryPoint, NamespaceSpec};
use memorb_types::reflection::{ReflectionOutcome, ReflectionRecord};
use memorb_types::tenant::TenantId;

use crate::chat::transcript::TranscriptStore;
use crate::memory::box_embedder::BoxEmbedder;
use crate::memory::box_vector::BoxVectorStore;
use crate::reflection::{ReflectionPipeline, format_conversation};
use crate::tenant::NamespaceResolver;

pub struct EpisodicRecorder {
    pipeline: ReflectionPipeline,
    store: Arc<BoxVectorStore>,
    embedder: Arc<BoxEmbedder>,
    resolver: NamespaceResolver,
    spec: NamespaceSpec,
}

impl EpisodicRecorder {
    pub fn new(
        pipeline: ReflectionPipeline,
        store: Arc<BoxVectorStore>,
        embedder: Arc<BoxEmbedder>,
        collection_prefix: impl Into<String>,
        spec: NamespaceSpec,
    ) -> Self {
        Self {
            pipeline,
            store,
            embedder,
            resolver: NamespaceResolver::new(collection_prefix),
            spec,
        }
    }

    /// Reflect on `tenant`'s live transcript and store the result.
    ///
    /// Holds the transcript lock throughout. Fails with
    /// [`TranscriptError::Empty`] when the tenant has no transcript.
    #[tracing::instrument(skip(self, transcripts), fields(tenant = %tenant))]
    pub async fn record_transcript(
        &self,
        transcripts: &TranscriptStore,
        tenant: &TenantId,
    ) -> Result<ReflectionOutcome, EpisodicError> {
        let transcript = transcripts
            .lock_existing(tenant)
            .await
            .ok_or(TranscriptError::Empty)?;
        self.record(tenant, &transcript).await
    }

    /// Reflect on `messages` and store a well-formed reflection.
    ///
    /// An unparseable reflection is logged and returned without being stored.
    pub async fn record(
        &self,
        tenant: &TenantId,
        messages: &[Message],
    ) -> Result<ReflectionOutcome, EpisodicError> {
        let outcome = self.pipeline.reflect(messages).await?;
        match outcome.record() {
            Some(record) => self.store_record(tenant, messages, record).await?,
            None => tracing::warn!(tenant = %tenant, ?outcome, "skipping unparseable reflection"),
        }
        Ok(outcome)
    }

    async fn store_record(
        &self,
        tenant: &TenantId,
        messages: &[Message],
        record: &ReflectionRecord,
    ) -> Result<(), RepositoryError> {
        let conversation = format_conversation(messages);
        let vector = self.embedder.embed_one(&conversation).await?;

        let mut payload = serde_json::Map::new();
        payload.insert("conversation".into(), conversation.into());
        payload.insert("context_tags".into(), json!(record.context_tags));
        payload.insert(
            "conversation_summary".into(),
            record.conversation_summary.clone().into(),
        );
        payload.insert("what_worked".into(), record.what_worked.clone().into());
        payload.insert("what_to_avoid".into(), record.what_to_avoid.clone().into());

        let namespace = self.resolver.resolve(tenant);
        self.store.ensure_namespace(&namespace, self.spec).await?;
        self.store
            .upsert(
                &namespace,
                vec![MemoryPoint {
                    id: Uuid::now_v7(),
                    vector,
                    payload,
                }],
            )
            .await?;
        tracing::info!(namespace = %namespace, "stored episodic memory");
        Ok(())
    }
}
