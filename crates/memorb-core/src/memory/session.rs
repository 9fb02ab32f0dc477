//! Memory sessions bound to one tenant namespace.
//!
//! [`MemorySessionFactory`] holds the immutable base configuration and the
//! shared backends. `build_session` derives the tenant config and performs
//! no I/O; the namespace is created on first use. Store errors propagate
//! unchanged: no retries, no fallbacks.

use std::sync::Arc;

use chrono::Utc;

use memorb_types::config::MemoryConfig;
use memorb_types::error::{MemoryError, RepositoryError};
use memorb_types::llm::Message;
use memorb_types::memory::{MemoryHit, MemoryPoint, SnapshotArchive};
use memorb_types::tenant::{Namespace, TenantId};

use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::box_embedder::BoxEmbedder;
use crate::memory::box_vector::BoxVectorStore;
use crate::memory::extractor::FactExtractor;
use crate::tenant::{NamespaceResolver, derive_tenant_config};

/// Handle to one tenant's memories. Cheap to build; holds no state of its own.
pub struct MemorySession {
    tenant: TenantId,
    namespace: Namespace,
    config: MemoryConfig,
    store: Arc<BoxVectorStore>,
    embedder: Arc<BoxEmbedder>,
    llm: Arc<BoxLlmProvider>,
}

impl MemorySession {
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The derived per-tenant configuration.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Memories most similar to `query`, best first.
    #[tracing::instrument(skip(self, query), fields(namespace = %self.namespace))]
    pub async fn search(&self, query: &str, limit: u64) -> Result<Vec<MemoryHit>, MemoryError> {
        self.store
            .ensure_namespace(&self.namespace, self.config.vector_store.namespace_spec())
            .await?;
        let vector = self.embedder.embed_one(query).await?;
        let points = self.store.search(&self.namespace, vector, limit).await?;
        Ok(points.into_iter().filter_map(MemoryHit::from_scored).collect())
    }

    /// Extract facts from `messages` and store each one. Returns the stored facts.
    #[tracing::instrument(skip(self, messages), fields(namespace = %self.namespace))]
    pub async fn add(&self, messages: &[Message]) -> Result<Vec<String>, MemoryError> {
        let facts = FactExtractor::extract(&self.llm, &self.config.llm, messages).await?;
        if facts.is_empty() {
            tracing::debug!("no facts extracted");
            return Ok(facts);
        }

        let vectors = self.embedder.embed(&facts).await?;
        if vectors.len() != facts.len() {
            return Err(RepositoryError::Embedding(format!(
                "expected {} vectors, got {}",
                facts.len(),
                vectors.len()
            ))
            .into());
        }

        let now = Utc::now();
        let points = facts
            .iter()
            .zip(vectors)
            .map(|(fact, vector)| MemoryPoint::fact(self.tenant.as_str(), fact, vector, now))
            .collect();

        self.store
            .ensure_namespace(&self.namespace, self.config.vector_store.namespace_spec())
            .await?;
        self.store.upsert(&self.namespace, points).await?;
        tracing::info!(count = facts.len(), "stored memories");
        Ok(facts)
    }
}

/// Builds tenant-scoped sessions from one shared base configuration.
pub struct MemorySessionFactory {
    base: MemoryConfig,
    resolver: NamespaceResolver,
    store: Arc<BoxVectorStore>,
    embedder: Arc<BoxEmbedder>,
    llm: Arc<BoxLlmProvider>,
}

impl MemorySessionFactory {
    pub fn new(
        base: MemoryConfig,
        store: Arc<BoxVectorStore>,
        embedder: Arc<BoxEmbedder>,
        llm: Arc<BoxLlmProvider>,
    ) -> Self {
        let resolver = NamespaceResolver::new(base.vector_store.collection_name.clone());
        Self {
            base,
            resolver,
            store,
            embedder,
            llm,
        }
    }

    pub fn base_config(&self) -> &MemoryConfig {
        &self.base
    }

    pub fn namespace(&self, tenant: &TenantId) -> Namespace {
        self.resolver.resolve(tenant)
    }

    pub fn build_session(&self, tenant: &TenantId) -> MemorySession {
        let config = derive_tenant_config(&self.base, tenant);
        MemorySession {
            tenant: tenant.clone(),
            namespace: Namespace::from_raw(config.vector_store.collection_name.clone()),
            config,
            store: Arc::clone(&self.store),
            embedder: Arc::clone(&self.embedder),
            llm: Arc::clone(&self.llm),
        }
    }

    /// Destructively (re)create the tenant namespace, empty, with the
    /// configured dimensionality and cosine distance.
    #[tracing::instrument(skip(self), fields(tenant = %tenant))]
    pub async fn provision(&self, tenant: &TenantId) -> Result<Namespace, RepositoryError> {
        let namespace = self.namespace(tenant);
        self.store
            .recreate_namespace(&namespace, self.base.vector_store.namespace_spec())
            .await?;
        tracing::info!(namespace = %namespace, "provisioned namespace");
        Ok(namespace)
    }

    /// Drop the tenant namespace and every memory in it.
    #[tracing::instrument(skip(self), fields(tenant = %tenant))]
    pub async fn delete(&self, tenant: &TenantId) -> Result<(), RepositoryError> {
        self.store.delete_namespace(&self.namespace(tenant)).await
    }

    #[tracing::instrument(skip(self), fields(tenant = %tenant))]
    pub async fn export(&self, tenant: &TenantId) -> Result<SnapshotArchive, RepositoryError> {
        self.store.export_snapshot(&self.namespace(tenant)).await
    }

    #[tracing::instrument(skip(self, archive), fields(tenant = %tenant, snapshot = %archive.name))]
    pub async fn import(
        &self,
        tenant: &TenantId,
        archive: SnapshotArchive,
    ) -> Result<(), RepositoryError> {
        self.store
            .import_snapshot(&self.namespace(tenant), archive)
            .await
    }
}
