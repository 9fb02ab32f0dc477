//! Per-tenant in-process transcripts for the lightweight chat.
//!
//! Entries are created on first use and removed only by [`TranscriptStore::remove`].
//! Each tenant has its own async mutex; holding it serializes that tenant's
//! read-modify-write cycles while other tenants proceed.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use memorb_types::llm::Message;
use memorb_types::tenant::TenantId;

type Transcript = Arc<Mutex<Vec<Message>>>;

#[derive(Debug, Default)]
pub struct TranscriptStore {
    entries: DashMap<TenantId, Transcript>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `tenant`'s transcript, creating an empty one if absent.
    pub async fn lock(&self, tenant: &TenantId) -> OwnedMutexGuard<Vec<Message>> {
        // Clone the Arc out so no map shard guard is held across the await.
        let transcript = Arc::clone(self.entries.entry(tenant.clone()).or_default().value());
        transcript.lock_owned().await
    }

    /// Lock `tenant`'s transcript only if it exists.
    pub async fn lock_existing(&self, tenant: &TenantId) -> Option<OwnedMutexGuard<Vec<Message>>> {
        let transcript = self.entries.get(tenant).map(|e| Arc::clone(e.value()))?;
        Some(transcript.lock_owned().await)
    }

    /// Copy of `tenant`'s messages, if a transcript exists.
    pub async fn snapshot(&self, tenant: &TenantId) -> Option<Vec<Message>> {
        self.lock_existing(tenant).await.map(|guard| guard.clone())
    }

    /// Drop `tenant`'s transcript. Returns whether one existed.
    pub fn remove(&self, tenant: &TenantId) -> bool {
        self.entries.remove(tenant).is_some()
    }

    pub fn contains(&self, tenant: &TenantId) -> bool {
        self.entries.contains_key(tenant)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
