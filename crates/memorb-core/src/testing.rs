//! In-process fakes for the port traits.
//!
//! Compiled for this crate's tests and, behind the `testing` feature, for
//! downstream crates' tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use memorb_types::error::RepositoryError;
use memorb_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};
use memorb_types::memory::{MemoryPoint, NamespaceSpec, ScoredPoint, SnapshotArchive};
use memorb_types::tenant::Namespace;

use crate::llm::provider::{LlmProvider, LlmStream};
use crate::memory::embedder::Embedder;
use crate::memory::vector::VectorStore;

/// Shared log of requests a [`ScriptedLlm`] received.
pub type RequestLog = Arc<Mutex<Vec<CompletionRequest>>>;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// LLM provider that answers from a script.
///
/// Queued replies are used first; afterwards every call gets the fallback.
/// Streaming splits the reply after each space.
pub struct ScriptedLlm {
    queue: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    requests: RequestLog,
}

impl ScriptedLlm {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_fallback(Reply::Text(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_fallback(Reply::Fail(message.into()))
    }

    fn with_fallback(fallback: Reply) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply ahead of the fallback.
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.queue.lock().unwrap().push_back(Reply::Text(text.into()));
        self
    }

    /// Queue a failure ahead of the fallback.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.queue.lock().unwrap().push_back(Reply::Fail(message.into()));
        self
    }

    pub fn requests(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }

    fn next(&self, request: &CompletionRequest) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match self.next(request) {
            Reply::Text(content) => Ok(CompletionResponse {
                id: "scripted-1".into(),
                content,
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            }),
            Reply::Fail(message) => Err(LlmError::Provider { message }),
        }
    }

    fn stream(&self, request: CompletionRequest) -> LlmStream {
        let events: Vec<Result<StreamEvent, LlmError>> = match self.next(&request) {
            Reply::Text(content) => std::iter::once(Ok(StreamEvent::Connected))
                .chain(content.split_inclusive(' ').map(|chunk| {
                    Ok(StreamEvent::TextDelta {
                        text: chunk.to_string(),
                    })
                }))
                .chain(std::iter::once(Ok(StreamEvent::Done)))
                .collect(),
            Reply::Fail(message) => vec![Err(LlmError::Stream(message))],
        };
        Box::pin(futures_util::stream::iter(events))
    }
}

/// Deterministic bag-of-bytes embedder.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for (i, b) in text.bytes().enumerate() {
            v[(i + b as usize) % self.dims] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dims
    }
}

#[derive(Debug, Clone, Default)]
struct StoredNamespace {
    spec: Option<NamespaceSpec>,
    points: Vec<MemoryPoint>,
}

/// Vector store held in a process-local map. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorStore {
    namespaces: Arc<Mutex<HashMap<String, StoredNamespace>>>,
    fail_with: Option<String>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with a connection error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.lock().unwrap().contains_key(namespace)
    }

    pub fn spec(&self, namespace: &str) -> Option<NamespaceSpec> {
        self.namespaces
            .lock()
            .unwrap()
            .get(namespace)
            .and_then(|ns| ns.spec)
    }

    pub fn points(&self, namespace: &str) -> Vec<MemoryPoint> {
        self.namespaces
            .lock()
            .unwrap()
            .get(namespace)
            .map(|ns| ns.points.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        match &self.fail_with {
            Some(message) => Err(RepositoryError::Connection(message.clone())),
            None => Ok(()),
        }
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

impl VectorStore for InMemoryVectorStore {
    async fn ensure_namespace(
        &self,
        namespace: &Namespace,
        spec: NamespaceSpec,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        self.namespaces
            .lock()
            .unwrap()
            .entry(namespace.to_string())
            .or_insert_with(|| StoredNamespace {
                spec: Some(spec),
                points: Vec::new(),
            });
        Ok(())
    }

    async fn recreate_namespace(
        &self,
        namespace: &Namespace,
        spec: NamespaceSpec,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        self.namespaces.lock().unwrap().insert(
            namespace.to_string(),
            StoredNamespace {
                spec: Some(spec),
                points: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &Namespace) -> Result<(), RepositoryError> {
        self.check()?;
        self.namespaces.lock().unwrap().remove(namespace.as_str());
        Ok(())
    }

    async fn search(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, RepositoryError> {
        self.check()?;
        let guard = self.namespaces.lock().unwrap();
        let stored = guard
            .get(namespace.as_str())
            .ok_or_else(|| RepositoryError::NotFound(namespace.to_string()))?;
        let mut hits: Vec<ScoredPoint> = stored
            .points
            .iter()
            .map(|p| ScoredPoint {
                id: p.id.to_string(),
                score: cosine(&vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn upsert(
        &self,
        namespace: &Namespace,
        points: Vec<MemoryPoint>,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut guard = self.namespaces.lock().unwrap();
        let stored = guard
            .get_mut(namespace.as_str())
            .ok_or_else(|| RepositoryError::NotFound(namespace.to_string()))?;
        for point in points {
            stored.points.retain(|p| p.id != point.id);
            stored.points.push(point);
        }
        Ok(())
    }

    async fn export_snapshot(&self, namespace: &Namespace) -> Result<SnapshotArchive, RepositoryError> {
        self.check()?;
        let guard = self.namespaces.lock().unwrap();
        let stored = guard
            .get(namespace.as_str())
            .ok_or_else(|| RepositoryError::NotFound(namespace.to_string()))?;
        let bytes = serde_json::to_vec(&stored.points)
            .map_err(|e| RepositoryError::Snapshot(e.to_string()))?;
        Ok(SnapshotArchive {
            name: format!("{namespace}.snapshot"),
            bytes,
        })
    }

    async fn import_snapshot(
        &self,
        namespace: &Namespace,
        archive: SnapshotArchive,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let points: Vec<MemoryPoint> = serde_json::from_slice(&archive.bytes)
            .map_err(|e| RepositoryError::Snapshot(e.to_string()))?;
        let spec = points.first().map(|p| NamespaceSpec {
            dims: p.vector.len() as u64,
            distance: memorb_types::memory::DistanceMetric::Cosine,
        });
        self.namespaces
            .lock()
            .unwrap()
            .insert(namespace.to_string(), StoredNamespace { spec, points });
        Ok(())
    }
}
