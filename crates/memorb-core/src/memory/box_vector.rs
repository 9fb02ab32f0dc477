//! BoxVectorStore -- object-safe dynamic dispatch wrapper for VectorStore.
//!
//! Same blanket-impl pattern as BoxLlmProvider.

use std::future::Future;
use std::pin::Pin;

use memorb_types::error::RepositoryError;
use memorb_types::memory::{MemoryPoint, NamespaceSpec, ScoredPoint, SnapshotArchive};
use memorb_types::tenant::Namespace;

use super::vector::VectorStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Object-safe version of [`VectorStore`] with boxed futures.
pub trait VectorStoreDyn: Send + Sync {
    fn ensure_namespace_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        spec: NamespaceSpec,
    ) -> BoxFuture<'a, ()>;

    fn recreate_namespace_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        spec: NamespaceSpec,
    ) -> BoxFuture<'a, ()>;

    fn delete_namespace_boxed<'a>(&'a self, namespace: &'a Namespace) -> BoxFuture<'a, ()>;

    fn search_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'a, Vec<ScoredPoint>>;

    fn upsert_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        points: Vec<MemoryPoint>,
    ) -> BoxFuture<'a, ()>;

    fn export_snapshot_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
    ) -> BoxFuture<'a, SnapshotArchive>;

    fn import_snapshot_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        archive: SnapshotArchive,
    ) -> BoxFuture<'a, ()>;
}

impl<T: VectorStore> VectorStoreDyn for T {
    fn ensure_namespace_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        spec: NamespaceSpec,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.ensure_namespace(namespace, spec))
    }

    fn recreate_namespace_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        spec: NamespaceSpec,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.recreate_namespace(namespace, spec))
    }

    fn delete_namespace_boxed<'a>(&'a self, namespace: &'a Namespace) -> BoxFuture<'a, ()> {
        Box::pin(self.delete_namespace(namespace))
    }

    fn search_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'a, Vec<ScoredPoint>> {
        Box::pin(self.search(namespace, vector, limit))
    }

    fn upsert_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        points: Vec<MemoryPoint>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.upsert(namespace, points))
    }

    fn export_snapshot_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
    ) -> BoxFuture<'a, SnapshotArchive> {
        Box::pin(self.export_snapshot(namespace))
    }

    fn import_snapshot_boxed<'a>(
        &'a self,
        namespace: &'a Namespace,
        archive: SnapshotArchive,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.import_snapshot(namespace, archive))
    }
}

/// Type-erased vector store.
pub struct BoxVectorStore {
    inner: Box<dyn VectorStoreDyn + Send + Sync>,
}

impl BoxVectorStore {
    pub fn new<T: VectorStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub async fn ensure_namespace(
        &self,
        namespace: &Namespace,
        spec: NamespaceSpec,
    ) -> Result<(), RepositoryError> {
        self.inner.ensure_namespace_boxed(namespace, spec).await
    }

    pub async fn recreate_namespace(
        &self,
        namespace: &Namespace,
        spec: NamespaceSpec,
    ) -> Result<(), RepositoryError> {
        self.inner.recreate_namespace_boxed(namespace, spec).await
    }

    pub async fn delete_namespace(&self, namespace: &Namespace) -> Result<(), RepositoryError> {
        self.inner.delete_namespace_boxed(namespace).await
    }

    pub async fn search(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, RepositoryError> {
        self.inner.search_boxed(namespace, vector, limit).await
    }

    pub async fn upsert(
        &self,
        namespace: &Namespace,
        points: Vec<MemoryPoint>,
    ) -> Result<(), RepositoryError> {
        self.inner.upsert_boxed(namespace, points).await
    }

    pub async fn export_snapshot(
        &self,
        namespace: &Namespace,
    ) -> Result<SnapshotArchive, RepositoryError> {
        self.inner.export_snapshot_boxed(namespace).await
    }

    pub async fn import_snapshot(
        &self,
        namespace: &Namespace,
        archive: SnapshotArchive,
    ) -> Result<(), RepositoryError> {
        self.inner.import_snapshot_boxed(namespace, archive).await
    }
}
