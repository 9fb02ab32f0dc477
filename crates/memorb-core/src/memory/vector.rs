//! Vector store trait.
//!
//! A vector store holds one namespace per tenant. Implementations (e.g.,
//! Qdrant) live in memorb-infra.

use memorb_types::error::RepositoryError;
use memorb_types::memory::{MemoryPoint, NamespaceSpec, ScoredPoint, SnapshotArchive};
use memorb_types::tenant::Namespace;

/// Trait for namespaced vector storage with similarity search.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait VectorStore: Send + Sync {
    /// Create `namespace` with `spec` if it does not exist yet.
    fn ensure_namespace(
        &self,
        namespace: &Namespace,
        spec: NamespaceSpec,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Drop `namespace` if present and create it empty with `spec`.
    fn recreate_namespace(
        &self,
        namespace: &Namespace,
        spec: NamespaceSpec,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete `namespace` and everything in it.
    ///
    /// Deleting a namespace that does not exist is not an error.
    fn delete_namespace(
        &self,
        namespace: &Namespace,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Nearest neighbours of `vector`, best first.
    fn search(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredPoint>, RepositoryError>> + Send;

    /// Insert or replace points by id.
    fn upsert(
        &self,
        namespace: &Namespace,
        points: Vec<MemoryPoint>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Produce a full snapshot of `namespace`.
    fn export_snapshot(
        &self,
        namespace: &Namespace,
    ) -> impl std::future::Future<Output = Result<SnapshotArchive, RepositoryError>> + Send;

    /// Restore `namespace` from a snapshot, replacing its contents.
    fn import_snapshot(
        &self,
        namespace: &Namespace,
        archive: SnapshotArchive,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
