//! Blob mirror trait for algorithm documents.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::AlgorithmId;

/// A file-like store holding a copy of each algorithm's source document.
///
/// The relational store stays the source of truth. Implementations live in
/// `algohub-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the store is reachable and writable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write (or overwrite) the document for an algorithm.
    async fn put(&self, id: AlgorithmId, data: Bytes) -> AppResult<()>;

    /// Read the document for an algorithm, `None` if absent.
    async fn get(&self, id: AlgorithmId) -> AppResult<Option<Bytes>>;

    /// Remove the document for an algorithm. Removing a missing entry succeeds.
    async fn delete(&self, id: AlgorithmId) -> AppResult<()>;
}
