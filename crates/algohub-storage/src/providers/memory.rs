//! In-memory blob store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::traits::blob::BlobStore;
use algohub_core::types::AlgorithmId;

/// Blob store keeping documents in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    documents: DashMap<AlgorithmId, Bytes>,
    /// When set, every operation fails with a storage error.
    unavailable: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage (or recover from one).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of documents held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document is held.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::storage("Blob store unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }

    async fn put(&self, id: AlgorithmId, data: Bytes) -> AppResult<()> {
        self.check_available()?;
        self.documents.insert(id, data);
        Ok(())
    }

    async fn get(&self, id: AlgorithmId) -> AppResult<Option<Bytes>> {
        self.check_available()?;
        Ok(self.documents.get(&id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: AlgorithmId) -> AppResult<()> {
        self.check_available()?;
        self.documents.remove(&id);
        Ok(())
    }
}
