//! Local filesystem blob store.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use algohub_core::error::{AppError, ErrorKind};
use algohub_core::result::AppResult;
use algohub_core::traits::blob::BlobStore;
use algohub_core::types::AlgorithmId;

/// Blob store writing one `<id>.json` file per algorithm under a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Directory holding the documents.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at the given path, creating the directory if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Path of the document for an algorithm.
    pub fn path_for(&self, id: AlgorithmId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn put(&self, id: AlgorithmId, data: Bytes) -> AppResult<()> {
        let path = self.path_for(id);
        fs::write(&path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write document: {}", path.display()),
                e,
            )
        })?;

        debug!(algorithm_id = %id, bytes = data.len(), "Wrote algorithm document");
        Ok(())
    }

    async fn get(&self, id: AlgorithmId) -> AppResult<Option<Bytes>> {
        let path = self.path_for(id);
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read document: {}", path.display()),
                e,
            )),
        }
    }

    async fn delete(&self, id: AlgorithmId) -> AppResult<()> {
        let path = self.path_for(id);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(algorithm_id = %id, "Deleted algorithm document");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete document: {}", path.display()),
                e,
            )),
        }
    }
}
