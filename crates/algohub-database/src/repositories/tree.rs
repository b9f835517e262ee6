//! Parent-pointer lookups over `folders` and `algorithms`.

use async_trait::async_trait;
use sqlx::PgPool;

use algohub_core::result::AppResult;
use algohub_core::types::{AlgorithmId, FolderId};

use super::db_error;
use crate::store::TreeStore;

/// Repository answering "who is my parent" questions.
#[derive(Debug, Clone)]
pub struct TreeRepository {
    pool: PgPool,
}

impl TreeRepository {
    /// Create a new tree repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TreeStore for TreeRepository {
    async fn folder_parent(&self, folder_id: FolderId) -> AppResult<Option<FolderId>> {
        let parent: Option<Option<FolderId>> =
            sqlx::query_scalar("SELECT parent_id FROM folders WHERE id = $1")
                .bind(folder_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to look up folder parent"))?;
        Ok(parent.flatten())
    }

    async fn algorithm_folder(&self, algorithm_id: AlgorithmId) -> AppResult<Option<FolderId>> {
        let folder: Option<Option<FolderId>> =
            sqlx::query_scalar("SELECT folder_id FROM algorithms WHERE id = $1")
                .bind(algorithm_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to look up algorithm folder"))?;
        Ok(folder.flatten())
    }
}
