//! Algorithm repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use algohub_core::error::{AppError, ErrorKind};
use algohub_core::result::AppResult;
use algohub_core::types::{AlgorithmId, FolderId, UserId};
use algohub_entity::algorithm::Algorithm;
use algohub_entity::rights::AccessLevel;

use super::{db_error, is_foreign_key_violation};
use crate::store::AlgorithmStore;

/// Repository for algorithm rows.
#[derive(Debug, Clone)]
pub struct AlgorithmRepository {
    pool: PgPool,
}

impl AlgorithmRepository {
    /// Create a new algorithm repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlgorithmStore for AlgorithmRepository {
    async fn find_by_id(&self, id: AlgorithmId) -> AppResult<Option<Algorithm>> {
        sqlx::query_as::<_, Algorithm>("SELECT * FROM algorithms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find algorithm"))
    }

    async fn find_in_folder(&self, folder_id: FolderId) -> AppResult<Vec<Algorithm>> {
        sqlx::query_as::<_, Algorithm>(
            "SELECT * FROM algorithms WHERE folder_id = $1 ORDER BY name ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list folder algorithms"))
    }

    async fn find_many(&self, ids: &[AlgorithmId]) -> AppResult<Vec<Algorithm>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_as::<_, Algorithm>(
            "SELECT * FROM algorithms WHERE id = ANY($1) ORDER BY name ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list algorithms"))
    }

    async fn create_with_owner(
        &self,
        algorithm: &Algorithm,
        owner_id: UserId,
    ) -> AppResult<Algorithm> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let created = sqlx::query_as::<_, Algorithm>(
            "INSERT INTO algorithms (id, name, folder_id, source_code, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(algorithm.id)
        .bind(&algorithm.name)
        .bind(algorithm.folder_id)
        .bind(&algorithm.source_code)
        .bind(algorithm.created_at)
        .bind(algorithm.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("Containing folder not found")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create algorithm", e)
            }
        })?;

        sqlx::query(
            "INSERT INTO algorithm_rights (user_id, resource_id, access_level) VALUES ($1, $2, $3)",
        )
        .bind(owner_id)
        .bind(created.id)
        .bind(AccessLevel::Owner)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found(format!("User {owner_id} not found"))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to record algorithm owner", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit algorithm creation"))?;

        Ok(created)
    }

    async fn update(&self, algorithm: &Algorithm) -> AppResult<Algorithm> {
        sqlx::query_as::<_, Algorithm>(
            "UPDATE algorithms SET name = $2, folder_id = $3, source_code = $4, updated_at = $5 \
             WHERE id = $1 RETURNING *",
        )
        .bind(algorithm.id)
        .bind(&algorithm.name)
        .bind(algorithm.folder_id)
        .bind(&algorithm.source_code)
        .bind(algorithm.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("Destination folder not found")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to update algorithm", e)
            }
        })?
        .ok_or_else(|| AppError::not_found(format!("Algorithm {} not found", algorithm.id)))
    }

    async fn delete_with_rights(&self, id: AlgorithmId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("DELETE FROM algorithm_rights WHERE resource_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete algorithm rights"))?;

        let deleted = sqlx::query("DELETE FROM algorithms WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete algorithm"))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(db_error("Failed to commit algorithm deletion"))?;

        Ok(deleted > 0)
    }
}
