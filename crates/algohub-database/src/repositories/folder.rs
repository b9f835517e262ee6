//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use algohub_core::error::{AppError, ErrorKind};
use algohub_core::result::AppResult;
use algohub_core::types::{AlgorithmId, FolderId, UserId};
use algohub_entity::folder::Folder;
use algohub_entity::rights::AccessLevel;

use super::{db_error, is_foreign_key_violation};
use crate::store::{FolderDeletion, FolderStore};

/// Advisory lock key held while a folder is placed under a parent.
const FOLDER_MOVE_LOCK: i64 = 0x616c_676f_6d6f_7665;

/// Repository for folder rows.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find folder"))
    }

    async fn find_children(&self, parent_id: FolderId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE parent_id = $1 ORDER BY name ASC")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list child folders"))
    }

    async fn find_many(&self, ids: &[FolderId]) -> AppResult<Vec<Folder>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ANY($1) ORDER BY name ASC")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list folders"))
    }

    async fn create_with_owner(&self, folder: &Folder, owner_id: UserId) -> AppResult<Folder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let created = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, name, parent_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .bind(folder.created_at)
        .bind(folder.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("Parent folder not found")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create folder", e)
            }
        })?;

        sqlx::query(
            "INSERT INTO folder_rights (user_id, resource_id, access_level) VALUES ($1, $2, $3)",
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
                AppError::with_source(ErrorKind::Database, "Failed to record folder owner", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder creation"))?;

        Ok(created)
    }

    async fn update(&self, folder: &Folder) -> AppResult<Folder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if let Some(parent_id) = folder.parent_id {
            // Moves are serialized so each one checks ancestry against the
            // tree left by the previous one.
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(FOLDER_MOVE_LOCK)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to lock folder tree"))?;

            let cyclic: bool = sqlx::query_scalar(
                "WITH RECURSIVE chain(id) AS ( \
                     SELECT $1::uuid \
                     UNION \
                     SELECT f.parent_id FROM folders f JOIN chain c ON f.id = c.id \
                     WHERE f.parent_id IS NOT NULL \
                 ) \
                 SELECT EXISTS (SELECT 1 FROM chain WHERE id = $2)",
            )
            .bind(parent_id)
            .bind(folder.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to check folder ancestry"))?;

            if cyclic {
                return Err(AppError::conflict(format!(
                    "Folder {} cannot be moved into its own subtree",
                    folder.id
                )));
            }
        }

        let updated = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, parent_id = $3, updated_at = $4 \
             WHERE id = $1 RETURNING *",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .bind(folder.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("Destination folder not found")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to update folder", e)
            }
        })?
        .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder update"))?;

        Ok(updated)
    }

    async fn delete_cascade(&self, id: FolderId) -> AppResult<Option<FolderDeletion>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // UNION (not UNION ALL) terminates even on a corrupted cyclic chain.
        let folders: Vec<Uuid> = sqlx::query_scalar(
            "WITH RECURSIVE subtree(id) AS ( \
                SELECT id FROM folders WHERE id = $1 \
                UNION \
                SELECT f.id FROM folders f INNER JOIN subtree s ON f.parent_id = s.id \
             ) SELECT id FROM subtree",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to collect folder subtree"))?;

        if folders.is_empty() {
            return Ok(None);
        }

        let algorithms: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM algorithms WHERE folder_id = ANY($1)")
                .bind(&folders)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_error("Failed to collect subtree algorithms"))?;

        let algorithm_rights = sqlx::query("DELETE FROM algorithm_rights WHERE resource_id = ANY($1)")
            .bind(&algorithms)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete algorithm rights"))?
            .rows_affected();

        sqlx::query("DELETE FROM algorithms WHERE id = ANY($1)")
            .bind(&algorithms)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete subtree algorithms"))?;

        let folder_rights = sqlx::query("DELETE FROM folder_rights WHERE resource_id = ANY($1)")
            .bind(&folders)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete folder rights"))?
            .rows_affected();

        sqlx::query("DELETE FROM folders WHERE id = ANY($1)")
            .bind(&folders)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete folders"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder deletion"))?;

        debug!(
            folder_id = %id,
            folders = folders.len(),
            algorithms = algorithms.len(),
            "Folder subtree deleted"
        );

        Ok(Some(FolderDeletion {
            folders: folders.into_iter().map(FolderId::from_uuid).collect(),
            algorithms: algorithms.into_iter().map(AlgorithmId::from_uuid).collect(),
            rights_removed: algorithm_rights + folder_rights,
        }))
    }
}
