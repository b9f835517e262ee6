//! Rights repository: `folder_rights` and `algorithm_rights`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use algohub_core::error::{AppError, ErrorKind};
use algohub_core::result::AppResult;
use algohub_core::types::UserId;
use algohub_entity::rights::{AccessLevel, ResourceKind, ResourceRef, RightsEntry};

use super::{db_error, is_foreign_key_violation};
use crate::store::RightsStore;

/// Folder and algorithm grants live in separate tables with the same shape.
pub(crate) fn rights_table(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Folder => "folder_rights",
        ResourceKind::Algorithm => "algorithm_rights",
    }
}

#[derive(Debug, FromRow)]
struct RightsRow {
    user_id: UserId,
    resource_id: Uuid,
    access_level: AccessLevel,
    granted_at: DateTime<Utc>,
}

impl RightsRow {
    fn into_entry(self, kind: ResourceKind) -> RightsEntry {
        RightsEntry {
            user_id: self.user_id,
            resource: ResourceRef::from_parts(kind, self.resource_id),
            level: self.access_level,
            granted_at: self.granted_at,
        }
    }
}

/// Repository for rights entries.
#[derive(Debug, Clone)]
pub struct RightsRepository {
    pool: PgPool,
}

impl RightsRepository {
    /// Create a new rights repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RightsStore for RightsRepository {
    async fn find_level(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<AccessLevel>> {
        let sql = format!(
            "SELECT access_level FROM {} WHERE user_id = $1 AND resource_id = $2",
            rights_table(resource.kind())
        );
        sqlx::query_scalar::<_, AccessLevel>(&sql)
            .bind(user_id)
            .bind(resource.uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to look up rights entry"))
    }

    async fn grant(&self, entry: &RightsEntry) -> AppResult<RightsEntry> {
        let kind = entry.resource.kind();
        let sql = format!(
            "INSERT INTO {} (user_id, resource_id, access_level, granted_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, resource_id) \
             DO UPDATE SET access_level = EXCLUDED.access_level, granted_at = EXCLUDED.granted_at \
             RETURNING user_id, resource_id, access_level, granted_at",
            rights_table(kind)
        );
        sqlx::query_as::<_, RightsRow>(&sql)
            .bind(entry.user_id)
            .bind(entry.resource.uuid())
            .bind(entry.level)
            .bind(entry.granted_at)
            .fetch_one(&self.pool)
            .await
            .map(|row| row.into_entry(kind))
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::not_found(format!("User or {} not found", entry.resource))
                } else {
                    AppError::with_source(ErrorKind::Database, "Failed to grant rights", e)
                }
            })
    }

    async fn revoke(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND resource_id = $2",
            rights_table(resource.kind())
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(resource.uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to revoke rights"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_resource(&self, resource: ResourceRef) -> AppResult<Vec<RightsEntry>> {
        let kind = resource.kind();
        let sql = format!(
            "SELECT user_id, resource_id, access_level, granted_at FROM {} \
             WHERE resource_id = $1 ORDER BY granted_at ASC",
            rights_table(kind)
        );
        let rows = sqlx::query_as::<_, RightsRow>(&sql)
            .bind(resource.uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list rights for resource"))?;
        Ok(rows.into_iter().map(|r| r.into_entry(kind)).collect())
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<RightsEntry>> {
        let mut entries = Vec::new();
        for kind in [ResourceKind::Folder, ResourceKind::Algorithm] {
            let sql = format!(
                "SELECT user_id, resource_id, access_level, granted_at FROM {} \
                 WHERE user_id = $1 ORDER BY granted_at ASC",
                rights_table(kind)
            );
            let rows = sqlx::query_as::<_, RightsRow>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to list rights for user"))?;
            entries.extend(rows.into_iter().map(|r| r.into_entry(kind)));
        }
        Ok(entries)
    }

    async fn delete_by_resource(&self, resource: ResourceRef) -> AppResult<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE resource_id = $1",
            rights_table(resource.kind())
        );
        let result = sqlx::query(&sql)
            .bind(resource.uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete rights for resource"))?;
        Ok(result.rows_affected())
    }
}
