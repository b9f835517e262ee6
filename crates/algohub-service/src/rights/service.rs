//! Direct grant management for operators.
//!
//! These calls are not gated by the caller's own rights; they back the
//! admin CLI, not end-user sharing.

use std::sync::Arc;

use tracing::{info, warn};

use algohub_auth::{ResolvedRights, RightsResolver};
use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::types::UserId;
use algohub_database::store::{RightsStore, UserStore};
use algohub_entity::rights::{AccessLevel, ResourceRef, RightsEntry};

use crate::failure::infrastructure;

/// Grants, revokes, and inspects rights entries.
#[derive(Debug, Clone)]
pub struct RightsAdminService {
    /// Grant storage.
    rights: Arc<dyn RightsStore>,
    /// User rows, to reject grants to unknown accounts.
    users: Arc<dyn UserStore>,
    /// Rights resolver.
    resolver: Arc<RightsResolver>,
}

impl RightsAdminService {
    /// Creates a new rights admin service.
    pub fn new(
        rights: Arc<dyn RightsStore>,
        users: Arc<dyn UserStore>,
        resolver: Arc<RightsResolver>,
    ) -> Self {
        Self {
            rights,
            users,
            resolver,
        }
    }

    /// Records `level` for the user on the resource, replacing any previous grant.
    pub async fn grant(
        &self,
        user_id: UserId,
        resource: ResourceRef,
        level: AccessLevel,
    ) -> AppResult<RightsEntry> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(infrastructure("Failed to load user"))?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        let entry = self
            .rights
            .grant(&RightsEntry::new(user_id, resource, level))
            .await
            .map_err(infrastructure("Failed to record grant"))?;

        info!(
            user_id = %user_id,
            resource = %resource,
            level = %level,
            "Rights granted"
        );
        Ok(entry)
    }

    /// Removes the user's direct grant on the resource.
    pub async fn revoke(&self, user_id: UserId, resource: ResourceRef) -> AppResult<()> {
        let entries = self.list(resource).await?;
        let Some(entry) = entries.iter().find(|e| e.user_id == user_id) else {
            return Err(AppError::not_found(format!(
                "User {user_id} holds no grant on {resource}"
            )));
        };

        if entry.level == AccessLevel::Owner
            && !entries
                .iter()
                .any(|e| e.user_id != user_id && e.level == AccessLevel::Owner)
        {
            warn!(
                user_id = %user_id,
                resource = %resource,
                "Revoking the last owner grant"
            );
        }

        let removed = self
            .rights
            .revoke(user_id, resource)
            .await
            .map_err(infrastructure("Failed to revoke grant"))?;
        if !removed {
            return Err(AppError::not_found(format!(
                "User {user_id} holds no grant on {resource}"
            )));
        }

        info!(user_id = %user_id, resource = %resource, "Rights revoked");
        Ok(())
    }

    /// Every direct grant on a resource.
    pub async fn list(&self, resource: ResourceRef) -> AppResult<Vec<RightsEntry>> {
        self.rights
            .find_by_resource(resource)
            .await
            .map_err(infrastructure("Failed to list grants"))
    }

    /// The user's effective level on a resource, inheritance included.
    pub async fn resolve(&self, user_id: UserId, resource: ResourceRef) -> AppResult<ResolvedRights> {
        self.resolver
            .explain(user_id, resource)
            .await
            .map_err(infrastructure("Failed to resolve rights"))
    }
}
