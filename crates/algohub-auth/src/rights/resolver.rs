//! Effective access level resolution.
//!
//! Rules:
//! - A folder's effective level is the best direct grant found on the folder
//!   or any of its ancestors. `Owner` found anywhere ends the walk.
//! - An algorithm's effective level is the best of its direct grant and the
//!   effective level of its containing folder. A direct `Owner` ends the
//!   lookup before the folder is consulted.
//! - Nothing is cached: every call re-reads the stores.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::types::{AlgorithmId, FolderId, UserId};
use algohub_database::store::{RightsStore, TreeStore};
use algohub_entity::rights::{AccessLevel, ResourceRef};

/// Outcome of a resolution, as reported to operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRights {
    /// The user whose rights were resolved.
    pub user_id: UserId,
    /// The resource resolved against.
    pub resource: ResourceRef,
    /// The effective level, `None` when the user has no access.
    pub level: Option<AccessLevel>,
}

/// Computes effective access levels from the rights and tree stores.
#[derive(Debug, Clone)]
pub struct RightsResolver {
    /// Direct grant lookups.
    pub(crate) rights: Arc<dyn RightsStore>,
    /// Parent-pointer lookups.
    pub(crate) tree: Arc<dyn TreeStore>,
    /// Longest folder chain (root included) a walk may visit.
    pub(crate) max_depth: usize,
}

impl RightsResolver {
    /// Creates a new resolver bounded to `max_depth` folders per walk.
    pub fn new(rights: Arc<dyn RightsStore>, tree: Arc<dyn TreeStore>, max_depth: usize) -> Self {
        Self {
            rights,
            tree,
            max_depth,
        }
    }

    /// The traversal bound in folders.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolves the effective level of a user on a folder.
    ///
    /// `None` as the folder means the root scope, which carries no rights.
    pub async fn resolve_folder_rights(
        &self,
        user_id: UserId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Option<AccessLevel>> {
        let Some(start) = folder_id else {
            return Ok(None);
        };

        let mut best: Option<AccessLevel> = None;
        let mut current = Some(start);
        let mut visited = 0usize;

        while let Some(folder) = current {
            if visited >= self.max_depth {
                return Err(self.depth_exceeded(start));
            }
            visited += 1;

            match self
                .rights
                .find_level(user_id, ResourceRef::Folder(folder))
                .await?
            {
                Some(AccessLevel::Owner) => {
                    debug!(
                        user_id = %user_id,
                        folder_id = %start,
                        owner_at = %folder,
                        "Resolved folder rights: owner"
                    );
                    return Ok(Some(AccessLevel::Owner));
                }
                Some(level) => best = best.max(Some(level)),
                None => {}
            }

            current = self.tree.folder_parent(folder).await?;
        }

        debug!(
            user_id = %user_id,
            folder_id = %start,
            levels = visited,
            level = ?best,
            "Resolved folder rights"
        );
        Ok(best)
    }

    /// Resolves the effective level of a user on an algorithm.
    pub async fn resolve_algo_rights(
        &self,
        user_id: UserId,
        algorithm_id: AlgorithmId,
    ) -> AppResult<Option<AccessLevel>> {
        let direct = self
            .rights
            .find_level(user_id, ResourceRef::Algorithm(algorithm_id))
            .await?;

        if direct == Some(AccessLevel::Owner) {
            return Ok(direct);
        }

        let folder_id = self.tree.algorithm_folder(algorithm_id).await?;
        let inherited = self.resolve_folder_rights(user_id, folder_id).await?;
        let level = direct.max(inherited);

        debug!(
            user_id = %user_id,
            algorithm_id = %algorithm_id,
            direct = ?direct,
            inherited = ?inherited,
            "Resolved algorithm rights"
        );
        Ok(level)
    }

    /// Resolves the effective level on either kind of resource.
    pub async fn resolve(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<AccessLevel>> {
        match resource {
            ResourceRef::Folder(id) => self.resolve_folder_rights(user_id, Some(id)).await,
            ResourceRef::Algorithm(id) => self.resolve_algo_rights(user_id, id).await,
        }
    }

    /// Resolves and packages the result for reporting.
    pub async fn explain(&self, user_id: UserId, resource: ResourceRef) -> AppResult<ResolvedRights> {
        let level = self.resolve(user_id, resource).await?;
        Ok(ResolvedRights {
            user_id,
            resource,
            level,
        })
    }

    pub(crate) fn depth_exceeded(&self, start: FolderId) -> AppError {
        AppError::internal(format!(
            "Folder ancestry of {start} exceeds {} levels",
            self.max_depth
        ))
    }
}
