//! Folder CRUD operations gated by resolved rights.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use algohub_auth::RightsResolver;
use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::traits::BlobStore;
use algohub_core::types::{AlgorithmId, FolderId, UserId};
use algohub_database::store::{AlgorithmStore, FolderDeletion, FolderStore, RightsStore};
use algohub_entity::algorithm::Algorithm;
use algohub_entity::folder::{CreateFolder, Folder};
use algohub_entity::rights::{AccessLevel, ResourceKind};

use crate::context::RequestContext;
use crate::failure::infrastructure;
use crate::validation::{not_blank, present, validate_request};

/// Manages folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder rows.
    folders: Arc<dyn FolderStore>,
    /// Algorithm rows, for listing folder contents.
    algorithms: Arc<dyn AlgorithmStore>,
    /// Direct grants, for listing the root scope.
    rights: Arc<dyn RightsStore>,
    /// Blob mirror, cleaned after cascading deletes.
    blobs: Arc<dyn BlobStore>,
    /// Rights resolver.
    resolver: Arc<RightsResolver>,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: String,
    /// Parent folder (None for a root).
    pub parent_id: Option<FolderId>,
    /// The user who will own the folder. Must be the caller.
    pub owner_id: UserId,
}

/// Request to rename and/or move a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    /// New name.
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: Option<String>,
    /// New parent: `Some(None)` moves the folder to the root scope.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<FolderId>>,
}

/// What a folder (or the root scope) holds for the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderContents {
    /// Child folders, ordered by name.
    pub folders: Vec<Folder>,
    /// Algorithms, ordered by name.
    pub algorithms: Vec<Algorithm>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        algorithms: Arc<dyn AlgorithmStore>,
        rights: Arc<dyn RightsStore>,
        blobs: Arc<dyn BlobStore>,
        resolver: Arc<RightsResolver>,
    ) -> Self {
        Self {
            folders,
            algorithms,
            rights,
            blobs,
            resolver,
        }
    }

    /// Creates a folder owned by the caller.
    pub async fn create(&self, ctx: &RequestContext, req: CreateFolderRequest) -> AppResult<Folder> {
        if ctx.user_id != req.owner_id {
            return Err(AppError::forbidden(
                "Folders can only be created on behalf of the caller",
            ));
        }
        validate_request(&req)?;

        if let Some(parent_id) = req.parent_id {
            self.load(parent_id).await?;
            self.require_write(ctx, parent_id, "add folders to").await?;

            let depth = self
                .resolver
                .folder_depth(parent_id)
                .await
                .map_err(infrastructure("Failed to measure folder depth"))?;
            self.check_depth(depth + 1)?;
        }

        let folder = CreateFolder {
            name: req.name.trim().to_string(),
            parent_id: req.parent_id,
        }
        .into_folder();

        let folder = self
            .folders
            .create_with_owner(&folder, req.owner_id)
            .await
            .map_err(infrastructure("Failed to create folder"))?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            "Folder created"
        );

        Ok(folder)
    }

    /// Gets a folder the caller can see.
    pub async fn get(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        self.require_visible(ctx, folder_id).await?;
        self.load(folder_id).await
    }

    /// Renames and/or moves a folder.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        req: UpdateFolderRequest,
    ) -> AppResult<Folder> {
        validate_request(&req)?;

        let mut folder = self.load(folder_id).await?;
        self.require_write(ctx, folder_id, "modify").await?;

        if let Some(name) = req.name {
            folder.name = name.trim().to_string();
        }

        if let Some(destination) = req.parent_id {
            if destination != folder.parent_id {
                self.check_move(ctx, folder_id, destination).await?;
                folder.parent_id = destination;
            }
        }

        folder.updated_at = Utc::now();
        let folder = self
            .folders
            .update(&folder)
            .await
            .map_err(infrastructure("Failed to update folder"))?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            "Folder updated"
        );

        Ok(folder)
    }

    /// Deletes a folder, its whole subtree, and the algorithms filed in it.
    ///
    /// Only an owner may delete. Mirrored documents of removed algorithms
    /// are cleaned up after the relational delete; cleanup failures are
    /// logged and do not fail the call.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<FolderDeletion> {
        self.load(folder_id).await?;

        let level = self.resolve(ctx, folder_id).await?;
        if level != Some(AccessLevel::Owner) {
            return Err(AppError::forbidden(format!(
                "Only an owner may delete folder {folder_id}"
            )));
        }

        let deletion = self
            .folders
            .delete_cascade(folder_id)
            .await
            .map_err(infrastructure("Failed to delete folder"))?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        for algorithm_id in &deletion.algorithms {
            if let Err(e) = self.blobs.delete(*algorithm_id).await {
                warn!(
                    algorithm_id = %algorithm_id,
                    folder_id = %folder_id,
                    error = %e,
                    "Failed to remove mirrored document after folder delete"
                );
            }
        }

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            folders = deletion.folders.len(),
            algorithms = deletion.algorithms.len(),
            rights_removed = deletion.rights_removed,
            "Folder deleted"
        );

        Ok(deletion)
    }

    /// Lists what the caller can reach in a folder, or at the root scope.
    ///
    /// At the root scope only resources carrying a direct grant for the
    /// caller are listed.
    pub async fn list_contents(
        &self,
        ctx: &RequestContext,
        folder_id: Option<FolderId>,
    ) -> AppResult<FolderContents> {
        match folder_id {
            Some(folder_id) => {
                self.require_visible(ctx, folder_id).await?;
                let folders = self
                    .folders
                    .find_children(folder_id)
                    .await
                    .map_err(infrastructure("Failed to list child folders"))?;
                let algorithms = self
                    .algorithms
                    .find_in_folder(folder_id)
                    .await
                    .map_err(infrastructure("Failed to list folder algorithms"))?;
                Ok(FolderContents {
                    folders,
                    algorithms,
                })
            }
            None => self.list_root_scope(ctx).await,
        }
    }

    async fn list_root_scope(&self, ctx: &RequestContext) -> AppResult<FolderContents> {
        let entries = self
            .rights
            .find_by_user(ctx.user_id)
            .await
            .map_err(infrastructure("Failed to list caller rights"))?;

        let folder_ids: Vec<FolderId> = entries
            .iter()
            .filter(|e| e.resource.kind() == ResourceKind::Folder)
            .map(|e| FolderId::from_uuid(e.resource.uuid()))
            .collect();
        let algorithm_ids: Vec<AlgorithmId> = entries
            .iter()
            .filter(|e| e.resource.kind() == ResourceKind::Algorithm)
            .map(|e| AlgorithmId::from_uuid(e.resource.uuid()))
            .collect();

        let mut folders = self
            .folders
            .find_many(&folder_ids)
            .await
            .map_err(infrastructure("Failed to load folders"))?;
        folders.retain(Folder::is_root);

        let mut algorithms = self
            .algorithms
            .find_many(&algorithm_ids)
            .await
            .map_err(infrastructure("Failed to load algorithms"))?;
        algorithms.retain(|a| a.folder_id.is_none());

        Ok(FolderContents {
            folders,
            algorithms,
        })
    }

    async fn check_move(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        destination: Option<FolderId>,
    ) -> AppResult<()> {
        let Some(parent_id) = destination else {
            return Ok(());
        };

        self.load(parent_id).await?;
        self.require_write(ctx, parent_id, "move folders into").await?;
        self.resolver
            .ensure_not_ancestor(folder_id, destination)
            .await
            .map_err(infrastructure("Failed to check folder ancestry"))?;

        let parent_depth = self
            .resolver
            .folder_depth(parent_id)
            .await
            .map_err(infrastructure("Failed to measure folder depth"))?;
        let height = self.subtree_height(folder_id).await?;
        self.check_depth(parent_depth + height)
    }

    /// Levels in the subtree rooted at `folder_id`, the folder itself being 1.
    async fn subtree_height(&self, folder_id: FolderId) -> AppResult<usize> {
        let max_depth = self.resolver.max_depth();
        let mut level = vec![folder_id];
        let mut height = 0;

        while !level.is_empty() {
            height += 1;
            if height > max_depth {
                return Err(self.depth_error(height));
            }

            let mut next = Vec::new();
            for id in level {
                let children = self
                    .folders
                    .find_children(id)
                    .await
                    .map_err(infrastructure("Failed to list child folders"))?;
                next.extend(children.into_iter().map(|f| f.id));
            }
            level = next;
        }

        Ok(height)
    }

    fn check_depth(&self, depth: usize) -> AppResult<()> {
        if depth > self.resolver.max_depth() {
            Err(self.depth_error(depth))
        } else {
            Ok(())
        }
    }

    fn depth_error(&self, depth: usize) -> AppError {
        AppError::validation(format!(
            "Folder nesting of {depth} levels exceeds the limit of {}",
            self.resolver.max_depth()
        ))
    }

    /// Fresh existence read.
    async fn load(&self, folder_id: FolderId) -> AppResult<Folder> {
        self.folders
            .find_by_id(folder_id)
            .await
            .map_err(infrastructure("Failed to load folder"))?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<Option<AccessLevel>> {
        self.resolver
            .resolve_folder_rights(ctx.user_id, Some(folder_id))
            .await
            .map_err(infrastructure("Failed to resolve folder rights"))
    }

    async fn require_visible(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<()> {
        match self.resolve(ctx, folder_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("Folder {folder_id} not found"))),
        }
    }

    async fn require_write(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        action: &str,
    ) -> AppResult<()> {
        match self.resolve(ctx, folder_id).await? {
            Some(level) if level.can_write() => Ok(()),
            _ => Err(AppError::forbidden(format!(
                "Insufficient rights to {action} folder {folder_id}"
            ))),
        }
    }
}
