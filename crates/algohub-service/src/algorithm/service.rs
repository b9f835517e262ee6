//! Algorithm CRUD operations gated by resolved rights, with the blob mirror
//! kept in step after each committed write.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use validator::Validate;

use algohub_auth::RightsResolver;
use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::traits::BlobStore;
use algohub_core::types::{AlgorithmId, FolderId, UserId};
use algohub_database::store::{AlgorithmStore, FolderStore};
use algohub_entity::algorithm::{Algorithm, CreateAlgorithm};
use algohub_entity::rights::AccessLevel;

use super::validation::ContentValidator;
use crate::context::RequestContext;
use crate::failure::infrastructure;
use crate::validation::{not_blank, present, validate_request};

/// Manages algorithm CRUD operations.
#[derive(Debug, Clone)]
pub struct AlgorithmService {
    /// Algorithm rows.
    algorithms: Arc<dyn AlgorithmStore>,
    /// Folder rows, for destination checks.
    folders: Arc<dyn FolderStore>,
    /// Blob mirror of source documents.
    blobs: Arc<dyn BlobStore>,
    /// Rights resolver.
    resolver: Arc<RightsResolver>,
    /// Source document validator.
    validator: ContentValidator,
}

/// Request to create a new algorithm.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAlgorithmRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: String,
    /// Containing folder (None for the root scope).
    pub folder_id: Option<FolderId>,
    /// The user who will own the algorithm. Must be the caller.
    pub owner_id: UserId,
    /// Raw source document, validated before anything is written.
    pub source_code: serde_json::Value,
}

/// Request to rename, move, or replace the content of an algorithm.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAlgorithmRequest {
    /// New name.
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: Option<String>,
    /// New containing folder: `Some(None)` moves to the root scope.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_id: Option<Option<FolderId>>,
    /// Replacement source document.
    pub source_code: Option<serde_json::Value>,
}

impl AlgorithmService {
    /// Creates a new algorithm service.
    pub fn new(
        algorithms: Arc<dyn AlgorithmStore>,
        folders: Arc<dyn FolderStore>,
        blobs: Arc<dyn BlobStore>,
        resolver: Arc<RightsResolver>,
        validator: ContentValidator,
    ) -> Self {
        Self {
            algorithms,
            folders,
            blobs,
            resolver,
            validator,
        }
    }

    /// Creates an algorithm owned by the caller and mirrors its document.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateAlgorithmRequest,
    ) -> AppResult<Algorithm> {
        if ctx.user_id != req.owner_id {
            return Err(AppError::forbidden(
                "Algorithms can only be created on behalf of the caller",
            ));
        }
        validate_request(&req)?;

        if let Some(folder_id) = req.folder_id {
            self.require_folder_write(ctx, folder_id).await?;
        }

        let source_code = self.normalize(&req.source_code)?;

        let algorithm = CreateAlgorithm {
            name: req.name.trim().to_string(),
            folder_id: req.folder_id,
            source_code,
        }
        .into_algorithm();

        let algorithm = self
            .algorithms
            .create_with_owner(&algorithm, req.owner_id)
            .await
            .map_err(infrastructure("Failed to create algorithm"))?;

        info!(
            user_id = %ctx.user_id,
            algorithm_id = %algorithm.id,
            folder_id = ?algorithm.folder_id,
            "Algorithm created"
        );

        self.mirror(&algorithm).await?;
        Ok(algorithm)
    }

    /// Gets an algorithm the caller can see.
    pub async fn get(&self, ctx: &RequestContext, algorithm_id: AlgorithmId) -> AppResult<Algorithm> {
        if self.resolve(ctx, algorithm_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Algorithm {algorithm_id} not found"
            )));
        }
        self.load(algorithm_id).await
    }

    /// Renames, moves, or replaces the content of an algorithm.
    ///
    /// New content is validated before any write; on failure nothing changes.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        algorithm_id: AlgorithmId,
        req: UpdateAlgorithmRequest,
    ) -> AppResult<Algorithm> {
        validate_request(&req)?;

        let mut algorithm = self.load(algorithm_id).await?;
        match self.resolve(ctx, algorithm_id).await? {
            Some(level) if level.can_write() => {}
            _ => {
                return Err(AppError::forbidden(format!(
                    "Insufficient rights to modify algorithm {algorithm_id}"
                )));
            }
        }

        let content_changed = req.source_code.is_some();
        if let Some(document) = &req.source_code {
            algorithm.source_code = self.normalize(document)?;
        }

        if let Some(name) = req.name {
            algorithm.name = name.trim().to_string();
        }

        if let Some(destination) = req.folder_id {
            if destination != algorithm.folder_id {
                if let Some(folder_id) = destination {
                    self.require_folder_write(ctx, folder_id).await?;
                }
                algorithm.folder_id = destination;
            }
        }

        algorithm.updated_at = Utc::now();
        let algorithm = self
            .algorithms
            .update(&algorithm)
            .await
            .map_err(infrastructure("Failed to update algorithm"))?;

        info!(
            user_id = %ctx.user_id,
            algorithm_id = %algorithm.id,
            content_changed,
            "Algorithm updated"
        );

        if content_changed {
            self.mirror(&algorithm).await?;
        }
        Ok(algorithm)
    }

    /// Deletes an algorithm and every grant on it. Only an owner may delete.
    pub async fn delete(&self, ctx: &RequestContext, algorithm_id: AlgorithmId) -> AppResult<()> {
        self.load(algorithm_id).await?;

        if self.resolve(ctx, algorithm_id).await? != Some(AccessLevel::Owner) {
            return Err(AppError::forbidden(format!(
                "Only an owner may delete algorithm {algorithm_id}"
            )));
        }

        let existed = self
            .algorithms
            .delete_with_rights(algorithm_id)
            .await
            .map_err(infrastructure("Failed to delete algorithm"))?;
        if !existed {
            return Err(AppError::not_found(format!(
                "Algorithm {algorithm_id} not found"
            )));
        }

        if let Err(e) = self.blobs.delete(algorithm_id).await {
            warn!(
                algorithm_id = %algorithm_id,
                error = %e,
                "Failed to remove mirrored document after delete"
            );
        }

        info!(
            user_id = %ctx.user_id,
            algorithm_id = %algorithm_id,
            "Algorithm deleted"
        );

        Ok(())
    }

    /// Validates a raw document and returns its normalized form.
    pub fn normalize(&self, document: &serde_json::Value) -> AppResult<serde_json::Value> {
        self.validator
            .validate(document)
            .map(|code| code.to_value())
            .map_err(|issues| AppError::invalid("Invalid source code", issues))
    }

    /// Writes the committed document to the blob mirror.
    async fn mirror(&self, algorithm: &Algorithm) -> AppResult<()> {
        let data = serde_json::to_vec(&algorithm.source_code)?;
        self.blobs
            .put(algorithm.id, Bytes::from(data))
            .await
            .map_err(|e| {
                error!(
                    algorithm_id = %algorithm.id,
                    provider = self.blobs.provider_type(),
                    error = %e,
                    "Failed to mirror algorithm document after commit"
                );
                AppError::internal_from(
                    format!("Algorithm {} saved but its document was not mirrored", algorithm.id),
                    e,
                )
            })
    }

    async fn load(&self, algorithm_id: AlgorithmId) -> AppResult<Algorithm> {
        self.algorithms
            .find_by_id(algorithm_id)
            .await
            .map_err(infrastructure("Failed to load algorithm"))?
            .ok_or_else(|| AppError::not_found(format!("Algorithm {algorithm_id} not found")))
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        algorithm_id: AlgorithmId,
    ) -> AppResult<Option<AccessLevel>> {
        self.resolver
            .resolve_algo_rights(ctx.user_id, algorithm_id)
            .await
            .map_err(infrastructure("Failed to resolve algorithm rights"))
    }

    async fn require_folder_write(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<()> {
        self.folders
            .find_by_id(folder_id)
            .await
            .map_err(infrastructure("Failed to load folder"))?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let level = self
            .resolver
            .resolve_folder_rights(ctx.user_id, Some(folder_id))
            .await
            .map_err(infrastructure("Failed to resolve folder rights"))?;
        match level {
            Some(level) if level.can_write() => Ok(()),
            _ => Err(AppError::forbidden(format!(
                "Insufficient rights to file algorithms in folder {folder_id}"
            ))),
        }
    }
}
