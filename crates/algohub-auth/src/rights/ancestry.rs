//! Bounded walks up the folder forest.
//!
//! Every walk visits at most `max_depth` folders. A longer chain (deep
//! nesting or a corrupted cycle) is reported as an internal error.

use tracing::debug;

use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::types::FolderId;

use super::resolver::RightsResolver;

impl RightsResolver {
    /// The chain from `folder_id` (first) up to its root (last).
    pub async fn folder_ancestry(&self, folder_id: FolderId) -> AppResult<Vec<FolderId>> {
        let mut chain = Vec::new();
        let mut current = Some(folder_id);

        while let Some(folder) = current {
            if chain.len() >= self.max_depth {
                return Err(self.depth_exceeded(folder_id));
            }
            chain.push(folder);
            current = self.tree.folder_parent(folder).await?;
        }

        Ok(chain)
    }

    /// Number of folders from `folder_id` up to its root, both included.
    pub async fn folder_depth(&self, folder_id: FolderId) -> AppResult<usize> {
        Ok(self.folder_ancestry(folder_id).await?.len())
    }

    /// Rejects placing `folder_id` under `new_parent` when that would make
    /// the folder its own ancestor.
    pub async fn ensure_not_ancestor(
        &self,
        folder_id: FolderId,
        new_parent: Option<FolderId>,
    ) -> AppResult<()> {
        let Some(parent) = new_parent else {
            return Ok(());
        };

        let chain = self.folder_ancestry(parent).await?;
        if chain.contains(&folder_id) {
            debug!(folder_id = %folder_id, new_parent = %parent, "Rejected cyclic move");
            return Err(AppError::conflict(format!(
                "Folder {folder_id} cannot be moved into its own subtree"
            )));
        }
        Ok(())
    }
}
