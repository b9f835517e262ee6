//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use algohub_core::types::FolderId;

/// A folder in the organizing forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root folders).
    pub parent_id: Option<FolderId>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last renamed or moved.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Parent folder (None for a root).
    pub parent_id: Option<FolderId>,
}

impl CreateFolder {
    /// Build the row for this request with fresh timestamps.
    pub fn into_folder(self) -> Folder {
        let now = Utc::now();
        Folder {
            id: FolderId::new(),
            name: self.name,
            parent_id: self.parent_id,
            created_at: now,
            updated_at: now,
        }
    }
}
