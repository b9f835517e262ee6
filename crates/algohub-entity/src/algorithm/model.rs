//! Algorithm entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use algohub_core::types::{AlgorithmId, FolderId};

/// An algorithm document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Algorithm {
    /// Unique algorithm identifier.
    pub id: AlgorithmId,
    /// Display name.
    pub name: String,
    /// Containing folder (None when filed at the root scope).
    pub folder_id: Option<FolderId>,
    /// The validated, normalized source document.
    pub source_code: serde_json::Value,
    /// When the algorithm was created.
    pub created_at: DateTime<Utc>,
    /// When the name, placement, or content last changed.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new algorithm.
///
/// `source_code` must already be validated and normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlgorithm {
    /// Display name.
    pub name: String,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// Normalized source document.
    pub source_code: serde_json::Value,
}

impl CreateAlgorithm {
    /// Build the row for this request with fresh timestamps.
    pub fn into_algorithm(self) -> Algorithm {
        let now = Utc::now();
        Algorithm {
            id: AlgorithmId::new(),
            name: self.name,
            folder_id: self.folder_id,
            source_code: self.source_code,
            created_at: now,
            updated_at: now,
        }
    }
}
