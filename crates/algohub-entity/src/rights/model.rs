//! Rights entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use algohub_core::types::{AlgorithmId, FolderId, UserId};

use super::level::AccessLevel;

/// The two kinds of resource rights can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A folder.
    Folder,
    /// An algorithm document.
    Algorithm,
}

impl ResourceKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Algorithm => "algorithm",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = algohub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" => Ok(Self::Folder),
            "algorithm" | "algo" => Ok(Self::Algorithm),
            _ => Err(algohub_core::AppError::validation(format!(
                "Invalid resource kind: '{s}'"
            ))),
        }
    }
}

/// A typed reference to a folder or an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ResourceRef {
    /// A folder.
    Folder(FolderId),
    /// An algorithm.
    Algorithm(AlgorithmId),
}

impl ResourceRef {
    /// Build a reference from a kind and a raw id.
    pub fn from_parts(kind: ResourceKind, id: Uuid) -> Self {
        match kind {
            ResourceKind::Folder => Self::Folder(FolderId::from_uuid(id)),
            ResourceKind::Algorithm => Self::Algorithm(AlgorithmId::from_uuid(id)),
        }
    }

    /// The kind of resource referenced.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Folder(_) => ResourceKind::Folder,
            Self::Algorithm(_) => ResourceKind::Algorithm,
        }
    }

    /// The raw id of the referenced resource.
    pub fn uuid(&self) -> Uuid {
        match self {
            Self::Folder(id) => id.into_uuid(),
            Self::Algorithm(id) => id.into_uuid(),
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.uuid())
    }
}

/// A persisted (user, resource, level) grant.
///
/// `(user_id, resource)` is the natural key: at most one entry exists per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RightsEntry {
    /// The user holding the grant.
    pub user_id: UserId,
    /// The resource the grant applies to.
    pub resource: ResourceRef,
    /// The granted level.
    pub level: AccessLevel,
    /// When the grant was recorded.
    pub granted_at: DateTime<Utc>,
}

impl RightsEntry {
    /// Build a new entry stamped with the current time.
    pub fn new(user_id: UserId, resource: ResourceRef, level: AccessLevel) -> Self {
        Self {
            user_id,
            resource,
            level,
            granted_at: Utc::now(),
        }
    }

    /// The Owner grant recorded when a user creates a resource.
    pub fn owner(user_id: UserId, resource: ResourceRef) -> Self {
        Self::new(user_id, resource, AccessLevel::Owner)
    }
}
