//! Access level enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability a user holds on a folder or algorithm.
///
/// Variants are declared weakest first so the derived `Ord` gives
/// `Owner > ReadWrite > ReadOnly`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "access_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Can read the resource.
    ReadOnly,
    /// Can read, rename, move, update content, and add children.
    ReadWrite,
    /// Full control, including deletion.
    Owner,
}

impl AccessLevel {
    /// Check if this level grants at least the given level.
    pub fn has_at_least(&self, required: AccessLevel) -> bool {
        *self >= required
    }

    /// Check if this level allows mutation and adding children.
    pub fn can_write(&self) -> bool {
        self.has_at_least(Self::ReadWrite)
    }

    /// Only owners may delete.
    pub fn can_delete(&self) -> bool {
        matches!(self, Self::Owner)
    }

    /// Return the level as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::ReadWrite => "read_write",
            Self::ReadOnly => "read_only",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = algohub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "owner" => Ok(Self::Owner),
            "read_write" | "rw" => Ok(Self::ReadWrite),
            "read_only" | "ro" => Ok(Self::ReadOnly),
            _ => Err(algohub_core::AppError::validation(format!(
                "Invalid access level: '{s}'. Expected one of: owner, read_write, read_only"
            ))),
        }
    }
}
