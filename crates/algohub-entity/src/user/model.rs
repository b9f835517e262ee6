//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use algohub_core::types::UserId;

/// A registered account.
///
/// Registration, email confirmation, and password handling happen outside
/// this workspace; the core only reads users and deletes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique email address.
    pub email: String,
    /// Password hash produced by the authentication service.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the email address has been confirmed.
    pub is_verified: bool,
    /// When the account was registered.
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Build an unverified account stamped with the current time.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_verified: false,
            registered_at: Utc::now(),
        }
    }
}
