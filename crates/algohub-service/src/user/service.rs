//! Self-service account operations.

use std::sync::Arc;

use tracing::info;

use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::types::UserId;
use algohub_database::store::UserStore;
use algohub_entity::user::User;

use crate::context::RequestContext;
use crate::failure::infrastructure;

/// Account lookups and deletion for the authenticated caller.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User rows.
    users: Arc<dyn UserStore>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Gets an account. Callers only see their own.
    pub async fn get(&self, ctx: &RequestContext, user_id: UserId) -> AppResult<User> {
        if ctx.user_id != user_id {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        self.users
            .find_by_id(user_id)
            .await
            .map_err(infrastructure("Failed to load user"))?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Deletes the caller's account together with every grant it holds.
    pub async fn delete_account(&self, ctx: &RequestContext) -> AppResult<()> {
        let existed = self
            .users
            .delete_with_rights(ctx.user_id)
            .await
            .map_err(infrastructure("Failed to delete account"))?;
        if !existed {
            return Err(AppError::not_found(format!("User {} not found", ctx.user_id)));
        }

        info!(user_id = %ctx.user_id, "Account deleted");
        Ok(())
    }
}
