//! PostgreSQL implementations of the store traits.

pub mod algorithm;
pub mod folder;
pub mod rights;
pub mod tree;
pub mod user;

pub use algorithm::AlgorithmRepository;
pub use folder::FolderRepository;
pub use rights::RightsRepository;
pub use tree::TreeRepository;
pub use user::UserRepository;

use algohub_core::error::{AppError, ErrorKind};

/// Map a sqlx error to a database `AppError`, keeping the cause.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Whether a sqlx error is a foreign key violation (SQLSTATE 23503).
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503"))
}
