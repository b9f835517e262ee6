//! Convenience result type alias for AlgoHub.

use crate::error::AppError;

/// A specialized `Result` type for AlgoHub operations.
pub type AppResult<T> = Result<T, AppError>;
