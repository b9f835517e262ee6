//! Mapping of collaborator failures into caller-facing errors.

use tracing::error;

use algohub_core::error::{AppError, ErrorKind};

/// Passes client errors through untouched. Anything else is logged with
/// `context` and surfaced as `Internal`, keeping the original as source.
pub fn infrastructure(context: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |err| {
        if err.is_client_error() {
            return err;
        }
        error!(error = %err, kind = %err.kind, "{context}");
        if err.kind == ErrorKind::Internal {
            err
        } else {
            AppError::internal_from(context, err)
        }
    }
}
