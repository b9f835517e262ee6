//! Conversion of `validator` results into field issues.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use algohub_core::error::{AppError, FieldIssue};

/// Flattens field errors into issues rooted at `prefix`, sorted by path.
///
/// An empty prefix yields bare field names.
pub fn field_issues(prefix: &str, errors: &ValidationErrors) -> Vec<FieldIssue> {
    let mut issues: Vec<FieldIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{prefix}.{field}")
            };
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code));
                FieldIssue::new(path.clone(), e.code.to_string(), message)
            })
        })
        .collect();
    issues.sort_by(|a, b| a.path.cmp(&b.path));
    issues
}

/// Runs derived validation on a request.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|errors| AppError::invalid("Invalid request", field_issues("", &errors)))
}

/// Rejects names made only of whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")))
    } else {
        Ok(())
    }
}

/// Deserializes a field that is present, `null` included, as `Some`.
///
/// Paired with `#[serde(default)]` so that an absent field stays `None`
/// while an explicit `null` in an `Option<Option<T>>` becomes `Some(None)`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, max = 8), custom(function = "not_blank"))]
        name: String,
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = validate_request(&Named { name: "   ".into() }).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "name");
        assert_eq!(err.issues[0].code, "blank");
    }

    #[test]
    fn test_valid_name_accepted() {
        assert!(validate_request(&Named { name: "ok".into() }).is_ok());
    }

    #[test]
    fn test_explicit_null_parent_moves_to_root() {
        let to_root: crate::folder::UpdateFolderRequest =
            serde_json::from_value(serde_json::json!({ "parent_id": null })).unwrap();
        assert_eq!(to_root.parent_id, Some(None));

        let untouched: crate::folder::UpdateFolderRequest =
            serde_json::from_value(serde_json::json!({ "name": "x" })).unwrap();
        assert_eq!(untouched.parent_id, None);
    }

    #[test]
    fn test_explicit_null_folder_moves_algorithm_to_root() {
        let to_root: crate::algorithm::UpdateAlgorithmRequest =
            serde_json::from_value(serde_json::json!({ "folder_id": null })).unwrap();
        assert_eq!(to_root.folder_id, Some(None));

        let folder = algohub_core::types::FolderId::new();
        let moved: crate::algorithm::UpdateAlgorithmRequest =
            serde_json::from_value(serde_json::json!({ "folder_id": folder })).unwrap();
        assert_eq!(moved.folder_id, Some(Some(folder)));

        let untouched: crate::algorithm::UpdateAlgorithmRequest =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(untouched.folder_id, None);
    }
}
