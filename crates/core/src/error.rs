//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// A single violated field, reported back to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation. Never constructed empty.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. duplicate identifier).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    /// Single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Turn a collected error list into `Ok(())` or a `Validation` error.
    pub fn check_fields(errors: Vec<FieldError>) -> DomainResult<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(errors))
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_field() {
        let err = DomainError::Validation(vec![
            FieldError::new("name", "is required"),
            FieldError::new("price", "must not be negative"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: name: is required; price: must not be negative"
        );
    }

    #[test]
    fn check_fields_passes_on_empty_list() {
        assert!(DomainError::check_fields(vec![]).is_ok());

        let err = DomainError::check_fields(vec![FieldError::new("id", "is required")]).unwrap_err();
        assert_eq!(err, DomainError::validation("id", "is required"));
    }

    #[test]
    fn field_error_serializes_as_flat_object() {
        let json = serde_json::to_value(FieldError::new("images", "must not be empty")).unwrap();
        assert_eq!(json, serde_json::json!({"field": "images", "message": "must not be empty"}));
    }
}
