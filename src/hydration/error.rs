//! Hydration error types

use serde_json::Value;
use thiserror::Error;

use crate::metadata::MetadataError;
use crate::model::ConstructError;
use crate::validation::ValidationError;

/// A raw value that could not be converted to the field's declared type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot cast {field} to {expected}: {reason}")]
pub struct CastError {
    pub field: String,
    pub expected: String,
    pub value: Value,
    pub reason: String,
}

impl CastError {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        value: &Value,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            value: value.clone(),
            reason: reason.into(),
        }
    }
}

/// Errors resolving input keys
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Missing required key '{key}' for field {field}")]
    MissingKey { field: String, key: String },
}

/// What went wrong for a single field
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error(transparent)]
    Missing(#[from] MappingError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Construct(#[from] ConstructError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// A field error together with the path of the field in the input
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}: {error}")]
pub struct FieldFailure {
    /// Dotted path, e.g. `address.city` or `tags[2]`
    pub path: String,
    pub error: FieldError,
}

impl FieldFailure {
    pub fn new(path: impl Into<String>, error: impl Into<FieldError>) -> Self {
        Self {
            path: path.into(),
            error: error.into(),
        }
    }
}

/// Every field failure of one hydration call
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to hydrate {type_id}: {}", summary(.failures))]
pub struct HydrationError {
    pub type_id: String,
    pub failures: Vec<FieldFailure>,
}

fn summary(failures: &[FieldFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl HydrationError {
    pub fn new(type_id: impl Into<String>, failures: Vec<FieldFailure>) -> Self {
        Self {
            type_id: type_id.into(),
            failures,
        }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Paths of the failed fields, in the order they failed
    pub fn paths(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn failure(&self, path: &str) -> Option<&FieldFailure> {
        self.failures.iter().find(|f| f.path == path)
    }

    /// Validation errors among the failures
    pub fn validation_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.failures.iter().filter_map(|f| match &f.error {
            FieldError::Validation(e) => Some(e),
            _ => None,
        })
    }
}

/// Errors turning an [`Input`](super::Input) into a map
#[derive(Error, Debug)]
pub enum InputError {
    #[error("No input adapter accepts {0} input")]
    Unsupported(&'static str),

    #[error("Input must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "yaml")]
    #[error("Invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hydration_error_lists_every_failure() {
        let error = HydrationError::new(
            "User",
            vec![
                FieldFailure::new(
                    "email",
                    MappingError::MissingKey {
                        field: "email".to_string(),
                        key: "email_address".to_string(),
                    },
                ),
                FieldFailure::new(
                    "address.zip",
                    CastError::new("zip", "int", &json!("abc"), "not a number"),
                ),
            ],
        );
        assert_eq!(error.len(), 2);
        assert_eq!(error.paths(), vec!["email", "address.zip"]);
        assert_eq!(
            error.to_string(),
            "Failed to hydrate User: email: Missing required key 'email_address' for field email; \
             address.zip: Cannot cast zip to int: not a number"
        );
        assert!(matches!(
            error.failure("address.zip").map(|f| &f.error),
            Some(FieldError::Cast(_))
        ));
    }
}
