//! Normalization error types

use thiserror::Error;

use crate::metadata::MetadataError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Cannot transform {field}: {reason}")]
    Transform { field: String, reason: String },

    #[error("Computed field {field} of {type_id} collides with a declared field")]
    ComputedCollision { type_id: String, field: String },

    #[error("Computed field {field} of {type_id} is supplied more than once")]
    DuplicateComputed { type_id: String, field: String },

    #[error("Field {field} names unknown transformer '{transformer}'")]
    UnknownTransformer { field: String, transformer: String },

    #[error("{type_id} does not expose a value for declared field {field}")]
    MissingValue { type_id: String, field: String },

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl NormalizeError {
    pub fn transform(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NormalizeError::Transform {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
