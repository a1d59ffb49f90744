//! Error types for constructing bindable values

use thiserror::Error;

/// Errors raised by [`Bindable::construct`](super::Bindable::construct)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructError {
    /// The constructor asked for a field that was not resolved
    #[error("Missing argument '{field}' for {type_id}")]
    MissingArgument { type_id: String, field: String },

    /// The resolved value has a different shape than the constructor expects
    #[error("Argument '{field}' of {type_id}: expected {expected}, found {found}")]
    TypeMismatch {
        type_id: String,
        field: String,
        expected: String,
        found: String,
    },

    /// The constructor rejected a value
    #[error("Invalid argument '{field}' for {type_id}: {message}")]
    Invalid {
        type_id: String,
        field: String,
        message: String,
    },
}

impl ConstructError {
    /// Name of the field the error is about
    pub fn field(&self) -> &str {
        match self {
            ConstructError::MissingArgument { field, .. }
            | ConstructError::TypeMismatch { field, .. }
            | ConstructError::Invalid { field, .. } => field,
        }
    }
}
