//! Error types for metadata extraction

use thiserror::Error;

/// Errors raised while building or resolving class metadata
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// No registration is known for the type id
    #[error("Unknown bindable type: {0}")]
    UnknownType(String),

    /// `describe()` returned metadata for a different type
    #[error("Type id mismatch: registered as {registered}, described as {described}")]
    TypeMismatch {
        registered: String,
        described: String,
    },

    /// Two fields share a name
    #[error("Duplicate field '{field}' in {type_id}")]
    DuplicateField { type_id: String, field: String },

    /// Construction order names a field that is not declared (or names it twice)
    #[error("Invalid construction order entry '{field}' in {type_id}")]
    ConstructionOrder { type_id: String, field: String },

    /// A type descriptor violates its invariants
    #[error("Invalid type for {type_id}.{field}: {reason}")]
    InvalidDescriptor {
        type_id: String,
        field: String,
        reason: String,
    },

    /// A validation rule cannot be evaluated
    #[error("Invalid rule '{rule}' on {type_id}.{field}: {reason}")]
    InvalidRule {
        type_id: String,
        field: String,
        rule: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetadataError::UnknownType("Invoice".to_string());
        assert!(err.to_string().contains("Invoice"));

        let err = MetadataError::InvalidDescriptor {
            type_id: "User".to_string(),
            field: "status".to_string(),
            reason: "enum field declares no enum type".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid type for User.status: enum field declares no enum type"
        );
    }
}
