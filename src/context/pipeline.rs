//! Value pipes applied to raw input values before validation and casting

use std::fmt;

use serde_json::Value;

use super::Context;
use crate::metadata::FieldMeta;

/// A pre-processing step run on every present input value, in pipeline order
pub trait ValuePipe: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn apply(&self, field: &FieldMeta, value: Value, ctx: &Context) -> Value;
}

/// Trim surrounding whitespace from string values
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimStrings;

impl ValuePipe for TrimStrings {
    fn name(&self) -> &str {
        "trim_strings"
    }

    fn apply(&self, _field: &FieldMeta, value: Value, _ctx: &Context) -> Value {
        match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.len() == s.len() {
                    Value::String(s)
                } else {
                    Value::String(trimmed.to_string())
                }
            }
            other => other,
        }
    }
}

/// Turn empty strings into null for nullable fields
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStringAsNull;

impl ValuePipe for EmptyStringAsNull {
    fn name(&self) -> &str {
        "empty_string_as_null"
    }

    fn apply(&self, field: &FieldMeta, value: Value, _ctx: &Context) -> Value {
        match value {
            Value::String(s) if s.is_empty() && field.ty.nullable => Value::Null,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeDescriptor;
    use serde_json::json;

    #[test]
    fn test_trim_strings() {
        let field = FieldMeta::new("name", TypeDescriptor::string());
        let ctx = Context::default();
        assert_eq!(TrimStrings.apply(&field, json!("  Ada "), &ctx), json!("Ada"));
        assert_eq!(TrimStrings.apply(&field, json!(3), &ctx), json!(3));
    }

    #[test]
    fn test_empty_string_as_null_respects_nullability() {
        let ctx = Context::default();
        let nullable = FieldMeta::new("nick", TypeDescriptor::string().nullable());
        let required = FieldMeta::new("name", TypeDescriptor::string());
        assert_eq!(EmptyStringAsNull.apply(&nullable, json!(""), &ctx), Value::Null);
        assert_eq!(EmptyStringAsNull.apply(&required, json!(""), &ctx), json!(""));
    }
}
