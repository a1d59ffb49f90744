//! Transformers: typed leaf values to output values

use std::fmt::Write;
use std::sync::Arc;

use serde_json::{Number, Value};

use super::error::NormalizeError;
use crate::context::Context;
use crate::metadata::FieldMeta;
use crate::model::Typed;
use crate::registry::{DEFAULT_PRIORITY, Registry, Strategy};

/// Renders one typed leaf value for output
pub trait Transformer: Strategy {
    fn supports(&self, field: &FieldMeta, value: &Typed) -> bool;

    fn transform(
        &self,
        field: &FieldMeta,
        value: &Typed,
        ctx: &Context,
    ) -> Result<Value, NormalizeError>;
}

/// Dates and datetimes, rendered with the field format or the context format
#[derive(Debug, Default)]
pub struct DateTimeTransformer;

impl Strategy for DateTimeTransformer {
    fn name(&self) -> &str {
        "datetime"
    }
}

impl Transformer for DateTimeTransformer {
    fn supports(&self, _field: &FieldMeta, value: &Typed) -> bool {
        matches!(value, Typed::Date(_) | Typed::DateTime(_))
    }

    fn transform(
        &self,
        field: &FieldMeta,
        value: &Typed,
        ctx: &Context,
    ) -> Result<Value, NormalizeError> {
        let mut out = String::new();
        let written = match value {
            Typed::DateTime(dt) => {
                let format = field.format.as_deref().unwrap_or(ctx.datetime_format());
                write!(out, "{}", dt.format(format))
            }
            Typed::Date(date) => {
                let format = field.format.as_deref().unwrap_or(ctx.date_format());
                write!(out, "{}", date.format(format))
            }
            other => {
                return Err(NormalizeError::transform(
                    &field.name,
                    format!("expected a date or datetime, got {}", other.kind_name()),
                ));
            }
        };
        written
            .map(|_| Value::String(out))
            .map_err(|_| NormalizeError::transform(&field.name, "invalid temporal format"))
    }
}

/// Enum cases: the backing value, or the case name for non-backed enums
#[derive(Debug, Default)]
pub struct EnumTransformer;

impl Strategy for EnumTransformer {
    fn name(&self) -> &str {
        "enum"
    }
}

impl Transformer for EnumTransformer {
    fn supports(&self, _field: &FieldMeta, value: &Typed) -> bool {
        matches!(value, Typed::Enum(_))
    }

    fn transform(
        &self,
        field: &FieldMeta,
        value: &Typed,
        _ctx: &Context,
    ) -> Result<Value, NormalizeError> {
        match value {
            Typed::Enum(e) => Ok(e.value.clone().unwrap_or_else(|| Value::String(e.case.clone()))),
            other => Err(NormalizeError::transform(
                &field.name,
                format!("expected an enum, got {}", other.kind_name()),
            )),
        }
    }
}

/// Scalars and raw values
#[derive(Debug, Default)]
pub struct ScalarTransformer;

impl Strategy for ScalarTransformer {
    fn name(&self) -> &str {
        "scalar"
    }
}

impl Transformer for ScalarTransformer {
    fn supports(&self, _field: &FieldMeta, value: &Typed) -> bool {
        matches!(
            value,
            Typed::Null
                | Typed::Bool(_)
                | Typed::Int(_)
                | Typed::Float(_)
                | Typed::String(_)
                | Typed::Uuid(_)
                | Typed::Raw(_)
        )
    }

    fn transform(
        &self,
        field: &FieldMeta,
        value: &Typed,
        _ctx: &Context,
    ) -> Result<Value, NormalizeError> {
        match value {
            Typed::Null => Ok(Value::Null),
            Typed::Bool(b) => Ok(Value::Bool(*b)),
            Typed::Int(i) => Ok(Value::from(*i)),
            Typed::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .ok_or_else(|| {
                    NormalizeError::transform(&field.name, format!("{} is not a finite number", f))
                }),
            Typed::String(s) => Ok(Value::String(s.clone())),
            Typed::Uuid(id) => Ok(Value::String(id.to_string())),
            Typed::Raw(raw) => Ok(raw.clone()),
            other => Err(NormalizeError::transform(
                &field.name,
                format!("{} is not a scalar", other.kind_name()),
            )),
        }
    }
}

/// Priority-ordered transformers
#[derive(Debug, Clone)]
pub struct TransformerRegistry {
    transformers: Registry<dyn Transformer>,
}

impl TransformerRegistry {
    pub fn empty() -> Self {
        Self {
            transformers: Registry::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Arc::new(DateTimeTransformer), DEFAULT_PRIORITY)
            .register(Arc::new(EnumTransformer), DEFAULT_PRIORITY)
            .register(Arc::new(ScalarTransformer), DEFAULT_PRIORITY);
        registry
    }

    pub fn register(&mut self, transformer: Arc<dyn Transformer>, priority: i32) -> &mut Self {
        self.transformers.register(transformer, priority);
        self
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn find(&self, field: &FieldMeta, value: &Typed) -> Option<&Arc<dyn Transformer>> {
        self.transformers.find(|transformer| transformer.supports(field, value))
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<dyn Transformer>> {
        self.transformers.by_name(name)
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeDescriptor;
    use crate::model::EnumValue;
    use chrono::{DateTime, NaiveDate};
    use serde_json::json;

    #[test]
    fn test_datetime_formats() {
        let field = FieldMeta::new("at", TypeDescriptor::datetime());
        let ctx = Context::default();
        let dt = DateTime::parse_from_rfc3339("2024-03-01T09:30:00+02:00").unwrap();
        assert_eq!(
            DateTimeTransformer.transform(&field, &Typed::DateTime(dt), &ctx).unwrap(),
            json!("2024-03-01T09:30:00+02:00")
        );

        let custom = field.clone().format("%d/%m/%Y %H:%M");
        assert_eq!(
            DateTimeTransformer.transform(&custom, &Typed::DateTime(dt), &ctx).unwrap(),
            json!("01/03/2024 09:30")
        );

        let date = Typed::Date(NaiveDate::from_ymd_opt(2023, 12, 24).unwrap());
        let day = FieldMeta::new("day", TypeDescriptor::date());
        assert_eq!(
            DateTimeTransformer
                .transform(&day, &date, &ctx.with_date_format("%d.%m.%Y"))
                .unwrap(),
            json!("24.12.2023")
        );
    }

    #[test]
    fn test_enum_backing_or_name() {
        let field = FieldMeta::new("status", TypeDescriptor::any());
        let ctx = Context::default();
        let backed = Typed::Enum(EnumValue {
            enum_type: "Priority".to_string(),
            case: "High".to_string(),
            value: Some(json!(10)),
        });
        let plain = Typed::Enum(EnumValue {
            enum_type: "Status".to_string(),
            case: "Active".to_string(),
            value: None,
        });
        assert_eq!(EnumTransformer.transform(&field, &backed, &ctx).unwrap(), json!(10));
        assert_eq!(EnumTransformer.transform(&field, &plain, &ctx).unwrap(), json!("Active"));
    }

    #[test]
    fn test_scalar_rejects_non_finite_float() {
        let field = FieldMeta::new("ratio", TypeDescriptor::float());
        let ctx = Context::default();
        assert_eq!(
            ScalarTransformer.transform(&field, &Typed::Float(0.5), &ctx).unwrap(),
            json!(0.5)
        );
        assert!(matches!(
            ScalarTransformer.transform(&field, &Typed::Float(f64::NAN), &ctx),
            Err(NormalizeError::Transform { .. })
        ));
    }

    #[test]
    fn test_registry_dispatch() {
        let registry = TransformerRegistry::default();
        let field = FieldMeta::new("x", TypeDescriptor::any());
        assert_eq!(registry.find(&field, &Typed::Int(1)).unwrap().name(), "scalar");
        assert_eq!(
            registry
                .find(&field, &Typed::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()))
                .unwrap()
                .name(),
            "datetime"
        );
        assert!(registry.find(&field, &Typed::List(Vec::new())).is_none());
    }
}
