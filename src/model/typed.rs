//! Typed values exchanged between the engine and bindable types

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::bindable::{Bindable, BindableEnum, Structured};

/// A resolved enum case
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub enum_type: String,
    pub case: String,
    /// Backing value for backed enums
    pub value: Option<Value>,
}

impl EnumValue {
    /// Describe a Rust enum value
    pub fn of<E: BindableEnum>(value: &E) -> Self {
        let meta = E::enum_meta();
        let case = value.case_name();
        let backing = meta.find_case(case).and_then(|c| c.value.clone());
        Self {
            enum_type: meta.name,
            case: case.to_string(),
            value: backing,
        }
    }
}

/// A typed value.
///
/// Casters produce these from raw input, bindable types consume them in
/// [`Bindable::construct`] and hand them back from [`Bindable::field_value`] for
/// normalization.
#[derive(Debug, Clone)]
pub enum Typed {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Enum(EnumValue),
    List(Vec<Typed>),
    Object(Box<dyn Structured>),
    /// Untyped value passed through unchanged
    Raw(Value),
}

impl Typed {
    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Typed::Null => "null",
            Typed::Bool(_) => "bool",
            Typed::Int(_) => "int",
            Typed::Float(_) => "float",
            Typed::String(_) => "string",
            Typed::Uuid(_) => "uuid",
            Typed::Date(_) => "date",
            Typed::DateTime(_) => "datetime",
            Typed::Enum(_) => "enum",
            Typed::List(_) => "list",
            Typed::Object(_) => "object",
            Typed::Raw(_) => "raw",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Typed::Null)
    }

    /// Wrap a nested bindable value
    pub fn object<T: Bindable>(value: &T) -> Self {
        Typed::Object(Box::new(value.clone()))
    }

    pub fn optional_object<T: Bindable>(value: Option<&T>) -> Self {
        value.map_or(Typed::Null, Typed::object)
    }

    pub fn objects<T: Bindable>(values: &[T]) -> Self {
        Typed::List(values.iter().map(Typed::object).collect())
    }

    /// Wrap an enum value
    pub fn enumeration<E: BindableEnum>(value: &E) -> Self {
        Typed::Enum(EnumValue::of(value))
    }

    pub fn optional_enum<E: BindableEnum>(value: Option<&E>) -> Self {
        value.map_or(Typed::Null, Typed::enumeration)
    }

    pub fn enums<E: BindableEnum>(values: &[E]) -> Self {
        Typed::List(values.iter().map(Typed::enumeration).collect())
    }
}

impl From<bool> for Typed {
    fn from(v: bool) -> Self {
        Typed::Bool(v)
    }
}

impl From<i64> for Typed {
    fn from(v: i64) -> Self {
        Typed::Int(v)
    }
}

impl From<i32> for Typed {
    fn from(v: i32) -> Self {
        Typed::Int(i64::from(v))
    }
}

impl From<u32> for Typed {
    fn from(v: u32) -> Self {
        Typed::Int(i64::from(v))
    }
}

impl From<f64> for Typed {
    fn from(v: f64) -> Self {
        Typed::Float(v)
    }
}

impl From<String> for Typed {
    fn from(v: String) -> Self {
        Typed::String(v)
    }
}

impl From<&str> for Typed {
    fn from(v: &str) -> Self {
        Typed::String(v.to_string())
    }
}

impl From<&String> for Typed {
    fn from(v: &String) -> Self {
        Typed::String(v.clone())
    }
}

impl From<Uuid> for Typed {
    fn from(v: Uuid) -> Self {
        Typed::Uuid(v)
    }
}

impl From<NaiveDate> for Typed {
    fn from(v: NaiveDate) -> Self {
        Typed::Date(v)
    }
}

impl From<DateTime<FixedOffset>> for Typed {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Typed::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Typed {
    fn from(v: DateTime<Utc>) -> Self {
        Typed::DateTime(v.fixed_offset())
    }
}

impl From<EnumValue> for Typed {
    fn from(v: EnumValue) -> Self {
        Typed::Enum(v)
    }
}

impl From<Value> for Typed {
    fn from(v: Value) -> Self {
        Typed::Raw(v)
    }
}

impl<T: Into<Typed>> From<Option<T>> for Typed {
    fn from(v: Option<T>) -> Self {
        v.map_or(Typed::Null, Into::into)
    }
}

impl<T: Into<Typed>> From<Vec<T>> for Typed {
    fn from(v: Vec<T>) -> Self {
        Typed::List(v.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a [`Typed`] value into a field's Rust type.
///
/// Returns `None` when the value has the wrong shape; [`Arguments`] turns that into a
/// [`ConstructError::TypeMismatch`] naming the field.
///
/// [`Arguments`]: super::Arguments
/// [`ConstructError::TypeMismatch`]: super::ConstructError::TypeMismatch
pub trait FromTyped: Sized {
    fn from_typed(value: Typed) -> Option<Self>;
}

impl FromTyped for Typed {
    fn from_typed(value: Typed) -> Option<Self> {
        Some(value)
    }
}

impl FromTyped for bool {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTyped for i64 {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTyped for i32 {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Int(v) => i32::try_from(v).ok(),
            _ => None,
        }
    }
}

impl FromTyped for u32 {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Int(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }
}

impl FromTyped for f64 {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Float(v) => Some(v),
            Typed::Int(v) => Some(v as f64),
            _ => None,
        }
    }
}

impl FromTyped for String {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::String(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTyped for Uuid {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Uuid(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTyped for NaiveDate {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Date(v) => Some(v),
            Typed::DateTime(v) => Some(v.date_naive()),
            _ => None,
        }
    }
}

impl FromTyped for DateTime<FixedOffset> {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::DateTime(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTyped for DateTime<Utc> {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::DateTime(v) => Some(v.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl FromTyped for EnumValue {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Enum(v) => Some(v),
            _ => None,
        }
    }
}

impl FromTyped for Value {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Raw(v) => Some(v),
            Typed::Null => Some(Value::Null),
            Typed::Bool(v) => Some(Value::Bool(v)),
            Typed::Int(v) => Some(Value::from(v)),
            Typed::Float(v) => serde_json::Number::from_f64(v).map(Value::Number),
            Typed::String(v) => Some(Value::String(v)),
            Typed::List(items) => items
                .into_iter()
                .map(Value::from_typed)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            _ => None,
        }
    }
}

impl<T: FromTyped> FromTyped for Option<T> {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::Null => Some(None),
            other => T::from_typed(other).map(Some),
        }
    }
}

impl<T: FromTyped> FromTyped for Vec<T> {
    fn from_typed(value: Typed) -> Option<Self> {
        match value {
            Typed::List(items) => items.into_iter().map(T::from_typed).collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(i64::from_typed(Typed::Int(7)), Some(7));
        assert_eq!(i32::from_typed(Typed::Int(i64::MAX)), None);
        assert_eq!(f64::from_typed(Typed::Int(2)), Some(2.0));
        assert_eq!(String::from_typed(Typed::Int(2)), None);
        assert_eq!(bool::from_typed(Typed::Bool(true)), Some(true));
    }

    #[test]
    fn test_option_and_vec() {
        assert_eq!(Option::<i64>::from_typed(Typed::Null), Some(None));
        assert_eq!(Option::<i64>::from_typed(Typed::Int(3)), Some(Some(3)));
        assert_eq!(
            Vec::<String>::from_typed(Typed::List(vec!["a".into(), "b".into()])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            Vec::<String>::from_typed(Typed::List(vec!["a".into(), Typed::Int(1)])),
            None
        );
    }

    #[test]
    fn test_into_typed() {
        assert!(matches!(Typed::from(Some(5i64)), Typed::Int(5)));
        assert!(Typed::from(None::<String>).is_null());
        assert!(matches!(Typed::from(vec![1i64, 2]), Typed::List(ref v) if v.len() == 2));
    }

    #[test]
    fn test_raw_value_conversion() {
        let value =
            Value::from_typed(Typed::List(vec![Typed::Int(1), Typed::Raw(json!({"a": 1}))]));
        assert_eq!(value, Some(json!([1, {"a": 1}])));
    }
}
