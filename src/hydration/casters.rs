//! Casters: raw input values to typed values
//!
//! Built-in casters dispatch on the field's declared [`TypeKind`] and honor the
//! context's [`CastMode`]. Strict mode only accepts values that already have the
//! declared JSON kind; loose and permissive modes coerce between compatible
//! representations.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::error::CastError;
use crate::context::{CastMode, Context};
use crate::metadata::{EnumCase, FieldMeta, TypeKind};
use crate::model::{EnumValue, Typed};
use crate::registry::{DEFAULT_PRIORITY, Registry, Strategy};

/// Converts a raw value into the typed value of a field
pub trait Caster: Strategy {
    fn supports(&self, field: &FieldMeta, value: &Value) -> bool;

    fn cast(&self, field: &FieldMeta, value: &Value, ctx: &Context) -> Result<Typed, CastError>;
}

fn loose(ctx: &Context) -> bool {
    ctx.cast_mode() != CastMode::Strict
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn fail(field: &FieldMeta, value: &Value, reason: impl Into<String>) -> CastError {
    CastError::new(&field.name, field.ty.kind.type_name(), value, reason)
}

fn wrong_kind(field: &FieldMeta, value: &Value) -> CastError {
    fail(field, value, format!("unexpected {} value", json_kind(value)))
}

/// 2^63, the first integral float above `i64::MAX`
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Integral floats within i64 range
fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < I64_UPPER_BOUND {
        Some(f as i64)
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct BoolCaster;

impl Strategy for BoolCaster {
    fn name(&self) -> &str {
        "bool"
    }
}

impl Caster for BoolCaster {
    fn supports(&self, field: &FieldMeta, _value: &Value) -> bool {
        field.ty.kind == TypeKind::Bool
    }

    fn cast(&self, field: &FieldMeta, value: &Value, ctx: &Context) -> Result<Typed, CastError> {
        match value {
            Value::Bool(b) => Ok(Typed::Bool(*b)),
            Value::String(s) if loose(ctx) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Typed::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Typed::Bool(false)),
                _ => Err(fail(field, value, format!("'{}' is not a boolean", s))),
            },
            Value::Number(n) if loose(ctx) => match n.as_f64() {
                Some(f) if f == 1.0 => Ok(Typed::Bool(true)),
                Some(f) if f == 0.0 => Ok(Typed::Bool(false)),
                _ => Err(fail(field, value, format!("{} is not a boolean", n))),
            },
            _ => Err(wrong_kind(field, value)),
        }
    }
}

#[derive(Debug, Default)]
pub struct IntCaster;

impl Strategy for IntCaster {
    fn name(&self) -> &str {
        "int"
    }
}

impl Caster for IntCaster {
    fn supports(&self, field: &FieldMeta, _value: &Value) -> bool {
        field.ty.kind == TypeKind::Int
    }

    fn cast(&self, field: &FieldMeta, value: &Value, ctx: &Context) -> Result<Typed, CastError> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Typed::Int(i));
                }
                match n.as_f64().and_then(integral) {
                    Some(i) if loose(ctx) => Ok(Typed::Int(i)),
                    _ => Err(fail(field, value, format!("{} is not an integer", n))),
                }
            }
            Value::String(s) if loose(ctx) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
                    .map(Typed::Int)
                    .ok_or_else(|| fail(field, value, format!("'{}' is not an integer", s)))
            }
            _ => Err(wrong_kind(field, value)),
        }
    }
}

#[derive(Debug, Default)]
pub struct FloatCaster;

impl Strategy for FloatCaster {
    fn name(&self) -> &str {
        "float"
    }
}

impl Caster for FloatCaster {
    fn supports(&self, field: &FieldMeta, _value: &Value) -> bool {
        field.ty.kind == TypeKind::Float
    }

    fn cast(&self, field: &FieldMeta, value: &Value, ctx: &Context) -> Result<Typed, CastError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Typed::Float)
                .ok_or_else(|| fail(field, value, format!("{} is out of range", n))),
            Value::String(s) if loose(ctx) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Typed::Float)
                .ok_or_else(|| fail(field, value, format!("'{}' is not a number", s))),
            _ => Err(wrong_kind(field, value)),
        }
    }
}

#[derive(Debug, Default)]
pub struct StringCaster;

impl Strategy for StringCaster {
    fn name(&self) -> &str {
        "string"
    }
}

impl Caster for StringCaster {
    fn supports(&self, field: &FieldMeta, _value: &Value) -> bool {
        field.ty.kind == TypeKind::String
    }

    fn cast(&self, field: &FieldMeta, value: &Value, ctx: &Context) -> Result<Typed, CastError> {
        match value {
            Value::String(s) => Ok(Typed::String(s.clone())),
            Value::Number(n) if loose(ctx) => Ok(Typed::String(n.to_string())),
            Value::Bool(b) if loose(ctx) => Ok(Typed::String(b.to_string())),
            _ => Err(wrong_kind(field, value)),
        }
    }
}

#[derive(Debug, Default)]
pub struct UuidCaster;

impl Strategy for UuidCaster {
    fn name(&self) -> &str {
        "uuid"
    }
}

impl Caster for UuidCaster {
    fn supports(&self, field: &FieldMeta, _value: &Value) -> bool {
        field.ty.kind == TypeKind::Uuid
    }

    fn cast(&self, field: &FieldMeta, value: &Value, _ctx: &Context) -> Result<Typed, CastError> {
        match value {
            Value::String(s) => Uuid::parse_str(s.trim())
                .map(Typed::Uuid)
                .map_err(|e| fail(field, value, e.to_string())),
            _ => Err(wrong_kind(field, value)),
        }
    }
}

/// Dates and datetimes.
///
/// Strings are parsed with the field's `format` first, then RFC 3339 (datetimes) or
/// the context date format (dates). Loose mode also accepts `YYYY-MM-DD HH:MM:SS`
/// (read as UTC), plain dates for datetimes, datetimes for dates, and integer unix
/// seconds.
#[derive(Debug, Default)]
pub struct DateTimeCaster;

impl Strategy for DateTimeCaster {
    fn name(&self) -> &str {
        "datetime"
    }
}

fn parse_with_format(s: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, format).ok().or_else(|| {
        NaiveDateTime::parse_from_str(s, format)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

fn naive_utc(s: &str) -> Option<DateTime<FixedOffset>> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().fixed_offset())
}

impl DateTimeCaster {
    fn datetime(
        &self,
        field: &FieldMeta,
        value: &Value,
        ctx: &Context,
    ) -> Result<DateTime<FixedOffset>, CastError> {
        match value {
            Value::String(raw) => {
                let s = raw.trim();
                let mut parsed = field
                    .format
                    .as_deref()
                    .and_then(|format| parse_with_format(s, format))
                    .or_else(|| DateTime::parse_from_rfc3339(s).ok())
                    .or_else(|| parse_with_format(s, ctx.datetime_format()));
                if parsed.is_none() && loose(ctx) {
                    parsed = naive_utc(s).or_else(|| {
                        NaiveDate::parse_from_str(s, "%Y-%m-%d")
                            .ok()
                            .and_then(midnight_utc)
                    });
                }
                parsed.ok_or_else(|| {
                    fail(field, value, format!("'{}' is not a valid datetime", raw))
                })
            }
            Value::Number(n) if loose(ctx) => n
                .as_i64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| fail(field, value, format!("{} is not a unix timestamp", n))),
            _ => Err(wrong_kind(field, value)),
        }
    }

    fn date(
        &self,
        field: &FieldMeta,
        value: &Value,
        ctx: &Context,
    ) -> Result<NaiveDate, CastError> {
        match value {
            Value::String(raw) => {
                let s = raw.trim();
                let mut parsed = field
                    .format
                    .as_deref()
                    .and_then(|format| NaiveDate::parse_from_str(s, format).ok())
                    .or_else(|| NaiveDate::parse_from_str(s, ctx.date_format()).ok())
                    .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
                if parsed.is_none() && loose(ctx) {
                    parsed = DateTime::parse_from_rfc3339(s)
                        .ok()
                        .or_else(|| naive_utc(s))
                        .map(|dt| dt.date_naive());
                }
                parsed.ok_or_else(|| fail(field, value, format!("'{}' is not a valid date", raw)))
            }
            Value::Number(_) if loose(ctx) => {
                self.datetime(field, value, ctx).map(|dt| dt.date_naive())
            }
            _ => Err(wrong_kind(field, value)),
        }
    }
}

impl Caster for DateTimeCaster {
    fn supports(&self, field: &FieldMeta, _value: &Value) -> bool {
        field.ty.is_temporal()
    }

    fn cast(&self, field: &FieldMeta, value: &Value, ctx: &Context) -> Result<Typed, CastError> {
        if field.ty.kind == TypeKind::Date {
            self.date(field, value, ctx).map(Typed::Date)
        } else {
            self.datetime(field, value, ctx).map(Typed::DateTime)
        }
    }
}

/// Enum cases by backing value or case name.
///
/// Backed enums match on the backing value; loose mode also compares numbers with
/// numeric strings and falls back to a case-insensitive case name. Non-backed enums
/// match the case name, case-insensitively in loose mode.
#[derive(Debug, Default)]
pub struct EnumCaster;

impl Strategy for EnumCaster {
    fn name(&self) -> &str {
        "enum"
    }
}

fn same_backing(backing: &Value, value: &Value) -> bool {
    match (backing, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(a), Value::String(s)) => s.trim().parse::<f64>().ok() == a.as_f64(),
        (Value::String(a), Value::Number(b)) => a.trim().parse::<f64>().ok() == b.as_f64(),
        (a, b) => a == b,
    }
}

impl Caster for EnumCaster {
    fn supports(&self, field: &FieldMeta, _value: &Value) -> bool {
        field.ty.is_enum()
    }

    fn cast(&self, field: &FieldMeta, value: &Value, ctx: &Context) -> Result<Typed, CastError> {
        let Some(meta) = field.ty.enum_meta.as_ref() else {
            return Err(fail(field, value, "enum type has no cases declared"));
        };

        let case: Option<&EnumCase> = if meta.is_backed() {
            let exact = meta.find_value(value);
            if exact.is_some() || !loose(ctx) {
                exact
            } else {
                meta.cases
                    .iter()
                    .find(|c| c.value.as_ref().is_some_and(|b| same_backing(b, value)))
                    .or_else(|| {
                        value.as_str().and_then(|s| {
                            meta.cases.iter().find(|c| c.name.eq_ignore_ascii_case(s.trim()))
                        })
                    })
            }
        } else {
            match value.as_str() {
                Some(s) if loose(ctx) => meta
                    .find_case(s)
                    .or_else(|| meta.cases.iter().find(|c| c.name.eq_ignore_ascii_case(s.trim()))),
                Some(s) => meta.find_case(s),
                None => None,
            }
        };

        case.map(|c| {
            Typed::Enum(EnumValue {
                enum_type: meta.name.clone(),
                case: c.name.clone(),
                value: c.value.clone(),
            })
        })
        .ok_or_else(|| fail(field, value, format!("{} is not a case of {}", value, meta.name)))
    }
}

/// Priority-ordered casters
#[derive(Debug, Clone)]
pub struct CasterRegistry {
    casters: Registry<dyn Caster>,
}

impl CasterRegistry {
    pub fn empty() -> Self {
        Self {
            casters: Registry::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Arc::new(BoolCaster), DEFAULT_PRIORITY)
            .register(Arc::new(IntCaster), DEFAULT_PRIORITY)
            .register(Arc::new(FloatCaster), DEFAULT_PRIORITY)
            .register(Arc::new(StringCaster), DEFAULT_PRIORITY)
            .register(Arc::new(UuidCaster), DEFAULT_PRIORITY)
            .register(Arc::new(DateTimeCaster), DEFAULT_PRIORITY)
            .register(Arc::new(EnumCaster), DEFAULT_PRIORITY);
        registry
    }

    pub fn register(&mut self, caster: Arc<dyn Caster>, priority: i32) -> &mut Self {
        self.casters.register(caster, priority);
        self
    }

    pub fn len(&self) -> usize {
        self.casters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casters.is_empty()
    }

    /// First caster that supports the field and value
    pub fn find(&self, field: &FieldMeta, value: &Value) -> Option<&Arc<dyn Caster>> {
        self.casters.find(|caster| caster.supports(field, value))
    }

    /// Caster registered under `name`, for explicit field overrides
    pub fn by_name(&self, name: &str) -> Option<&Arc<dyn Caster>> {
        self.casters.by_name(name)
    }
}

impl Default for CasterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
