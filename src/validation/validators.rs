//! Rule validators
//!
//! Each validator handles one or more [`Rule`] variants. The registry dispatches a
//! rule to the first validator (by priority) that supports it.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::RuleViolation;
use super::rules::Rule;
use crate::context::Context;
use crate::metadata::FieldMeta;
use crate::registry::Strategy;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static HOST_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])",
        r"(\.([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9]))*",
        r"(:\d{1,5})?$"
    ))
    .unwrap()
});

/// What a validator can see besides the value under test
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    input: &'a Map<String, Value>,
    context: &'a Context,
}

impl<'a> ValidationContext<'a> {
    pub fn new(input: &'a Map<String, Value>, context: &'a Context) -> Self {
        Self { input, context }
    }

    /// The complete raw input of the object being bound
    pub fn input(&self) -> &'a Map<String, Value> {
        self.input
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }
}

/// Checks one kind of rule against a raw input value
pub trait RuleValidator: Strategy {
    fn supports(&self, rule: &Rule) -> bool;

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation>;
}

fn violation(field: &FieldMeta, rule: &Rule, message: String, value: &Value) -> RuleViolation {
    RuleViolation::new(&field.name, rule.name(), message, value.clone())
        .with_parameters(rule.parameters())
}

/// Numeric view of a value; numeric strings count
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// `Required` and `RequiredIf`
#[derive(Debug, Default)]
pub struct RequiredValidator;

impl Strategy for RequiredValidator {
    fn name(&self) -> &str {
        "required"
    }
}

impl RuleValidator for RequiredValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Required | Rule::RequiredIf { .. })
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        let message = match rule {
            Rule::RequiredIf { field: other, equals } => {
                if ctx.input().get(other) != Some(equals) {
                    return Ok(());
                }
                format!("The {} field is required when {} is {}.", field.name, other, equals)
            }
            _ => format!("The {} field is required.", field.name),
        };
        if is_blank(value) {
            return Err(violation(field, rule, message, value));
        }
        Ok(())
    }
}

/// `Min`, `Max` and `Between`, all inclusive
#[derive(Debug, Default)]
pub struct RangeValidator;

impl Strategy for RangeValidator {
    fn name(&self) -> &str {
        "range"
    }
}

impl RuleValidator for RangeValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Min(_) | Rule::Max(_) | Rule::Between { .. })
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        let Some(number) = numeric(value) else {
            return Err(violation(
                field,
                rule,
                format!("The {} field must be a number.", field.name),
                value,
            ));
        };

        let message = match rule {
            Rule::Min(min) if number < *min => {
                format!("The {} field must be at least {}.", field.name, min)
            }
            Rule::Max(max) if number > *max => {
                format!("The {} field must not be greater than {}.", field.name, max)
            }
            Rule::Between { min, max } if number < *min || number > *max => {
                format!("The {} field must be between {} and {}.", field.name, min, max)
            }
            _ => return Ok(()),
        };
        Err(violation(field, rule, message, value))
    }
}

/// `Length`: characters of a string, elements of a list or map
#[derive(Debug, Default)]
pub struct LengthValidator;

impl Strategy for LengthValidator {
    fn name(&self) -> &str {
        "length"
    }
}

impl RuleValidator for LengthValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Length { .. })
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        let Rule::Length { min, max } = rule else {
            return Ok(());
        };
        let len = match value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => {
                return Err(violation(
                    field,
                    rule,
                    format!("The {} field must be a string or a list.", field.name),
                    value,
                ));
            }
        };

        if let Some(min) = min.filter(|min| len < *min) {
            return Err(violation(
                field,
                rule,
                format!("The {} field must have at least {} items or characters.", field.name, min),
                value,
            ));
        }
        if let Some(max) = max.filter(|max| len > *max) {
            return Err(violation(
                field,
                rule,
                format!(
                    "The {} field must not have more than {} items or characters.",
                    field.name, max
                ),
                value,
            ));
        }
        Ok(())
    }
}

/// `Pattern`; compiled expressions are kept for reuse
#[derive(Default)]
pub struct PatternValidator {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl fmt::Debug for PatternValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternValidator").finish_non_exhaustive()
    }
}

impl PatternValidator {
    fn regex(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let compiled = match self.compiled.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(regex) = compiled.get(pattern) {
                return Ok(regex.clone());
            }
        }
        let regex = Regex::new(pattern)?;
        let mut compiled = match self.compiled.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        compiled.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

impl Strategy for PatternValidator {
    fn name(&self) -> &str {
        "pattern"
    }
}

impl RuleValidator for PatternValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Pattern(_))
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        let Rule::Pattern(pattern) = rule else {
            return Ok(());
        };
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(violation(
                    field,
                    rule,
                    format!("The {} field must be a string.", field.name),
                    value,
                ));
            }
        };
        let regex = self.regex(pattern).map_err(|e| {
            violation(field, rule, format!("Invalid pattern for {}: {}", field.name, e), value)
        })?;
        if regex.is_match(&text) {
            Ok(())
        } else {
            Err(violation(
                field,
                rule,
                format!("The {} field format is invalid.", field.name),
                value,
            ))
        }
    }
}

/// Email addresses
#[derive(Debug, Default)]
pub struct EmailValidator;

impl Strategy for EmailValidator {
    fn name(&self) -> &str {
        "email"
    }
}

impl RuleValidator for EmailValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Email)
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        match value.as_str() {
            Some(s) if EMAIL_REGEX.is_match(s) => Ok(()),
            _ => Err(violation(
                field,
                rule,
                format!("The {} field must be a valid email address.", field.name),
                value,
            )),
        }
    }
}

/// Check an http(s) URL: scheme, host, no embedded credentials or whitespace
/// `url` without its scheme prefix, compared ASCII case-insensitively
fn strip_scheme<'a>(url: &'a str, scheme: &str) -> Option<&'a str> {
    let head = url.get(..scheme.len())?;
    if head.eq_ignore_ascii_case(scheme) {
        url.get(scheme.len()..)
    } else {
        None
    }
}

fn url_problem(url: &str) -> Option<&'static str> {
    if url.is_empty() {
        return Some("is empty");
    }
    if url.chars().any(char::is_whitespace) {
        return Some("contains whitespace");
    }

    let Some(rest) = strip_scheme(url, "http://").or_else(|| strip_scheme(url, "https://")) else {
        return Some("only http:// and https:// URLs are allowed");
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    if host.contains('@') {
        return Some("URLs with embedded credentials are not allowed");
    }
    if !HOST_REGEX.is_match(host) {
        return Some("has no valid host");
    }
    None
}

/// http and https URLs
#[derive(Debug, Default)]
pub struct UrlValidator;

impl Strategy for UrlValidator {
    fn name(&self) -> &str {
        "url"
    }
}

impl RuleValidator for UrlValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Url)
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        let problem = match value.as_str() {
            Some(url) => url_problem(url),
            None => Some("must be a string"),
        };
        match problem {
            None => Ok(()),
            Some(problem) => Err(violation(
                field,
                rule,
                format!("The {} field must be a valid URL: {}.", field.name, problem),
                value,
            )),
        }
    }
}

/// Canonical or simple-form UUIDs
#[derive(Debug, Default)]
pub struct UuidValidator;

impl Strategy for UuidValidator {
    fn name(&self) -> &str {
        "uuid"
    }
}

impl RuleValidator for UuidValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Uuid)
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        match value.as_str().map(Uuid::parse_str) {
            Some(Ok(_)) => Ok(()),
            _ => Err(violation(
                field,
                rule,
                format!("The {} field must be a valid UUID.", field.name),
                value,
            )),
        }
    }
}

/// `OneOf`: strict equality against the allowed values
#[derive(Debug, Default)]
pub struct OneOfValidator;

impl Strategy for OneOfValidator {
    fn name(&self) -> &str {
        "one_of"
    }
}

impl RuleValidator for OneOfValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::OneOf(_))
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        let Rule::OneOf(allowed) = rule else {
            return Ok(());
        };
        if allowed.contains(value) {
            return Ok(());
        }
        let listed = allowed
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(violation(
            field,
            rule,
            format!("The {} field must be one of: {}.", field.name, listed),
            value,
        ))
    }
}

type CheckFn =
    dyn Fn(&Value, &Map<String, Value>, &ValidationContext<'_>) -> Option<String> + Send + Sync;

/// A `Custom { name }` rule backed by a closure.
///
/// The closure returns `Some(message)` for an invalid value.
///
/// ```rust,ignore
/// let even = FnValidator::new("even", |value, _params, _ctx| match value.as_i64() {
///     Some(n) if n % 2 == 0 => None,
///     _ => Some("must be even".to_string()),
/// });
/// ```
pub struct FnValidator {
    name: String,
    check: Box<CheckFn>,
}

impl FnValidator {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Map<String, Value>, &ValidationContext<'_>) -> Option<String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Strategy for FnValidator {
    fn name(&self) -> &str {
        &self.name
    }
}

impl RuleValidator for FnValidator {
    fn supports(&self, rule: &Rule) -> bool {
        matches!(rule, Rule::Custom { name, .. } if *name == self.name)
    }

    fn check(
        &self,
        field: &FieldMeta,
        rule: &Rule,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), RuleViolation> {
        let params = match rule {
            Rule::Custom { params, .. } => params.clone(),
            _ => Map::new(),
        };
        match (self.check)(value, &params, ctx) {
            None => Ok(()),
            Some(message) => Err(violation(field, rule, message, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeDescriptor;
    use serde_json::json;

    fn field() -> FieldMeta {
        FieldMeta::new("value", TypeDescriptor::any())
    }

    fn run(validator: &dyn RuleValidator, rule: Rule, value: Value) -> Result<(), RuleViolation> {
        let input = Map::new();
        let context = Context::default();
        let ctx = ValidationContext::new(&input, &context);
        validator.check(&field(), &rule, &value, &ctx)
    }

    #[test]
    fn test_required() {
        assert!(run(&RequiredValidator, Rule::Required, json!("x")).is_ok());
        assert!(run(&RequiredValidator, Rule::Required, json!(0)).is_ok());
        assert!(run(&RequiredValidator, Rule::Required, json!(false)).is_ok());
        for blank in [json!(null), json!(""), json!("   "), json!([]), json!({})] {
            assert!(run(&RequiredValidator, Rule::Required, blank).is_err());
        }
    }

    #[test]
    fn test_required_if_reads_input() {
        let input =
            serde_json::from_value::<Map<String, Value>>(json!({ "kind": "company" })).unwrap();
        let context = Context::default();
        let ctx = ValidationContext::new(&input, &context);
        let rule = Rule::required_if("kind", "company");
        assert!(RequiredValidator.check(&field(), &rule, &json!(null), &ctx).is_err());

        let other = Rule::required_if("kind", "person");
        assert!(RequiredValidator.check(&field(), &other, &json!(null), &ctx).is_ok());
    }

    #[test]
    fn test_range_accepts_numeric_strings() {
        assert!(run(&RangeValidator, Rule::Min(18.0), json!("21")).is_ok());
        assert!(run(&RangeValidator, Rule::Min(18.0), json!(18)).is_ok());
        assert!(run(&RangeValidator, Rule::Max(10.0), json!(10.5)).is_err());
        assert!(run(&RangeValidator, Rule::between(1.0, 5.0), json!(5)).is_ok());
        let err = run(&RangeValidator, Rule::between(1.0, 5.0), json!(6)).unwrap_err();
        assert_eq!(err.rule, "between");
        assert_eq!(err.parameters.get("max"), Some(&json!(5.0)));
        assert!(run(&RangeValidator, Rule::Min(1.0), json!("abc")).is_err());
    }

    #[test]
    fn test_length() {
        assert!(run(&LengthValidator, Rule::length(Some(2), Some(4)), json!("héé")).is_ok());
        assert!(run(&LengthValidator, Rule::length(Some(2), None), json!("a")).is_err());
        assert!(run(&LengthValidator, Rule::length(None, Some(2)), json!([1, 2, 3])).is_err());
        assert!(run(&LengthValidator, Rule::length(None, Some(2)), json!(12)).is_err());
    }

    #[test]
    fn test_pattern_matches_numbers_as_text() {
        let validator = PatternValidator::default();
        assert!(run(&validator, Rule::pattern(r"^\d{5}$"), json!(12345)).is_ok());
        assert!(run(&validator, Rule::pattern(r"^\d{5}$"), json!("1234")).is_err());
        assert!(run(&validator, Rule::pattern(r"^\d{5}$"), json!(true)).is_err());
        // second use is served from the compiled cache
        assert!(run(&validator, Rule::pattern(r"^\d{5}$"), json!("54321")).is_ok());
    }

    #[test]
    fn test_email_url_uuid() {
        assert!(run(&EmailValidator, Rule::Email, json!("ada@example.com")).is_ok());
        assert!(run(&EmailValidator, Rule::Email, json!("not-an-email")).is_err());

        assert!(run(&UrlValidator, Rule::Url, json!("https://example.com/a?b=c")).is_ok());
        assert!(run(&UrlValidator, Rule::Url, json!("http://localhost:8080")).is_ok());
        assert!(run(&UrlValidator, Rule::Url, json!("ftp://example.com")).is_err());
        assert!(run(&UrlValidator, Rule::Url, json!("https://user:pw@example.com")).is_err());
        assert!(run(&UrlValidator, Rule::Url, json!("https://")).is_err());
        assert!(run(&UrlValidator, Rule::Url, json!("HTTPS://Example.com")).is_ok());
        assert!(run(&UrlValidator, Rule::Url, json!("http:/é")).is_err());
        assert!(run(&UrlValidator, Rule::Url, json!("ｈttps://example.com")).is_err());

        let id = json!("550e8400-e29b-41d4-a716-446655440000");
        assert!(run(&UuidValidator, Rule::Uuid, id).is_ok());
        assert!(run(&UuidValidator, Rule::Uuid, json!("550e8400")).is_err());
    }

    #[test]
    fn test_one_of_is_strict() {
        let rule = Rule::one_of(["draft", "published"]);
        assert!(run(&OneOfValidator, rule.clone(), json!("draft")).is_ok());
        assert!(run(&OneOfValidator, rule, json!("Draft")).is_err());
        assert!(run(&OneOfValidator, Rule::one_of([1, 2]), json!("1")).is_err());
    }

    #[test]
    fn test_fn_validator() {
        let even = FnValidator::new("even", |value, _params, _ctx| match value.as_i64() {
            Some(n) if n % 2 == 0 => None,
            _ => Some("must be even".to_string()),
        });
        assert!(even.supports(&Rule::custom("even")));
        assert!(!even.supports(&Rule::custom("odd")));
        assert!(run(&even, Rule::custom("even"), json!(4)).is_ok());
        let err = run(&even, Rule::custom("even"), json!(3)).unwrap_err();
        assert_eq!(err.rule, "even");
        assert_eq!(err.message, "must be even");
    }
}
