//! Declarative validation rules

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A validation rule attached to a field.
///
/// Serialized adjacently tagged, e.g. `{"rule": "between", "params": {"min": 1, "max": 9}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "params", rename_all = "snake_case")]
pub enum Rule {
    /// Not null, not an empty string, not an empty list or map
    Required,
    /// Numeric lower bound (inclusive)
    Min(f64),
    /// Numeric upper bound (inclusive)
    Max(f64),
    Between {
        min: f64,
        max: f64,
    },
    /// Character count for strings, element count for lists
    Length {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// Regular expression the value must match
    Pattern(String),
    /// Required when another input key equals a value
    RequiredIf {
        field: String,
        equals: Value,
    },
    Email,
    Url,
    Uuid,
    /// Value must be one of the listed values
    OneOf(Vec<Value>),
    /// Dispatched to a user-registered validator by name
    Custom {
        name: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        params: Map<String, Value>,
    },
}

impl Rule {
    pub fn between(min: f64, max: f64) -> Self {
        Rule::Between { min, max }
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Rule::Length { min, max }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Rule::Pattern(pattern.into())
    }

    pub fn required_if(field: impl Into<String>, equals: impl Into<Value>) -> Self {
        Rule::RequiredIf {
            field: field.into(),
            equals: equals.into(),
        }
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Rule::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Rule::Custom {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter to a custom rule; other rules are returned unchanged
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Rule::Custom { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// Rule name as reported in violations
    pub fn name(&self) -> &str {
        match self {
            Rule::Required => "required",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::Between { .. } => "between",
            Rule::Length { .. } => "length",
            Rule::Pattern(_) => "pattern",
            Rule::RequiredIf { .. } => "required_if",
            Rule::Email => "email",
            Rule::Url => "url",
            Rule::Uuid => "uuid",
            Rule::OneOf(_) => "one_of",
            Rule::Custom { name, .. } => name,
        }
    }

    /// Whether a null value is checked by this rule rather than passing it
    pub fn checks_null(&self) -> bool {
        matches!(
            self,
            Rule::Required | Rule::RequiredIf { .. } | Rule::Custom { .. }
        )
    }

    /// Rule parameters as reported in violations
    pub fn parameters(&self) -> Map<String, Value> {
        let params = match self {
            Rule::Required | Rule::Email | Rule::Url | Rule::Uuid => json!({}),
            Rule::Min(min) => json!({ "min": min }),
            Rule::Max(max) => json!({ "max": max }),
            Rule::Between { min, max } => json!({ "min": min, "max": max }),
            Rule::Length { min, max } => json!({ "min": min, "max": max }),
            Rule::Pattern(pattern) => json!({ "pattern": pattern }),
            Rule::RequiredIf { field, equals } => json!({ "field": field, "equals": equals }),
            Rule::OneOf(values) => json!({ "values": values }),
            Rule::Custom { params, .. } => Value::Object(params.clone()),
        };
        match params {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_serialization() {
        assert_eq!(
            serde_json::to_value(Rule::Required).unwrap(),
            json!({ "rule": "required" })
        );
        assert_eq!(
            serde_json::to_value(Rule::between(1.0, 9.0)).unwrap(),
            json!({ "rule": "between", "params": { "min": 1.0, "max": 9.0 } })
        );
        assert_eq!(
            serde_json::to_value(Rule::pattern("^[A-Z]+$")).unwrap(),
            json!({ "rule": "pattern", "params": "^[A-Z]+$" })
        );
        let back: Rule = serde_json::from_value(json!({
            "rule": "required_if",
            "params": { "field": "kind", "equals": "company" }
        }))
        .unwrap();
        assert_eq!(back, Rule::required_if("kind", "company"));
    }

    #[test]
    fn test_names_and_parameters() {
        assert_eq!(Rule::custom("even").name(), "even");
        assert_eq!(Rule::Min(3.0).parameters().get("min"), Some(&json!(3.0)));
        assert!(Rule::Email.parameters().is_empty());
        let custom = Rule::custom("divisible").with_param("by", 3);
        assert_eq!(custom.parameters().get("by"), Some(&json!(3)));
    }

    #[test]
    fn test_checks_null() {
        assert!(Rule::Required.checks_null());
        assert!(!Rule::Email.checks_null());
        assert!(!Rule::Min(1.0).checks_null());
    }
}
