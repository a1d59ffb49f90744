//! Validation error types

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A single rule that a field value did not satisfy
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{field}: {message}")]
pub struct RuleViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
    pub value: Value,
    pub parameters: Map<String, Value>,
}

impl RuleViolation {
    pub fn new(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
            value,
            parameters: Map::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// All rule violations of one field
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("Validation failed for {field}: {}", summary(.violations))]
pub struct ValidationError {
    pub field: String,
    pub violations: Vec<RuleViolation>,
}

fn summary(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn new(field: impl Into<String>, violations: Vec<RuleViolation>) -> Self {
        Self {
            field: field.into(),
            violations,
        }
    }

    /// Names of the violated rules, in rule order
    pub fn rules(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.rule.as_str()).collect()
    }
}
