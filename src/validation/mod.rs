//! Rule-based validation of raw field values
//!
//! Rules are declared on [`FieldMeta`] and checked against the raw input value before
//! it is cast. Every rule of a field runs; all violations are collected into a single
//! [`ValidationError`] for that field.
//!
//! ## Example
//!
//! ```rust,ignore
//! use data_binding_sdk::validation::{Rule, ValidatorRegistry, ValidationContext};
//!
//! let field = FieldMeta::new("age", TypeDescriptor::int())
//!     .rule(Rule::between(18.0, 99.0))
//!     .rule(Rule::pattern(r"^\d+$"));
//! let registry = ValidatorRegistry::default();
//! let err = registry.validate(&field, &json!("7x"), &ctx).unwrap_err();
//! assert_eq!(err.violations.len(), 2);
//! ```
//!
//! [`FieldMeta`]: crate::metadata::FieldMeta

mod error;
mod rules;
mod validators;

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::metadata::FieldMeta;
use crate::registry::{DEFAULT_PRIORITY, Registry};

pub use error::{RuleViolation, ValidationError};
pub use rules::Rule;
pub use validators::{
    EmailValidator, FnValidator, LengthValidator, OneOfValidator, PatternValidator,
    RangeValidator, RequiredValidator, RuleValidator, UrlValidator, UuidValidator,
    ValidationContext,
};

/// Priority-ordered set of rule validators
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    validators: Registry<dyn RuleValidator>,
}

impl ValidatorRegistry {
    /// An empty registry, without built-in validators
    pub fn empty() -> Self {
        Self {
            validators: Registry::new(),
        }
    }

    /// A registry holding the built-in validators
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Arc::new(RequiredValidator), DEFAULT_PRIORITY)
            .register(Arc::new(RangeValidator), DEFAULT_PRIORITY)
            .register(Arc::new(LengthValidator), DEFAULT_PRIORITY)
            .register(Arc::new(PatternValidator::default()), DEFAULT_PRIORITY)
            .register(Arc::new(EmailValidator), DEFAULT_PRIORITY)
            .register(Arc::new(UrlValidator), DEFAULT_PRIORITY)
            .register(Arc::new(UuidValidator), DEFAULT_PRIORITY)
            .register(Arc::new(OneOfValidator), DEFAULT_PRIORITY);
        registry
    }

    pub fn register(&mut self, validator: Arc<dyn RuleValidator>, priority: i32) -> &mut Self {
        self.validators.register(validator, priority);
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validator that handles `rule`
    pub fn find(&self, rule: &Rule) -> Option<&Arc<dyn RuleValidator>> {
        self.validators.find(|validator| validator.supports(rule))
    }

    /// Run every rule of `field` against `value`, collecting all violations
    pub fn validate(
        &self,
        field: &FieldMeta,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        for rule in &field.rules {
            if value.is_null() && !rule.checks_null() {
                continue;
            }
            let Some(validator) = self.find(rule) else {
                warn!(
                    field = %field.name,
                    rule = rule.name(),
                    "No validator registered for rule, skipping"
                );
                continue;
            };
            if let Err(violation) = validator.check(field, rule, value, ctx) {
                violations.push(violation);
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(&field.name, violations))
        }
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
