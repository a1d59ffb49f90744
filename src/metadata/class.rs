//! Type-level metadata

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::MetadataError;
use super::field::{Annotation, FieldMeta};
use super::types::{TypeDescriptor, TypeKind};
use crate::validation::Rule;

/// Cached structural description of one bindable type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMeta {
    pub type_id: String,
    #[serde(default)]
    pub immutable: bool,
    pub fields: Vec<FieldMeta>,
    /// Field names in the order they are resolved and handed to the constructor
    pub construction_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ClassMeta {
    /// Start describing a type
    pub fn builder(type_id: impl Into<String>) -> ClassMetaBuilder {
        ClassMetaBuilder {
            type_id: type_id.into(),
            immutable: false,
            fields: Vec::new(),
            construction_order: None,
            annotations: Vec::new(),
        }
    }

    /// Look up a field by declared name
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a field with this declared name exists
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields in construction order, followed by any declared field the order omits
    pub fn ordered_fields(&self) -> impl Iterator<Item = &FieldMeta> {
        let ordered = self
            .construction_order
            .iter()
            .filter_map(move |name| self.field(name));
        let rest = self
            .fields
            .iter()
            .filter(move |f| !self.construction_order.contains(&f.name));
        ordered.chain(rest)
    }

    /// Fields that must be present in the input
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.iter().filter(|f| f.is_required())
    }

    /// Check the invariants every cached ClassMeta satisfies
    pub fn check(&self) -> Result<(), MetadataError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(MetadataError::DuplicateField {
                    type_id: self.type_id.clone(),
                    field: field.name.clone(),
                });
            }
            check_descriptor(&self.type_id, &field.name, &field.ty)?;
            for rule in &field.rules {
                check_rule(&self.type_id, &field.name, rule)?;
            }
        }

        let mut ordered = HashSet::new();
        for name in &self.construction_order {
            if !seen.contains(name.as_str()) || !ordered.insert(name.as_str()) {
                return Err(MetadataError::ConstructionOrder {
                    type_id: self.type_id.clone(),
                    field: name.clone(),
                });
            }
        }

        Ok(())
    }
}

fn check_descriptor(
    type_id: &str,
    field: &str,
    descriptor: &TypeDescriptor,
) -> Result<(), MetadataError> {
    let invalid = |reason: &str| MetadataError::InvalidDescriptor {
        type_id: type_id.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    match descriptor.kind {
        TypeKind::Enum if descriptor.enum_meta.is_none() => {
            Err(invalid("enum field declares no enum type"))
        }
        TypeKind::Enum => match &descriptor.enum_meta {
            Some(meta) if meta.cases.is_empty() => Err(invalid("enum type has no cases")),
            _ => Ok(()),
        },
        TypeKind::Object if descriptor.name.is_empty() => {
            Err(invalid("nested type has no type id"))
        }
        TypeKind::List => match descriptor.item_type() {
            Some(item) => check_descriptor(type_id, field, item),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn check_rule(type_id: &str, field: &str, rule: &Rule) -> Result<(), MetadataError> {
    let invalid = |reason: String| MetadataError::InvalidRule {
        type_id: type_id.to_string(),
        field: field.to_string(),
        rule: rule.name().to_string(),
        reason,
    };

    match rule {
        Rule::Pattern(pattern) => Regex::new(pattern)
            .map(|_| ())
            .map_err(|e| invalid(e.to_string())),
        Rule::Between { min, max } if min > max => {
            Err(invalid(format!("min {} is greater than max {}", min, max)))
        }
        Rule::Length {
            min: Some(min),
            max: Some(max),
        } if min > max => Err(invalid(format!(
            "min length {} is greater than max length {}",
            min, max
        ))),
        _ => Ok(()),
    }
}

/// Builder for [`ClassMeta`]
#[derive(Debug)]
pub struct ClassMetaBuilder {
    type_id: String,
    immutable: bool,
    fields: Vec<FieldMeta>,
    construction_order: Option<Vec<String>>,
    annotations: Vec<Annotation>,
}

impl ClassMetaBuilder {
    /// Declare a field
    pub fn field(mut self, field: FieldMeta) -> Self {
        self.fields.push(field);
        self
    }

    /// Mark every field of the type as immutable
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Override the order fields are resolved and passed to the constructor
    pub fn construction_order<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.construction_order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn build(self) -> ClassMeta {
        let immutable = self.immutable;
        let fields: Vec<FieldMeta> = self
            .fields
            .into_iter()
            .map(|mut f| {
                f.immutable |= immutable;
                f
            })
            .collect();
        let construction_order = self
            .construction_order
            .unwrap_or_else(|| fields.iter().map(|f| f.name.clone()).collect());

        ClassMeta {
            type_id: self.type_id,
            immutable,
            fields,
            construction_order,
            annotations: self.annotations,
        }
    }
}
