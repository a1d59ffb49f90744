//! Field-level metadata

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::TypeDescriptor;
use crate::validation::Rule;

/// A declarative annotation attached to a field or type.
///
/// The binder itself only consumes the resolved [`FieldMeta`] properties; annotations
/// are kept so that custom casters, transformers and validators can read extra policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub arguments: Map<String, Value>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}

/// Structural and policy description of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub immutable: bool,
    /// Raw default used when the input does not carry the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Input key (or dotted path) read instead of the naming-strategy key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,
    /// Output key written instead of the naming-strategy key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    /// Name of a caster that always handles this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caster: Option<String>,
    /// Name of a transformer that always handles this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Temporal format used for both parsing and rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            immutable: false,
            default: None,
            source_key: None,
            output_key: None,
            caster: None,
            transformer: None,
            hidden: false,
            rules: Vec::new(),
            format: None,
            annotations: Vec::new(),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A field must be present in the input when it has no default and rejects null
    pub fn is_required(&self) -> bool {
        !self.has_default() && !self.ty.nullable
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Read this field from `key` instead of the naming-strategy key
    pub fn map_from(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Write this field under `key` on output
    pub fn map_to(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Use `key` for both input and output
    pub fn map_name(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.map_from(key.clone()).map_to(key)
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn cast_with(mut self, caster: impl Into<String>) -> Self {
        self.caster = Some(caster.into());
        self
    }

    pub fn transform_with(mut self, transformer: impl Into<String>) -> Self {
        self.transformer = Some(transformer.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Find an annotation by name
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Metadata used for the items of a typed collection field.
    ///
    /// Keeps the field's name, format and overrides so that per-item casting and
    /// rendering follow the same policy; returns `None` for untyped collections.
    pub fn for_item(&self) -> Option<FieldMeta> {
        let item = self.ty.item_type()?.clone();
        Some(FieldMeta {
            ty: item,
            default: None,
            rules: Vec::new(),
            ..self.clone()
        })
    }

    /// Metadata for a value that has no declared field (computed output)
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self::new(name, TypeDescriptor::any().nullable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_derivation() {
        assert!(FieldMeta::new("id", TypeDescriptor::string()).is_required());
        assert!(!FieldMeta::new("nick", TypeDescriptor::string().nullable()).is_required());
        assert!(
            !FieldMeta::new("role", TypeDescriptor::string())
                .with_default("member")
                .is_required()
        );
    }

    #[test]
    fn test_map_name_sets_both_directions() {
        let field = FieldMeta::new("email", TypeDescriptor::string()).map_name("email_address");
        assert_eq!(field.source_key.as_deref(), Some("email_address"));
        assert_eq!(field.output_key.as_deref(), Some("email_address"));
    }

    #[test]
    fn test_for_item_keeps_policy() {
        let field = FieldMeta::new("dates", TypeDescriptor::list(TypeDescriptor::date()))
            .format("%d/%m/%Y")
            .rule(Rule::Required);
        let item = field.for_item().unwrap();
        assert_eq!(item.ty, TypeDescriptor::date());
        assert_eq!(item.format.as_deref(), Some("%d/%m/%Y"));
        assert!(item.rules.is_empty());

        let untyped = FieldMeta::new("bag", TypeDescriptor::untyped_list());
        assert!(untyped.for_item().is_none());
    }

    #[test]
    fn test_annotation_lookup() {
        let field = FieldMeta::new("price", TypeDescriptor::float())
            .annotate(Annotation::new("currency").with_argument("code", "EUR"));
        assert_eq!(
            field.annotation("currency").unwrap().argument("code"),
            Some(&json!("EUR"))
        );
        assert!(field.annotation("missing").is_none());
    }
}
