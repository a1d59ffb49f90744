//! Normalizer: typed instances back to ordered key/value maps

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::error::NormalizeError;
use super::transformers::TransformerRegistry;
use crate::context::{Context, Direction};
use crate::metadata::{ClassMeta, FieldMeta, MetadataFactory};
use crate::model::{Computed, Structured, Typed};

/// Turns instances into output maps.
///
/// Declared fields come first, in declaration order, followed by computed fields.
/// Nested instances deeper than the filter's `max_depth` are emitted as `{}`.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    factory: &'a MetadataFactory,
    transformers: &'a TransformerRegistry,
}

impl<'a> Normalizer<'a> {
    pub fn new(factory: &'a MetadataFactory, transformers: &'a TransformerRegistry) -> Self {
        Self {
            factory,
            transformers,
        }
    }

    /// Normalize a top-level instance, applying the filter's wrap key
    pub fn serialize(
        &self,
        instance: &dyn Structured,
        ctx: &Context,
    ) -> Result<Map<String, Value>, NormalizeError> {
        let meta = self.factory.get_registered(&instance.registration())?;
        let map = self.normalize(instance, &meta, ctx, 0)?;

        Ok(match &ctx.filter().wrap {
            Some(key) => {
                let mut wrapped = Map::new();
                wrapped.insert(key.clone(), Value::Object(map));
                wrapped
            }
            None => map,
        })
    }

    /// Normalize `instance` described by `meta`, at nesting `depth` (0 for the root)
    pub fn normalize(
        &self,
        instance: &dyn Structured,
        meta: &ClassMeta,
        ctx: &Context,
        depth: usize,
    ) -> Result<Map<String, Value>, NormalizeError> {
        let filter = ctx.filter();
        let computed = instance.derived_fields();
        let mut seen = HashSet::new();
        for name in computed.names() {
            if meta.has_field(name) {
                return Err(NormalizeError::ComputedCollision {
                    type_id: meta.type_id.clone(),
                    field: name.to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(NormalizeError::DuplicateComputed {
                    type_id: meta.type_id.clone(),
                    field: name.to_string(),
                });
            }
        }

        let mut out = Map::new();

        for field in &meta.fields {
            if field.hidden || !filter.allows(&field.name) {
                continue;
            }
            let value = instance
                .read_field(&field.name)
                .ok_or_else(|| NormalizeError::MissingValue {
                    type_id: meta.type_id.clone(),
                    field: field.name.clone(),
                })?;
            let rendered = self.render(field, value, ctx, depth)?;
            out.insert(output_key(field, ctx), rendered);
        }

        for (name, entry) in computed {
            if !filter.allows(&name) {
                continue;
            }
            let value = match entry {
                Computed::Value(value) => value,
                Computed::Lazy(compute) if filter.wants_lazy(&name) => compute(),
                Computed::Lazy(_) => continue,
            };
            let field = FieldMeta::synthetic(name);
            let rendered = self.render(&field, value, ctx, depth)?;
            out.insert(output_key(&field, ctx), rendered);
        }

        Ok(out)
    }

    fn render(
        &self,
        field: &FieldMeta,
        value: Typed,
        ctx: &Context,
        depth: usize,
    ) -> Result<Value, NormalizeError> {
        match value {
            Typed::Null => Ok(Value::Null),
            Typed::Object(nested) => self.nested(field, nested.as_ref(), ctx, depth),
            Typed::List(items) => {
                let item_field = field.for_item().unwrap_or_else(|| field.clone());
                items
                    .into_iter()
                    .map(|item| self.render(&item_field, item, ctx, depth))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            leaf => self.transform(field, &leaf, ctx),
        }
    }

    fn nested(
        &self,
        field: &FieldMeta,
        nested: &dyn Structured,
        ctx: &Context,
        depth: usize,
    ) -> Result<Value, NormalizeError> {
        if depth + 1 > ctx.filter().max_depth {
            return Ok(Value::Object(Map::new()));
        }
        let meta = self.factory.get_registered(&nested.registration())?;
        let scoped = ctx.scoped(&field.name);
        self.normalize(nested, &meta, &scoped, depth + 1)
            .map(Value::Object)
    }

    fn transform(
        &self,
        field: &FieldMeta,
        value: &Typed,
        ctx: &Context,
    ) -> Result<Value, NormalizeError> {
        let transformer = match &field.transformer {
            Some(name) => self.transformers.by_name(name).ok_or_else(|| {
                NormalizeError::UnknownTransformer {
                    field: field.name.clone(),
                    transformer: name.clone(),
                }
            })?,
            None => self.transformers.find(field, value).ok_or_else(|| {
                NormalizeError::transform(
                    &field.name,
                    format!("no transformer for {} value", value.kind_name()),
                )
            })?,
        };
        transformer.transform(field, value, ctx)
    }
}

/// Output key of a field: `output_key`, else the naming strategy's outbound name
pub fn output_key(field: &FieldMeta, ctx: &Context) -> String {
    match &field.output_key {
        Some(key) => key.clone(),
        None => ctx.naming().convert(&field.name, Direction::Outbound),
    }
}
