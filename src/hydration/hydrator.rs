//! Hydrator: raw maps to typed instances

use serde_json::{Map, Value};
use tracing::debug;

use super::casters::{Caster, CasterRegistry};
use super::error::{CastError, FieldFailure, HydrationError, MappingError};
use super::mapper::Mapper;
use crate::context::{CastMode, Context};
use crate::metadata::{
    ClassMeta, FieldMeta, MetadataError, MetadataFactory, TypeDescriptor, TypeKind,
};
use crate::model::{Arguments, Structured, TypeRegistration, Typed};
use crate::validation::{ValidationContext, ValidatorRegistry};

type Failures = Vec<FieldFailure>;

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn cast_failure(
    field: &FieldMeta,
    value: &Value,
    path: &str,
    reason: impl Into<String>,
) -> Failures {
    vec![FieldFailure::new(
        path,
        CastError::new(&field.name, field.ty.name.clone(), value, reason),
    )]
}

/// Builds typed instances from raw input maps.
///
/// Every field is processed even after an earlier one failed, so a single
/// [`HydrationError`] reports all problems of the input, including those of nested
/// objects and list items.
#[derive(Debug, Clone, Copy)]
pub struct Hydrator<'a> {
    factory: &'a MetadataFactory,
    casters: &'a CasterRegistry,
    validators: &'a ValidatorRegistry,
}

impl<'a> Hydrator<'a> {
    pub fn new(
        factory: &'a MetadataFactory,
        casters: &'a CasterRegistry,
        validators: &'a ValidatorRegistry,
    ) -> Self {
        Self {
            factory,
            casters,
            validators,
        }
    }

    /// Hydrate an instance of the type described by `meta`
    pub fn hydrate(
        &self,
        meta: &ClassMeta,
        input: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<Box<dyn Structured>, HydrationError> {
        let registration = self
            .factory
            .registration(&meta.type_id)
            .ok_or_else(|| {
                HydrationError::new(
                    &meta.type_id,
                    vec![FieldFailure::new(
                        &meta.type_id,
                        MetadataError::UnknownType(meta.type_id.clone()),
                    )],
                )
            })?;

        self.build(meta, registration, input, ctx, "").map_err(|failures| {
            debug!(
                type_id = %meta.type_id,
                failures = failures.len(),
                "Hydration failed"
            );
            HydrationError::new(&meta.type_id, failures)
        })
    }

    /// Run only mapping and rule validation over `input`, collecting all failures
    pub fn validate(
        &self,
        meta: &ClassMeta,
        input: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<(), HydrationError> {
        let mut failures = Vec::new();
        self.validate_fields(meta, input, ctx, "", &mut failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(HydrationError::new(&meta.type_id, failures))
        }
    }

    fn build(
        &self,
        meta: &ClassMeta,
        registration: TypeRegistration,
        input: &Map<String, Value>,
        ctx: &Context,
        prefix: &str,
    ) -> Result<Box<dyn Structured>, Failures> {
        let mut failures = Vec::new();
        let mut args = self.collect(meta, input, ctx, prefix, &mut failures);
        if !failures.is_empty() {
            return Err(failures);
        }

        (registration.construct)(&mut args)
            .map_err(|e| vec![FieldFailure::new(join(prefix, e.field()), e)])
    }

    fn collect(
        &self,
        meta: &ClassMeta,
        input: &Map<String, Value>,
        ctx: &Context,
        prefix: &str,
        failures: &mut Failures,
    ) -> Arguments {
        let mut args = Arguments::new(&meta.type_id);

        for field in meta.ordered_fields() {
            let path = join(prefix, &field.name);
            let mapped = Mapper::resolve(field, input, ctx);

            let result = match mapped.value {
                None => match &field.default {
                    Some(default) => self.cast_field(field, default, ctx, &path),
                    None if field.ty.nullable => self
                        .check_rules(field, &Value::Null, input, ctx, &path)
                        .map(|_| Typed::Null),
                    None => Err(vec![FieldFailure::new(
                        &path,
                        MappingError::MissingKey {
                            field: field.name.clone(),
                            key: mapped.key,
                        },
                    )]),
                },
                Some(raw) => {
                    let value = apply_pipeline(field, raw, ctx);
                    self.check_rules(field, &value, input, ctx, &path)
                        .and_then(|_| self.cast_field(field, &value, ctx, &path))
                }
            };

            match result {
                Ok(typed) => args.push(field.name.clone(), typed),
                Err(field_failures) => failures.extend(field_failures),
            }
        }

        args
    }

    fn check_rules(
        &self,
        field: &FieldMeta,
        value: &Value,
        input: &Map<String, Value>,
        ctx: &Context,
        path: &str,
    ) -> Result<(), Failures> {
        if !ctx.validation_enabled() || field.rules.is_empty() {
            return Ok(());
        }
        self.validators
            .validate(field, value, &ValidationContext::new(input, ctx))
            .map_err(|e| vec![FieldFailure::new(path, e)])
    }

    fn cast_field(
        &self,
        field: &FieldMeta,
        value: &Value,
        ctx: &Context,
        path: &str,
    ) -> Result<Typed, Failures> {
        if value.is_null() {
            return if field.ty.nullable {
                Ok(Typed::Null)
            } else {
                Err(cast_failure(field, value, path, "null is not allowed"))
            };
        }

        // list overrides apply to each item
        if field.ty.kind == TypeKind::List {
            return self.cast_list(field, value, ctx, path);
        }

        if let Some(name) = field.caster.as_deref() {
            return match self.casters.by_name(name) {
                Some(caster) => self.leaf(caster.as_ref(), field, value, ctx, path),
                None => Err(cast_failure(
                    field,
                    value,
                    path,
                    format!("no caster named '{}'", name),
                )),
            };
        }

        if field.ty.kind == TypeKind::Object {
            return self.cast_object(&field.ty, field, value, ctx, path);
        }

        match self.casters.find(field, value) {
            Some(caster) => self.leaf(caster.as_ref(), field, value, ctx, path),
            None => Ok(Typed::Raw(value.clone())),
        }
    }

    fn leaf(
        &self,
        caster: &dyn Caster,
        field: &FieldMeta,
        value: &Value,
        ctx: &Context,
        path: &str,
    ) -> Result<Typed, Failures> {
        match caster.cast(field, value, ctx) {
            Ok(typed) => Ok(typed),
            Err(e) if permissive_null(field, ctx) => {
                debug!(
                    path,
                    caster = caster.name(),
                    "Permissive cast failed, using null: {}",
                    e
                );
                Ok(Typed::Null)
            }
            Err(e) => Err(vec![FieldFailure::new(path, e)]),
        }
    }

    /// A value of the wrong shape for a list or object field
    fn mismatch(
        &self,
        field: &FieldMeta,
        value: &Value,
        ctx: &Context,
        path: &str,
        reason: &str,
    ) -> Result<Typed, Failures> {
        if permissive_null(field, ctx) {
            debug!(path, "Permissive cast failed, using null: {}", reason);
            return Ok(Typed::Null);
        }
        Err(cast_failure(field, value, path, reason))
    }

    fn cast_list(
        &self,
        field: &FieldMeta,
        value: &Value,
        ctx: &Context,
        path: &str,
    ) -> Result<Typed, Failures> {
        let Value::Array(items) = value else {
            return self.mismatch(field, value, ctx, path, "expected a list");
        };
        let Some(item_field) = field.for_item() else {
            return Ok(Typed::List(items.iter().cloned().map(Typed::Raw).collect()));
        };

        let mut typed = Vec::with_capacity(items.len());
        let mut failures = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", path, idx);
            match self.cast_field(&item_field, item, ctx, &item_path) {
                Ok(value) => typed.push(value),
                Err(item_failures) => failures.extend(item_failures),
            }
        }

        if failures.is_empty() {
            Ok(Typed::List(typed))
        } else {
            Err(failures)
        }
    }

    fn cast_object(
        &self,
        descriptor: &TypeDescriptor,
        field: &FieldMeta,
        value: &Value,
        ctx: &Context,
        path: &str,
    ) -> Result<Typed, Failures> {
        let Value::Object(map) = value else {
            return self.mismatch(field, value, ctx, path, "expected an object");
        };
        let (meta, registration) = self
            .factory
            .get_for_descriptor(descriptor)
            .and_then(|meta| Ok((meta, self.factory.resolve_registration(descriptor)?)))
            .map_err(|e| vec![FieldFailure::new(path, e)])?;

        self.build(&meta, registration, map, ctx, path)
            .map(Typed::Object)
    }

    fn validate_fields(
        &self,
        meta: &ClassMeta,
        input: &Map<String, Value>,
        ctx: &Context,
        prefix: &str,
        failures: &mut Failures,
    ) {
        for field in meta.ordered_fields() {
            let path = join(prefix, &field.name);
            let mapped = Mapper::resolve(field, input, ctx);

            let value = match mapped.value {
                Some(raw) => apply_pipeline(field, raw, ctx),
                None if field.is_required() => {
                    failures.push(FieldFailure::new(
                        &path,
                        MappingError::MissingKey {
                            field: field.name.clone(),
                            key: mapped.key,
                        },
                    ));
                    continue;
                }
                None if field.has_default() => continue,
                None => Value::Null,
            };

            if !field.rules.is_empty() {
                if let Err(e) = self
                    .validators
                    .validate(field, &value, &ValidationContext::new(input, ctx))
                {
                    failures.push(FieldFailure::new(&path, e));
                }
            }

            self.validate_nested(&field.ty, &value, ctx, &path, failures);
        }
    }

    fn validate_nested(
        &self,
        descriptor: &TypeDescriptor,
        value: &Value,
        ctx: &Context,
        path: &str,
        failures: &mut Failures,
    ) {
        match (descriptor.kind, value) {
            (TypeKind::Object, Value::Object(map)) => {
                match self.factory.get_for_descriptor(descriptor) {
                    Ok(meta) => self.validate_fields(&meta, map, ctx, path, failures),
                    Err(e) => failures.push(FieldFailure::new(path, e)),
                }
            }
            (TypeKind::List, Value::Array(items)) => {
                if let Some(item) = descriptor.item_type() {
                    for (idx, value) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", path, idx);
                        self.validate_nested(item, value, ctx, &item_path, failures);
                    }
                }
            }
            _ => {}
        }
    }
}

fn permissive_null(field: &FieldMeta, ctx: &Context) -> bool {
    ctx.cast_mode() == CastMode::Permissive && field.ty.nullable
}

fn apply_pipeline(field: &FieldMeta, raw: &Value, ctx: &Context) -> Value {
    ctx.pipeline()
        .iter()
        .fold(raw.clone(), |value, pipe| pipe.apply(field, value, ctx))
}
