//! The binding engine facade
//!
//! A [`Binder`] owns the metadata factory and the strategy registries. Create one
//! per application (or per configuration) and pass it by reference; it is
//! `Send + Sync` and every operation takes `&self`.
//!
//! ```rust,ignore
//! use data_binding_sdk::{Binder, Context};
//!
//! let binder = Binder::new();
//! let ctx = Context::default();
//! let user: User = binder.bind(json!({ "name": "Ada", "age": "36" }), &ctx)?;
//! let json = binder.to_json(&user, &ctx)?;
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::context::Context;
use crate::hydration::{
    Caster, CasterRegistry, FieldFailure, HydrationError, Hydrator, Input, InputAdapter,
    InputAdapters, InputError,
};
use crate::metadata::{ClassMeta, InMemoryCache, MetadataCache, MetadataError, MetadataFactory};
#[cfg(feature = "persistent-cache")]
use crate::metadata::PersistentCache;
use crate::model::{Bindable, Structured};
use crate::normalization::{NormalizeError, Normalizer, Transformer, TransformerRegistry};
use crate::validation::{RuleValidator, ValidatorRegistry};

/// Errors from the binder's top-level operations
#[derive(Error, Debug)]
pub enum BindError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Hydration(#[from] HydrationError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("Hydrated a {found} where a {expected} was expected")]
    TypeMismatch { expected: String, found: String },

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Metadata factory plus caster, transformer, validator and input registries
#[derive(Debug)]
pub struct Binder {
    factory: MetadataFactory,
    casters: CasterRegistry,
    transformers: TransformerRegistry,
    validators: ValidatorRegistry,
    inputs: InputAdapters,
}

impl Binder {
    /// A binder with the built-in strategies and an in-memory metadata cache
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> BinderBuilder {
        BinderBuilder::new()
    }

    pub fn factory(&self) -> &MetadataFactory {
        &self.factory
    }

    pub fn casters(&self) -> &CasterRegistry {
        &self.casters
    }

    pub fn transformers(&self) -> &TransformerRegistry {
        &self.transformers
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    pub fn inputs(&self) -> &InputAdapters {
        &self.inputs
    }

    pub fn hydrator(&self) -> Hydrator<'_> {
        Hydrator::new(&self.factory, &self.casters, &self.validators)
    }

    pub fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.factory, &self.transformers)
    }

    /// Build and cache the metadata of `T` (and register its nested types)
    pub fn register<T: Bindable>(&self) -> Result<Arc<ClassMeta>, MetadataError> {
        self.factory.get::<T>()
    }

    pub fn metadata<T: Bindable>(&self) -> Result<Arc<ClassMeta>, MetadataError> {
        self.factory.get::<T>()
    }

    /// Bind raw input to a new `T`
    pub fn bind<T: Bindable>(
        &self,
        input: impl Into<Input>,
        ctx: &Context,
    ) -> Result<T, BindError> {
        let map = self.inputs.adapt(input.into())?;
        let meta = self.factory.get::<T>()?;
        let instance = self.hydrator().hydrate(&meta, &map, ctx)?;

        let found = instance.bind_type();
        instance.downcast::<T>().ok_or_else(|| BindError::TypeMismatch {
            expected: T::TYPE_ID.to_string(),
            found: found.to_string(),
        })
    }

    /// Hydrate an instance of the type `meta` describes
    pub fn hydrate(
        &self,
        meta: &ClassMeta,
        input: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<Box<dyn Structured>, HydrationError> {
        self.hydrator().hydrate(meta, input, ctx)
    }

    /// Check `input` against the rules of `T` without casting or constructing
    pub fn validate<T: Bindable>(
        &self,
        input: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<(), HydrationError> {
        let meta = self
            .factory
            .get::<T>()
            .map_err(|e| HydrationError::new(T::TYPE_ID, vec![FieldFailure::new(T::TYPE_ID, e)]))?;
        self.hydrator().validate(&meta, input, ctx)
    }

    /// Normalize an instance to an ordered map
    pub fn serialize(
        &self,
        instance: &dyn Structured,
        ctx: &Context,
    ) -> Result<Map<String, Value>, NormalizeError> {
        self.normalizer().serialize(instance, ctx)
    }

    pub fn to_value(
        &self,
        instance: &dyn Structured,
        ctx: &Context,
    ) -> Result<Value, NormalizeError> {
        self.serialize(instance, ctx).map(Value::Object)
    }

    /// Normalize an instance and encode it as JSON text
    pub fn to_json(&self, instance: &dyn Structured, ctx: &Context) -> Result<String, BindError> {
        let map = self.serialize(instance, ctx)?;
        Ok(serde_json::to_string(&map)?)
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configures a [`Binder`]: metadata cache and additional strategies.
///
/// Strategies registered here join the built-ins; a higher priority is consulted
/// first, and ties keep registration order (built-ins are registered first, at
/// priority 0).
pub struct BinderBuilder {
    cache: Option<Arc<dyn MetadataCache>>,
    casters: CasterRegistry,
    transformers: TransformerRegistry,
    validators: ValidatorRegistry,
    inputs: InputAdapters,
}

impl BinderBuilder {
    pub fn new() -> Self {
        Self {
            cache: None,
            casters: CasterRegistry::with_builtins(),
            transformers: TransformerRegistry::with_builtins(),
            validators: ValidatorRegistry::with_builtins(),
            inputs: InputAdapters::with_builtins(),
        }
    }

    pub fn cache(mut self, cache: Arc<dyn MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Persist metadata as JSON files under `dir`
    #[cfg(feature = "persistent-cache")]
    pub fn persistent_cache(self, dir: impl AsRef<std::path::Path>) -> Self {
        self.cache(Arc::new(PersistentCache::new(dir)))
    }

    pub fn caster(mut self, caster: Arc<dyn Caster>, priority: i32) -> Self {
        self.casters.register(caster, priority);
        self
    }

    pub fn transformer(mut self, transformer: Arc<dyn Transformer>, priority: i32) -> Self {
        self.transformers.register(transformer, priority);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn RuleValidator>, priority: i32) -> Self {
        self.validators.register(validator, priority);
        self
    }

    pub fn input_adapter(mut self, adapter: Arc<dyn InputAdapter>, priority: i32) -> Self {
        self.inputs.register(adapter, priority);
        self
    }

    pub fn build(self) -> Binder {
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemoryCache::new()) as Arc<dyn MetadataCache>);
        Binder {
            factory: MetadataFactory::with_cache(cache),
            casters: self.casters,
            transformers: self.transformers,
            validators: self.validators,
            inputs: self.inputs,
        }
    }
}

impl Default for BinderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Binder>();
    }

    #[test]
    fn test_builder_adds_to_builtins() {
        let builtins = Binder::new();
        let extended = Binder::builder()
            .validator(Arc::new(crate::validation::FnValidator::new("even", |_, _, _| None)), 5)
            .build();
        assert_eq!(extended.validators().len(), builtins.validators().len() + 1);
    }
}
