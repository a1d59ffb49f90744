//! Metadata factory: builds class metadata once and serves it from the cache

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use super::cache::{InMemoryCache, MetadataCache};
use super::class::ClassMeta;
use super::error::MetadataError;
use super::types::{TypeDescriptor, TypeKind};
use crate::model::{Bindable, TypeRegistration};

/// Builds, validates and caches [`ClassMeta`] for bindable types.
///
/// The factory also acts as the type registry: every type it has seen (directly or
/// as a nested field type) can later be resolved by its type id, which is how the
/// hydrator finds the constructor of a nested type.
///
/// Metadata served by a persistent cache carries no nested registrations, so the
/// first time a type is seen in this process its description is walked once for the
/// nested types it references.
pub struct MetadataFactory {
    cache: Arc<dyn MetadataCache>,
    types: RwLock<HashMap<String, TypeRegistration>>,
    walked: RwLock<HashSet<&'static str>>,
}

impl MetadataFactory {
    /// Create a factory with a process-lifetime in-memory cache
    pub fn new() -> Self {
        Self::with_cache(Arc::new(InMemoryCache::new()))
    }

    /// Create a factory backed by a custom cache
    pub fn with_cache(cache: Arc<dyn MetadataCache>) -> Self {
        Self {
            cache,
            types: RwLock::new(HashMap::new()),
            walked: RwLock::new(HashSet::new()),
        }
    }

    /// The cache this factory reads and writes
    pub fn cache(&self) -> &Arc<dyn MetadataCache> {
        &self.cache
    }

    /// Make a type resolvable by id without building its metadata yet
    pub fn register(&self, registration: TypeRegistration) {
        if self.registration(registration.type_id).is_some() {
            return;
        }
        let mut types = match self.types.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        types
            .entry(registration.type_id.to_string())
            .or_insert(registration);
    }

    /// Registration for a type id, if known
    pub fn registration(&self, type_id: &str) -> Option<TypeRegistration> {
        let types = match self.types.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        types.get(type_id).cloned()
    }

    /// Registration for a nested field type: the descriptor's own, else by id
    pub fn resolve_registration(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<TypeRegistration, MetadataError> {
        if let Some(registration) = &descriptor.registration {
            self.register(registration.clone());
            return Ok(registration.clone());
        }
        self.registration(&descriptor.name)
            .ok_or_else(|| MetadataError::UnknownType(descriptor.name.clone()))
    }

    /// Metadata for `T`
    pub fn get<T: Bindable>(&self) -> Result<Arc<ClassMeta>, MetadataError> {
        self.get_registered(&TypeRegistration::of::<T>())
    }

    /// Metadata for a registered type, building and caching it on first use
    pub fn get_registered(
        &self,
        registration: &TypeRegistration,
    ) -> Result<Arc<ClassMeta>, MetadataError> {
        self.register(registration.clone());

        if let Some(meta) = self.cache.get(registration.type_id) {
            trace!(type_id = registration.type_id, "Class metadata cache hit");
            if !self.is_walked(registration.type_id) {
                self.register_nested(&(registration.describe)());
                self.mark_walked(registration.type_id);
            }
            return Ok(meta);
        }

        let meta = (registration.describe)();
        if meta.type_id != registration.type_id {
            return Err(MetadataError::TypeMismatch {
                registered: registration.type_id.to_string(),
                described: meta.type_id,
            });
        }
        meta.check()?;
        self.register_nested(&meta);
        self.mark_walked(registration.type_id);

        debug!(
            type_id = %meta.type_id,
            fields = meta.fields.len(),
            "Built class metadata"
        );
        Ok(self.cache.put(Arc::new(meta)))
    }

    /// Metadata for a type id that is cached or registered
    pub fn get_by_id(&self, type_id: &str) -> Result<Arc<ClassMeta>, MetadataError> {
        if let Some(registration) = self.registration(type_id) {
            return self.get_registered(&registration);
        }
        match self.cache.get(type_id) {
            Some(meta) => {
                trace!(type_id, "Class metadata cache hit");
                Ok(meta)
            }
            None => Err(MetadataError::UnknownType(type_id.to_string())),
        }
    }

    /// Metadata for the type a nested descriptor points at
    pub fn get_for_descriptor(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<ClassMeta>, MetadataError> {
        match &descriptor.registration {
            Some(registration) => self.get_registered(registration),
            None => self.get_by_id(&descriptor.name),
        }
    }

    fn is_walked(&self, type_id: &str) -> bool {
        match self.walked.read() {
            Ok(guard) => guard.contains(type_id),
            Err(poisoned) => poisoned.into_inner().contains(type_id),
        }
    }

    fn mark_walked(&self, type_id: &'static str) {
        let mut walked = match self.walked.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        walked.insert(type_id);
    }

    fn register_nested(&self, meta: &ClassMeta) {
        fn walk(factory: &MetadataFactory, descriptor: &TypeDescriptor) {
            if descriptor.kind == TypeKind::Object {
                if let Some(registration) = &descriptor.registration {
                    factory.register(registration.clone());
                }
            }
            if let Some(item) = descriptor.item_type() {
                walk(factory, item);
            }
        }

        for field in &meta.fields {
            walk(self, &field.ty);
        }
    }
}

impl Default for MetadataFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetadataFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = match self.types.read() {
            Ok(guard) => guard.keys().cloned().collect::<Vec<_>>(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        f.debug_struct("MetadataFactory")
            .field("cached", &self.cache.len())
            .field("types", &types)
            .finish()
    }
}
