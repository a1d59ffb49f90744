//! Metadata cache contract and the in-memory implementation

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::class::ClassMeta;

/// Key → ClassMeta store shared by every lookup of the metadata factory.
///
/// Implementations must be safe to share between threads. Two callers may race to
/// populate the same key; `put` resolves the race by returning the entry that is
/// kept, so both callers end up with the same `Arc`.
pub trait MetadataCache: Send + Sync {
    /// Cached metadata for a type id
    fn get(&self, type_id: &str) -> Option<Arc<ClassMeta>>;

    /// Store metadata, returning the entry now cached under its type id
    fn put(&self, meta: Arc<ClassMeta>) -> Arc<ClassMeta>;

    /// Drop every entry
    fn clear(&self);

    /// Number of cached entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime cache backed by a hash map
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Arc<ClassMeta>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataCache for InMemoryCache {
    fn get(&self, type_id: &str) -> Option<Arc<ClassMeta>> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(type_id).cloned()
    }

    fn put(&self, meta: Arc<ClassMeta>) -> Arc<ClassMeta> {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // first writer wins; a concurrent duplicate build is discarded
        Arc::clone(entries.entry(meta.type_id.clone()).or_insert(meta))
    }

    fn clear(&self) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.clear();
    }

    fn len(&self) -> usize {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FieldMeta, TypeDescriptor};

    fn meta(type_id: &str) -> Arc<ClassMeta> {
        Arc::new(
            ClassMeta::builder(type_id)
                .field(FieldMeta::new("id", TypeDescriptor::int()))
                .build(),
        )
    }

    #[test]
    fn test_put_then_get_returns_same_arc() {
        let cache = InMemoryCache::new();
        let stored = cache.put(meta("User"));
        let fetched = cache.get("User").unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_second_put_loses() {
        let cache = InMemoryCache::new();
        let first = cache.put(meta("User"));
        let second = cache.put(meta("User"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_clear() {
        let cache = InMemoryCache::new();
        cache.put(meta("A"));
        cache.put(meta("B"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("A").is_none());
    }
}
