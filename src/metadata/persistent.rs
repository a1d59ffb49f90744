//! File-backed metadata cache
//!
//! Each type is stored as one JSON file named by the SHA-256 of its type id. Entries
//! are read once on a cold start and then served from memory. Anything that cannot be
//! read back (missing file, truncated JSON, old format, hash collision) counts as a
//! miss; the factory rebuilds the metadata and the next write replaces the file.
//!
//! Nested type registrations are not persisted. Nested types referenced by a loaded
//! entry are resolved by type id, so they must have been registered with the factory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::cache::{InMemoryCache, MetadataCache};
use super::class::ClassMeta;

/// Bumped whenever the serialized ClassMeta layout changes
const FORMAT_VERSION: u32 = 1;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    meta: ClassMeta,
}

/// Metadata cache persisted to a directory
#[derive(Debug)]
pub struct PersistentCache {
    dir: PathBuf,
    memory: InMemoryCache,
}

impl PersistentCache {
    /// Create a cache rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            memory: InMemoryCache::new(),
        }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds (or would hold) the entry for a type id
    pub fn entry_path(&self, type_id: &str) -> PathBuf {
        let digest = Sha256::digest(type_id.as_bytes());
        let name: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        self.dir.join(format!("{}.json", name))
    }

    fn load(&self, type_id: &str) -> Option<ClassMeta> {
        let path = self.entry_path(type_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(type_id, path = %path.display(), "No cached metadata: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.version != FORMAT_VERSION => {
                debug!(
                    type_id,
                    version = entry.version,
                    "Ignoring metadata cached with another format version"
                );
                None
            }
            Ok(entry) if entry.meta.type_id != type_id => {
                warn!(
                    type_id,
                    cached = %entry.meta.type_id,
                    "Cached metadata belongs to another type, ignoring"
                );
                None
            }
            Ok(entry) => match entry.meta.check() {
                Ok(()) => Some(entry.meta),
                Err(e) => {
                    warn!(type_id, "Cached metadata is invalid, ignoring: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!(type_id, path = %path.display(), "Corrupt metadata cache entry: {}", e);
                None
            }
        }
    }

    fn store(&self, meta: &ClassMeta) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let entry = CacheEntry {
            version: FORMAT_VERSION,
            meta: meta.clone(),
        };
        let body = serde_json::to_vec(&entry).map_err(std::io::Error::other)?;

        // write fully under a private name, then rename over the final one
        let target = self.entry_path(&meta.type_id);
        let temp = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            target
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("entry")
        ));
        fs::write(&temp, body)?;
        if let Err(e) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        Ok(())
    }
}

impl MetadataCache for PersistentCache {
    fn get(&self, type_id: &str) -> Option<Arc<ClassMeta>> {
        if let Some(meta) = self.memory.get(type_id) {
            return Some(meta);
        }

        let meta = self.load(type_id)?;
        debug!(type_id, "Loaded class metadata from persistent cache");
        Some(self.memory.put(Arc::new(meta)))
    }

    fn put(&self, meta: Arc<ClassMeta>) -> Arc<ClassMeta> {
        let kept = self.memory.put(meta);
        if let Err(e) = self.store(&kept) {
            warn!(
                type_id = %kept.type_id,
                dir = %self.dir.display(),
                "Failed to persist class metadata: {}",
                e
            );
        }
        kept
    }

    fn clear(&self) {
        self.memory.clear();
    }

    fn len(&self) -> usize {
        self.memory.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FieldMeta, TypeDescriptor};
    use tempfile::TempDir;

    fn meta(type_id: &str) -> ClassMeta {
        ClassMeta::builder(type_id)
            .field(FieldMeta::new("id", TypeDescriptor::string()))
            .field(FieldMeta::new("age", TypeDescriptor::int().nullable()))
            .build()
    }

    #[test]
    fn test_entry_path_is_stable_hash() {
        let cache = PersistentCache::new("/tmp/meta");
        let a = cache.entry_path("User");
        let b = cache.entry_path("User");
        assert_eq!(a, b);
        assert_ne!(a, cache.entry_path("Address"));
        let name = a.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), 64 + ".json".len());
    }

    #[test]
    fn test_cold_start_reads_file() {
        let dir = TempDir::new().unwrap();
        let warm = PersistentCache::new(dir.path());
        warm.put(Arc::new(meta("User")));

        let cold = PersistentCache::new(dir.path());
        assert!(cold.is_empty());
        let loaded = cold.get("User").unwrap();
        assert_eq!(*loaded, meta("User"));

        // second lookup is served from memory
        let again = cold.get("User").unwrap();
        assert!(Arc::ptr_eq(&loaded, &again));
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::new(dir.path());
        fs::write(cache.entry_path("User"), b"{\"version\":1,\"meta\":{").unwrap();

        assert!(cache.get("User").is_none());

        cache.put(Arc::new(meta("User")));
        let cold = PersistentCache::new(dir.path());
        assert!(cold.get("User").is_some());
    }

    #[test]
    fn test_version_mismatch_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::new(dir.path());
        let body = serde_json::json!({ "version": 999, "meta": meta("User") });
        fs::write(cache.entry_path("User"), body.to_string()).unwrap();
        assert!(cache.get("User").is_none());
    }

    #[test]
    fn test_unwritable_dir_degrades_to_memory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let cache = PersistentCache::new(&blocker);
        let kept = cache.put(Arc::new(meta("User")));
        assert!(Arc::ptr_eq(&kept, &cache.get("User").unwrap()));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::new(dir.path());
        cache.put(Arc::new(meta("User")));
        cache.put(Arc::new(meta("Address")));

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".json")));
    }
}
