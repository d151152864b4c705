//! File-identity cache for parsed inputs.
//!
//! Parsing, re-projection, and joins do not depend on user filters, so a
//! parsed file is kept for the lifetime of the process. Entries are keyed by
//! path and parsed type and are validated against a SHA-256 digest of the
//! file contents: an edited file is parsed again, an unchanged one is not.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

struct CacheEntry {
    digest: String,
    value: Arc<dyn Any + Send + Sync>,
}

/// Memoizes file parsers by path and content digest.
#[derive(Default)]
pub struct SourceCache {
    entries: HashMap<(PathBuf, TypeId), CacheEntry>,
    hits: u64,
    misses: u64,
}

impl SourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached parse of `path`, or reads the file and runs
    /// `load` on its bytes.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read, or whatever `load`
    /// returns. Failed loads are not cached.
    pub fn get_or_load<T, E, F>(&mut self, path: &Path, load: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        E: From<std::io::Error>,
        F: FnOnce(&[u8]) -> Result<T, E>,
    {
        let bytes = std::fs::read(path)?;
        let digest = content_digest(&bytes);
        let key = (path.to_path_buf(), TypeId::of::<T>());

        if let Some(entry) = self.entries.get(&key)
            && entry.digest == digest
            && let Ok(value) = Arc::clone(&entry.value).downcast::<T>()
        {
            self.hits += 1;
            log::debug!("Cache hit for {}", path.display());
            return Ok(value);
        }

        self.misses += 1;
        log::debug!("Cache miss for {}, parsing", path.display());
        let value = Arc::new(load(&bytes)?);
        let erased: Arc<dyn Any + Send + Sync> = value.clone();
        self.entries.insert(
            key,
            CacheEntry {
                digest,
                value: erased,
            },
        );
        Ok(value)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("city_monitor_cache_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn line_count(bytes: &[u8]) -> Result<usize, std::io::Error> {
        Ok(bytes.iter().filter(|b| **b == b'\n').count())
    }

    #[test]
    fn unchanged_file_is_parsed_once() {
        let path = scratch_file("unchanged.csv", "a\n1\n2\n");
        let mut cache = SourceCache::new();

        let first = cache.get_or_load(&path, line_count).unwrap();
        let second = cache.get_or_load(&path, line_count).unwrap();

        assert_eq!(*first, 3);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn edited_file_is_parsed_again() {
        let path = scratch_file("edited.csv", "a\n1\n");
        let mut cache = SourceCache::new();

        assert_eq!(*cache.get_or_load(&path, line_count).unwrap(), 2);
        std::fs::write(&path, "a\n1\n2\n3\n").unwrap();
        assert_eq!(*cache.get_or_load(&path, line_count).unwrap(), 4);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn same_path_different_types_are_separate() {
        let path = scratch_file("typed.csv", "a\n1\n");
        let mut cache = SourceCache::new();

        let count = cache.get_or_load(&path, line_count).unwrap();
        let text = cache
            .get_or_load(&path, |bytes| {
                Ok::<_, std::io::Error>(String::from_utf8_lossy(bytes).into_owned())
            })
            .unwrap();

        assert_eq!(*count, 2);
        assert_eq!(text.as_str(), "a\n1\n");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut cache = SourceCache::new();
        let result = cache.get_or_load(Path::new("/nonexistent/city_monitor.csv"), line_count);
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
