//! Process-wide content and baseline caches
//!
//! Both caches are keyed by file path and safe under interleaved access
//! from concurrent analyses: writes replace, never merge. The content cache
//! is bounded (LRU); the baseline store holds the "before" content for a
//! file until it is explicitly replaced or invalidated (on save).

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::host::Host;

const DEFAULT_CAPACITY: usize = 256;

/// Bounded cache of file contents
pub struct ContentCache {
    inner: Mutex<LruCache<PathBuf, Arc<str>>>,
}

impl ContentCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, path: &Path) -> Option<Arc<str>> {
        self.inner.lock().ok()?.get(path).cloned()
    }

    pub fn put(&self, path: impl Into<PathBuf>, content: impl Into<Arc<str>>) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(path.into(), content.into());
        }
    }

    /// Cached content, reading through the host on a miss. `None` when the
    /// host cannot read the file either.
    pub fn get_or_load(&self, path: &Path, host: &dyn Host) -> Option<Arc<str>> {
        if let Some(hit) = self.get(path) {
            return Some(hit);
        }
        let content: Arc<str> = Arc::from(host.read_file(path)?);
        self.put(path, Arc::clone(&content));
        Some(content)
    }

    /// Drop a single entry (file changed on disk)
    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.pop(path);
        }
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Host wrapper that routes `read_file` through a [`ContentCache`].
///
/// The workspace walk and reference scans read the same candidate files for
/// every change in an analysis; the cache collapses those into one read.
pub struct CachingHost<'a> {
    host: &'a dyn Host,
    cache: &'a ContentCache,
}

impl<'a> CachingHost<'a> {
    pub fn new(host: &'a dyn Host, cache: &'a ContentCache) -> Self {
        Self { host, cache }
    }
}

impl Host for CachingHost<'_> {
    fn list_workspace_files(&self, pattern: &str) -> Vec<PathBuf> {
        self.host.list_workspace_files(pattern)
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        self.cache
            .get_or_load(path, self.host)
            .map(|c| c.to_string())
    }

    fn show_message(&self, text: &str) {
        self.host.show_message(text);
    }
}

/// Baseline ("before") content per file, held until explicitly updated
#[derive(Default)]
pub struct BaselineStore {
    inner: Mutex<HashMap<PathBuf, String>>,
}

impl BaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a baseline, replacing any previous one for the same path
    pub fn set(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(path.into(), content.into());
        }
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.inner.lock().ok()?.get(path).cloned()
    }

    /// Remove a baseline (file saved — next analysis establishes a new one)
    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(path);
        }
    }
}
