//! Process-wide memo tables.
//!
//! Four independent tables share one enabled switch: discovered package roots,
//! discovered config files, parsed documents, and a small LRU of resolver
//! handles. Each table serializes check-then-insert under its own mutex.

use crate::documents::{Document, DocumentCache};
use crate::options::CACHE_DISABLED_ENV;
use crate::resolver::Resolver;
use crate::tsconfig::ConfigFile;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, trace};

/// Maximum number of live resolver handles.
pub const RESOLVER_CACHE_CAPACITY: usize = 4;

/// Key for the package-list table: root, include patterns, ignore globs.
pub type PackagesKey = (PathBuf, Vec<String>, Vec<String>);

/// Key for the config-list table: package root, filenames, ignore globs.
pub type ConfigsKey = (PathBuf, Vec<String>, Vec<String>);

/// Whether the cache-disable environment variable is set to a non-empty value.
#[must_use]
pub fn disabled_by_env() -> bool {
    std::env::var_os(CACHE_DISABLED_ENV).is_some_and(|value| !value.is_empty())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Least-recently-used resolver handles, most recent last.
#[derive(Debug, Default)]
struct HandleLru {
    entries: Vec<(String, Arc<Resolver>)>,
}

impl HandleLru {
    fn get(&mut self, key: &str) -> Option<Arc<Resolver>> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(index);
        let handle = Arc::clone(&entry.1);
        self.entries.push(entry);
        Some(handle)
    }

    fn insert(&mut self, key: String, handle: Arc<Resolver>) {
        while self.entries.len() >= RESOLVER_CACHE_CAPACITY {
            let (evicted_key, evicted) = self.entries.remove(0);
            debug!(key = %evicted_key, "Evicting resolver handle");
            evicted.clear_cache();
        }
        self.entries.push((key, handle));
    }

    fn clear(&mut self) {
        for (_, handle) in self.entries.drain(..) {
            handle.clear_cache();
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub package_lists: usize,
    pub config_lists: usize,
    pub documents: usize,
    pub resolvers: usize,
}

/// The memo tables backing resolution.
#[derive(Debug)]
pub struct Caches {
    enabled: AtomicBool,
    packages: Mutex<HashMap<PackagesKey, Arc<Vec<PathBuf>>>>,
    configs: Mutex<HashMap<ConfigsKey, Arc<Vec<ConfigFile>>>>,
    documents: Mutex<HashMap<PathBuf, Option<Document>>>,
    resolvers: Mutex<HandleLru>,
}

impl Default for Caches {
    fn default() -> Self {
        Self::new()
    }
}

impl Caches {
    /// Create empty, enabled caches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            packages: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            resolvers: Mutex::new(HandleLru::default()),
        }
    }

    /// Create caches that never store anything.
    #[must_use]
    pub fn disabled() -> Self {
        let caches = Self::new();
        caches.set_enabled(false);
        caches
    }

    /// The process-wide instance used by [`crate::resolve`].
    pub fn global() -> &'static Caches {
        static GLOBAL: OnceLock<Caches> = OnceLock::new();
        GLOBAL.get_or_init(Caches::new)
    }

    /// Whether lookups may hit and results may be stored.
    ///
    /// False when switched off or when the environment variable is set.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed) && !disabled_by_env()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        lock(&self.packages).clear();
        lock(&self.configs).clear();
        lock(&self.documents).clear();
        lock(&self.resolvers).clear();
        debug!("Cleared caches");
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            package_lists: lock(&self.packages).len(),
            config_lists: lock(&self.configs).len(),
            documents: lock(&self.documents).len(),
            resolvers: lock(&self.resolvers).entries.len(),
        }
    }

    /// Cached package roots for `key`, discovering them with `discover` on a miss.
    pub fn package_list<F>(&self, key: PackagesKey, discover: F) -> Arc<Vec<PathBuf>>
    where
        F: FnOnce() -> Vec<PathBuf>,
    {
        if !self.is_enabled() {
            return Arc::new(discover());
        }

        let mut table = lock(&self.packages);
        if let Some(found) = table.get(&key) {
            trace!(root = %key.0.display(), "Package list cache hit");
            return Arc::clone(found);
        }

        debug!(root = %key.0.display(), patterns = ?key.1, "Discovering packages");
        let found = Arc::new(discover());
        table.insert(key, Arc::clone(&found));
        found
    }

    /// Cached config files for `key`, discovering them with `discover` on a miss.
    pub fn config_list<F>(&self, key: ConfigsKey, discover: F) -> Arc<Vec<ConfigFile>>
    where
        F: FnOnce() -> Vec<ConfigFile>,
    {
        if !self.is_enabled() {
            return Arc::new(discover());
        }

        let mut table = lock(&self.configs);
        if let Some(found) = table.get(&key) {
            trace!(root = %key.0.display(), "Config list cache hit");
            return Arc::clone(found);
        }

        debug!(root = %key.0.display(), filenames = ?key.1, "Discovering config files");
        let found = Arc::new(discover());
        table.insert(key, Arc::clone(&found));
        found
    }

    /// Cached resolver handle for `key`, constructing it with `build` on a miss.
    ///
    /// Construction happens under the table lock, so at most one handle exists
    /// per key.
    pub fn resolver<F>(&self, key: &str, build: F) -> Arc<Resolver>
    where
        F: FnOnce() -> Resolver,
    {
        if !self.is_enabled() {
            return Arc::new(build());
        }

        let mut lru = lock(&self.resolvers);
        if let Some(handle) = lru.get(key) {
            trace!(key, "Resolver handle cache hit");
            return handle;
        }

        debug!(key, "Creating resolver handle");
        let handle = Arc::new(build());
        lru.insert(key.to_string(), Arc::clone(&handle));
        handle
    }
}

impl DocumentCache for Caches {
    fn get_document(&self, path: &Path) -> Option<Option<Document>> {
        if !self.is_enabled() {
            return None;
        }
        lock(&self.documents).get(path).cloned()
    }

    fn set_document(&self, path: &Path, document: Option<Document>) {
        if !self.is_enabled() {
            return;
        }
        lock(&self.documents).insert(path.to_path_buf(), document);
    }
}
