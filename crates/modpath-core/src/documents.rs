//! Parsed document loading and the document cache trait.
//!
//! Manifests (`package.json`), project configs (`tsconfig.json`, JSONC) and
//! workspace manifests (YAML) are all read into a `serde_json::Value`. A
//! document that is missing or fails to parse is treated as absent.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A parsed document shared between cache and callers.
pub type Document = Arc<Value>;

/// Syntax of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Strict JSON (`package.json`).
    Json,
    /// JSON with comments and trailing commas (`tsconfig.json`, `package.json5`).
    Json5,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            Some("json5") => Self::Json5,
            _ => Self::Json,
        }
    }
}

/// Trait for caching parsed documents by absolute path.
///
/// Implementations should be thread-safe (Send + Sync). A cached `None`
/// records a document that exists but could not be parsed.
pub trait DocumentCache: Send + Sync + std::fmt::Debug {
    /// Look up a cached document. The outer `None` is a cache miss.
    fn get_document(&self, path: &Path) -> Option<Option<Document>>;

    /// Store a parsed document (or a parse failure) in the cache.
    fn set_document(&self, path: &Path, document: Option<Document>);
}

/// No-op cache implementation (always misses, never stores).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocumentCache;

impl DocumentCache for NoDocumentCache {
    fn get_document(&self, _path: &Path) -> Option<Option<Document>> {
        None
    }

    fn set_document(&self, _path: &Path, _document: Option<Document>) {
        // No-op
    }
}

/// Read and parse a document from disk.
pub fn load_document(path: &Path, format: DocumentFormat) -> Result<Value> {
    let content = modpath_util::fs::read_to_string_lossy(path).map_err(|source| {
        Error::DocumentRead {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let content = content.trim_start_matches('\u{feff}');

    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| Error::parse(path, e)),
        DocumentFormat::Json5 => json5::from_str(content).map_err(|e| Error::parse(path, e)),
        DocumentFormat::Yaml => {
            let value: Value =
                serde_yaml::from_str(content).map_err(|e| Error::parse(path, e))?;
            Ok(value)
        }
    }
}

/// Read a document through `cache`, returning `None` when it is missing or malformed.
pub fn read_document(
    path: &Path,
    format: DocumentFormat,
    cache: &dyn DocumentCache,
) -> Option<Document> {
    if let Some(cached) = cache.get_document(path) {
        return cached;
    }

    if !path.is_file() {
        return None;
    }

    let document = match load_document(path, format) {
        Ok(Value::Null) => None,
        Ok(value) => Some(Arc::new(value)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Treating unreadable document as absent");
            None
        }
    };

    cache.set_document(path, document.clone());
    document
}
