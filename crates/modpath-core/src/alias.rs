//! Alias table construction and matching.
//!
//! Explicit aliases come from options and resolve against the package root.
//! Config-derived aliases come from `compilerOptions.paths` with the trailing
//! wildcard removed. Explicit entries win over config entries with the same key.

use crate::paths::resolve_against;
use crate::tsconfig::PathMapping;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One alias key and its absolute targets, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AliasEntry {
    pub key: String,
    pub targets: Vec<PathBuf>,
}

impl AliasEntry {
    /// Remainder of `request` after this key, or `None` if the key does not apply.
    ///
    /// The key must match the whole request or be followed by `/`.
    #[must_use]
    pub fn strip<'a>(&self, request: &'a str) -> Option<&'a str> {
        let rest = request.strip_prefix(self.key.as_str())?;
        if rest.is_empty() || self.key.ends_with('/') {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    }
}

/// Ordered alias table. Longer keys are tried first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table; when a key repeats, the first entry wins.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = AliasEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            if !table.entries.iter().any(|e| e.key == entry.key) {
                table.entries.push(entry);
            }
        }
        // Stable, so equal-length keys keep insertion order.
        table.entries.sort_by(|a, b| b.key.len().cmp(&a.key.len()));
        table
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[PathBuf]> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.targets.as_slice())
    }

    /// Substituted paths for `request`, in the order they should be tried.
    #[must_use]
    pub fn candidates(&self, request: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for entry in &self.entries {
            let Some(rest) = entry.strip(request) else {
                continue;
            };
            for target in &entry.targets {
                if rest.is_empty() {
                    out.push(target.clone());
                } else {
                    out.push(target.join(rest));
                }
            }
        }
        out
    }
}

/// Strip one trailing wildcard segment: `@/*` -> `@`, `src/*` -> `src`, `*` -> ``.
#[must_use]
pub fn strip_wildcard(pattern: &str) -> &str {
    pattern
        .strip_suffix("/*")
        .or_else(|| pattern.strip_suffix('*'))
        .unwrap_or(pattern)
}

/// Explicit aliases with targets made absolute against `parent`.
#[must_use]
pub fn normalize_alias(alias: &BTreeMap<String, Vec<String>>, parent: &Path) -> Vec<AliasEntry> {
    alias
        .iter()
        .map(|(key, targets)| AliasEntry {
            key: key.clone(),
            targets: targets
                .iter()
                .map(|target| resolve_against(parent, target))
                .collect(),
        })
        .collect()
}

/// Aliases derived from config path mappings.
///
/// Keys that become empty (a bare `*` mapping) are skipped.
#[must_use]
pub fn config_aliases(mappings: &[PathMapping]) -> Vec<AliasEntry> {
    mappings
        .iter()
        .filter_map(|mapping| {
            let key = strip_wildcard(&mapping.pattern);
            if key.is_empty() {
                debug!(pattern = %mapping.pattern, "Skipping catch-all path mapping");
                return None;
            }
            let targets = mapping
                .targets
                .iter()
                .map(|target| resolve_against(&mapping.base, strip_wildcard(target)))
                .collect();
            Some(AliasEntry {
                key: key.to_string(),
                targets,
            })
        })
        .collect()
}

/// Final table: explicit entries first so they override config entries.
#[must_use]
pub fn build_alias_table(
    explicit: &BTreeMap<String, Vec<String>>,
    package_root: &Path,
    mappings: &[PathMapping],
) -> AliasTable {
    AliasTable::from_entries(
        normalize_alias(explicit, package_root)
            .into_iter()
            .chain(config_aliases(mappings)),
    )
}
