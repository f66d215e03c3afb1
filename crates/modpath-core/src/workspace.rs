//! Workspace support for monorepos.
//!
//! Turns the configured roots and package patterns into a depth-sorted list of
//! package roots, and finds the package root that owns a source file.
//! Patterns come from the explicit `packages` option and, optionally, the
//! `packages:` list of a `pnpm-workspace.yaml` at each root.

use crate::cache::Caches;
use crate::discovery::find_package_dirs;
use crate::documents::{read_document, DocumentCache, DocumentFormat};
use crate::options::{
    PackageOptions, PackagesOption, WorkspaceFile, DEFAULT_PACKAGE_IGNORE,
    PNPM_WORKSPACE_FILENAME,
};
use crate::paths::{is_path_prefix, sort_paths_by_depth, unique};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Package patterns listed in a workspace manifest, if it exists.
#[must_use]
pub fn read_workspace_patterns(
    root: &Path,
    file: &WorkspaceFile,
    documents: &dyn DocumentCache,
) -> Vec<String> {
    let path = match file {
        WorkspaceFile::None => return Vec::new(),
        WorkspaceFile::Default => root.join(PNPM_WORKSPACE_FILENAME),
        WorkspaceFile::Named(name) => root.join(name),
    };

    let Some(document) = read_document(&path, DocumentFormat::Yaml, documents) else {
        return Vec::new();
    };

    document
        .get("packages")
        .and_then(|p| p.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Concrete patterns to search under `root`.
///
/// Explicit patterns come first, followed by the workspace manifest's list.
/// Empty entries and duplicates are dropped. With nothing configured the root
/// itself is the only pattern. `include_root` appends `.`.
#[must_use]
pub fn package_patterns(
    root: &Path,
    options: &PackageOptions,
    documents: &dyn DocumentCache,
) -> Vec<String> {
    let explicit = options.patterns.iter().flatten().cloned();
    let from_workspace = read_workspace_patterns(root, &options.pnpm_workspace, documents);

    let mut patterns = unique(
        explicit
            .chain(from_workspace)
            .filter(|p| !p.trim().is_empty()),
    );

    if patterns.is_empty() {
        patterns.push(".".to_string());
    }
    if options.include_root && !patterns.iter().any(|p| p == ".") {
        patterns.push(".".to_string());
    }
    patterns
}

/// Packages discovered under one root, cached per root and pattern set.
#[must_use]
pub fn find_root_packages(root: &Path, options: &PackageOptions, caches: &Caches) -> Vec<PathBuf> {
    let patterns = package_patterns(root, options, caches);
    let ignore: Vec<String> = options.ignore.clone().unwrap_or_else(|| {
        DEFAULT_PACKAGE_IGNORE
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    });

    let key = (root.to_path_buf(), patterns.clone(), ignore.clone());
    let found = caches.package_list(key, || find_package_dirs(root, &patterns, &ignore));
    found.as_ref().clone()
}

/// Candidate package roots for `roots`, deepest first.
///
/// Without `packages` the roots themselves are the candidates. Otherwise each
/// root contributes itself plus every package discovered beneath it.
#[must_use]
pub fn find_workspace_packages(
    roots: &[PathBuf],
    packages: Option<&PackagesOption>,
    caches: &Caches,
) -> Vec<PathBuf> {
    let Some(packages) = packages else {
        return sort_paths_by_depth(unique(roots.iter().cloned()));
    };

    let options = packages.clone().into_options();
    let mut candidates = Vec::new();
    for root in roots {
        candidates.push(root.clone());
        candidates.extend(find_root_packages(root, &options, caches));
    }

    let sorted = sort_paths_by_depth(unique(candidates));
    debug!(count = sorted.len(), "Workspace package roots");
    sorted
}

/// First candidate that contains `source_file`.
///
/// `candidates` must already be sorted deepest first.
#[must_use]
pub fn find_closest_package_root<'a>(
    candidates: &'a [PathBuf],
    source_file: &Path,
) -> Option<&'a Path> {
    candidates
        .iter()
        .find(|candidate| is_path_prefix(candidate, source_file))
        .map(PathBuf::as_path)
}
