//! Manifest and config file discovery.
//!
//! Walks a root directory once, pruning ignored directories, and matches every
//! file against a set of globs relative to the root.

use crate::paths::{normalize, unique};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Manifest filenames recognized inside a package directory.
pub const MANIFEST_FILENAMES: &[&str] = &["package.json", "package.json5", "package.yaml"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Child segment used to ask whether a `dir/**` glob covers a directory.
const PRUNE_SENTINEL: &str = "__modpath_sentinel__";

/// Normalize a package directory pattern.
///
/// Backslashes become `/`, a leading `./` and trailing `/` are removed, and
/// `.` (or an empty pattern) stands for the root itself, returned as `""`.
#[must_use]
pub fn normalize_dir_pattern(pattern: &str) -> String {
    let mut pattern = pattern.trim().replace('\\', "/");
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.to_string();
    }
    let trimmed = pattern.trim_end_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Expand package directory patterns into manifest globs.
///
/// Every pattern yields one glob per manifest filename. An empty pattern list
/// means the root only.
#[must_use]
pub fn manifest_globs(patterns: &[String]) -> Vec<String> {
    let patterns: Vec<String> = if patterns.is_empty() {
        vec![String::new()]
    } else {
        patterns.iter().map(|p| normalize_dir_pattern(p)).collect()
    };

    let globs = patterns.iter().flat_map(|pattern| {
        MANIFEST_FILENAMES.iter().map(move |name| {
            if pattern.is_empty() {
                (*name).to_string()
            } else {
                format!("{pattern}/{name}")
            }
        })
    });
    unique(globs)
}

/// Compiled include and ignore globs for one walk.
#[derive(Debug)]
struct Matcher {
    include: Vec<Pattern>,
    ignore: Vec<Pattern>,
    /// Directories at or beyond this many components cannot contain a match.
    max_dir_depth: Option<usize>,
}

impl Matcher {
    fn new(globs: &[String], ignore: &[String]) -> Self {
        let include: Vec<Pattern> = globs.iter().filter_map(|g| compile(g)).collect();
        let ignore: Vec<Pattern> = ignore.iter().filter_map(|g| compile(g)).collect();

        let max_dir_depth = if globs.iter().any(|g| g.contains("**")) {
            None
        } else {
            globs.iter().map(|g| g.split('/').count()).max()
        };

        Self {
            include,
            ignore,
            max_dir_depth,
        }
    }

    fn is_ignored(&self, rel: &str) -> bool {
        self.ignore
            .iter()
            .any(|pattern| pattern.matches_with(rel, MATCH_OPTIONS))
    }

    fn prune_dir(&self, rel: &str) -> bool {
        if let Some(max) = self.max_dir_depth {
            if rel.split('/').count() >= max {
                return true;
            }
        }
        let sentinel = format!("{rel}/{PRUNE_SENTINEL}");
        self.is_ignored(rel) || self.is_ignored(&sentinel)
    }

    fn matches_file(&self, rel: &str) -> bool {
        !self.is_ignored(rel)
            && self
                .include
                .iter()
                .any(|pattern| pattern.matches_with(rel, MATCH_OPTIONS))
    }
}

fn compile(glob: &str) -> Option<Pattern> {
    match Pattern::new(glob) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            debug!(glob, error = %e, "Skipping invalid glob");
            None
        }
    }
}

/// Find files under `root` matching any of `globs`, skipping `ignore`d paths.
///
/// Returns absolute paths in walk order.
#[must_use]
pub fn find_files(root: &Path, globs: &[String], ignore: &[String]) -> Vec<PathBuf> {
    if !root.is_dir() {
        trace!(root = %root.display(), "Discovery root is not a directory");
        return Vec::new();
    }

    let matcher = Matcher::new(globs, ignore);
    if matcher.include.is_empty() {
        return Vec::new();
    }

    let files: Vec<PathBuf> = modpath_util::fs::walk_relative_files(root, |rel| {
        matcher.prune_dir(rel)
    })
    .into_iter()
    .filter(|rel| matcher.matches_file(rel))
    .map(|rel| normalize(&root.join(rel)))
    .collect();

    trace!(root = %root.display(), count = files.len(), "Discovered files");
    files
}

/// Find package directories under `root`.
///
/// A directory is a package when it matches one of `patterns` and contains a
/// manifest. Negated patterns (`!dir`) exclude directories from the walk.
#[must_use]
pub fn find_package_dirs(root: &Path, patterns: &[String], ignore: &[String]) -> Vec<PathBuf> {
    let (negated, positive): (Vec<&String>, Vec<&String>) =
        patterns.iter().partition(|p| p.starts_with('!'));

    let positive: Vec<String> = positive.into_iter().cloned().collect();
    let mut ignore = ignore.to_vec();
    for pattern in negated {
        let dir = normalize_dir_pattern(&pattern[1..]);
        if !dir.is_empty() {
            ignore.push(dir);
        }
    }

    let globs = manifest_globs(&positive);
    let dirs = find_files(root, &globs, &ignore)
        .into_iter()
        .map(|file| crate::paths::parent_dir(&file).to_path_buf());
    unique(dirs)
}

/// Find every file named one of `filenames` under `root`.
#[must_use]
pub fn find_config_files(root: &Path, filenames: &[String], ignore: &[String]) -> Vec<PathBuf> {
    let globs: Vec<String> = filenames
        .iter()
        .map(|name| format!("**/{name}"))
        .collect();
    find_files(root, &globs, ignore)
}
