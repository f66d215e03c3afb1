//! Path utilities: depth, prefix matching, and sort-by-specificity.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Number of normal segments in a path.
///
/// Root, drive prefixes, `.` and empty segments do not count, so `/` and `C:\`
/// have depth 0 and `//foo//bar` has depth 2.
#[must_use]
pub fn path_depth(path: &Path) -> usize {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
}

/// Order two paths from most to least specific.
///
/// Deeper paths come first; paths of equal depth are ordered reverse
/// lexicographically so the result is deterministic.
#[must_use]
pub fn compare_by_depth(a: &Path, b: &Path) -> Ordering {
    path_depth(b)
        .cmp(&path_depth(a))
        .then_with(|| b.to_string_lossy().cmp(&a.to_string_lossy()))
}

/// Sort paths by depth, deepest first, ties broken reverse lexicographically.
#[must_use]
pub fn sort_paths_by_depth(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| compare_by_depth(a, b));
    paths
}

/// Whether `prefix` is a whole-component prefix of `path`.
///
/// `/a/b` is a prefix of `/a/b/c.js` but not of `/a/bc/d.js`.
#[must_use]
pub fn is_path_prefix(prefix: &Path, path: &Path) -> bool {
    path.starts_with(prefix)
}

/// Remove duplicate entries, keeping the first occurrence of each.
#[must_use]
pub fn unique<T, I>(items: I) -> Vec<T>
where
    T: Clone + Eq + std::hash::Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Lexically normalize a path, folding `.` and `..` segments without touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `item` against `parent`: absolute paths pass through, relative ones are joined.
#[must_use]
pub fn resolve_against(parent: &Path, item: &str) -> PathBuf {
    let candidate = Path::new(item);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        normalize(&parent.join(candidate))
    }
}

/// Make `path` absolute against the current directory and normalize it.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        normalize(&cwd.join(path))
    }
}

/// Directory containing `file`, or the file itself when it has no parent.
#[must_use]
pub fn parent_dir(file: &Path) -> &Path {
    file.parent().unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_depth() {
        assert_eq!(path_depth(Path::new("")), 0);
        assert_eq!(path_depth(Path::new("/")), 0);
        assert_eq!(path_depth(Path::new("/foo")), 1);
        assert_eq!(path_depth(Path::new("/foo/bar/baz")), 3);
        assert_eq!(path_depth(Path::new("foo/bar")), 2);
        assert_eq!(path_depth(Path::new("//foo//bar")), 2);
    }

    #[test]
    fn test_sort_by_depth() {
        let sorted = sort_paths_by_depth(paths(&["/a", "/", "/a/b", "/a/b/c"]));
        assert_eq!(sorted, paths(&["/a/b/c", "/a/b", "/a", "/"]));
    }

    #[test]
    fn test_sort_ties_reverse_lexicographic() {
        let sorted = sort_paths_by_depth(paths(&["/a/b/c", "/a/b", "/", "/a/a", "/a/c"]));
        assert_eq!(sorted, paths(&["/a/b/c", "/a/c", "/a/b", "/a/a", "/"]));
    }

    #[test]
    fn test_prefix_is_component_wise() {
        assert!(is_path_prefix(Path::new("/a/b"), Path::new("/a/b/c.js")));
        assert!(is_path_prefix(Path::new("/a/b"), Path::new("/a/b")));
        assert!(!is_path_prefix(Path::new("/a/b"), Path::new("/a/bc/d.js")));
    }

    #[test]
    fn test_unique_keeps_first() {
        assert_eq!(unique(vec!["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
        assert!(unique(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_against() {
        let parent = Path::new("/repo/main");
        assert_eq!(resolve_against(parent, "./lib"), PathBuf::from("/repo/main/lib"));
        assert_eq!(resolve_against(parent, "../shared"), PathBuf::from("/repo/shared"));
        assert_eq!(resolve_against(parent, "/abs/dir"), PathBuf::from("/abs/dir"));
    }
}
