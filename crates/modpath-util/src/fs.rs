use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Walk every file below `root`, returning paths relative to `root` with `/` separators.
///
/// `prune_dir` receives the relative path of each directory below `root`; returning
/// `true` skips that directory and everything inside it. Symlinked directories are
/// not followed. Entries that cannot be read are skipped silently. Output is sorted
/// by file name at each level so repeated walks are deterministic.
#[must_use]
pub fn walk_relative_files<F>(root: &Path, mut prune_dir: F) -> Vec<String>
where
    F: FnMut(&str) -> bool,
{
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match relative_slash_path(root, entry.path()) {
                Some(rel) => !prune_dir(&rel),
                None => false,
            }
        });

    for entry in walker.flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(rel) = relative_slash_path(root, entry.path()) {
            files.push(rel);
        }
    }

    files
}

/// Relative path of `path` under `root`, joined with `/`.
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
