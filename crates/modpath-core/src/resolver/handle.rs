//! Filesystem resolution for one bound option set.
//!
//! Supports:
//! - Alias substitution (longest key first, list targets in order)
//! - Relative and absolute specifiers, root-relative `/` specifiers
//! - `#` specifiers through the nearest manifest's `imports`
//! - Bare specifiers through `baseUrl` and `node_modules` lookup
//! - Extension lookup and extension aliases
//! - Package entry points: `exports`, main fields, `index.*`
//! - Browser-style alias fields remapping requests and files

use super::exports::{resolve_exports, resolve_imports};
use crate::alias::AliasTable;
use crate::documents::{read_document, Document, DocumentCache, DocumentFormat};
use crate::options::ResolveOptions;
use crate::paths::{normalize, parent_dir, resolve_against};
use crate::specifier::parse_bare_specifier;
use crate::tsconfig::SelectedConfig;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::trace;

const MANIFEST: &str = "package.json";

/// Everything a [`Resolver`] is bound to.
///
/// Two option sets with equal [`ResolverOptions::cache_key`] resolve identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverOptions {
    pub alias: AliasTable,
    pub config: Option<SelectedConfig>,
    /// Absolute `baseUrl` of the selected config.
    pub base_url: Option<PathBuf>,
    /// Directories that `/`-prefixed specifiers are also tried beneath.
    pub roots: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub extension_alias: BTreeMap<String, Vec<String>>,
    pub condition_names: Vec<String>,
    pub main_fields: Vec<String>,
    pub alias_fields: Vec<String>,
    pub symlinks: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::from_resolve_options(&ResolveOptions::default())
    }
}

impl ResolverOptions {
    /// Lookup settings from `options`, with no alias, config, or roots.
    #[must_use]
    pub fn from_resolve_options(options: &ResolveOptions) -> Self {
        Self {
            alias: AliasTable::new(),
            config: None,
            base_url: None,
            roots: Vec::new(),
            extensions: options.extensions.clone(),
            extension_alias: options.extension_alias.clone(),
            condition_names: options.condition_names.clone(),
            main_fields: options.main_fields.clone(),
            alias_fields: options.alias_fields.clone(),
            symlinks: options.symlinks,
        }
    }

    /// Stable hash of the whole option set.
    ///
    /// `None` when some path is not valid UTF-8; such option sets are never shared.
    #[must_use]
    pub fn cache_key(&self) -> Option<String> {
        modpath_util::hash::stable_hash(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    File,
    Dir,
    Missing,
}

/// Outcome of looking inside one `node_modules/<name>` directory.
enum PackageLookup {
    Found(PathBuf),
    /// Nothing here; keep walking up.
    Missing,
    /// `exports` exists and does not expose the subpath.
    Blocked,
}

/// Value of one entry in an alias field map.
enum FieldAlias {
    /// Mapped to `false`.
    Excluded,
    Target(String),
}

/// A resolver bound to one option set, with its own stat cache.
#[derive(Debug)]
pub struct Resolver {
    options: ResolverOptions,
    stats: Mutex<HashMap<PathBuf, FileKind>>,
}

impl Resolver {
    #[must_use]
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            stats: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Drop every memoized filesystem lookup.
    pub fn clear_cache(&self) {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of memoized filesystem lookups.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Resolve `request` as imported from a file in `base_dir`.
    ///
    /// `request` must already have its query string removed.
    pub fn resolve(
        &self,
        base_dir: &Path,
        request: &str,
        documents: &dyn DocumentCache,
    ) -> Option<PathBuf> {
        let found = self.resolve_request(base_dir, request, documents)?;
        let found = self.remap_file(found, documents)?;
        Some(self.finalize(found))
    }

    fn resolve_request(
        &self,
        base_dir: &Path,
        request: &str,
        documents: &dyn DocumentCache,
    ) -> Option<PathBuf> {
        for candidate in self.options.alias.candidates(request) {
            trace!(request, candidate = %candidate.display(), "Trying alias target");
            if let Some(found) = self.load_path(&candidate, documents) {
                return Some(found);
            }
        }

        if request.starts_with('.') {
            return self.load_path(&resolve_against(base_dir, request), documents);
        }

        if request.starts_with('/') {
            return self.resolve_rooted(request, documents);
        }

        if Path::new(request).is_absolute() {
            return self.load_path(&normalize(Path::new(request)), documents);
        }

        if request.starts_with('#') {
            return self.resolve_hash_import(base_dir, request, documents);
        }

        if let Some(remapped) = self.remap_request(base_dir, request, documents) {
            return remapped;
        }

        if let Some(base_url) = &self.options.base_url {
            if let Some(found) = self.load_path(&resolve_against(base_url, request), documents) {
                return Some(found);
            }
        }

        self.resolve_bare(base_dir, request, documents)
    }

    /// Bare `request` as mapped by the nearest manifest's alias fields.
    ///
    /// `None` when no field maps it; `Some(None)` when it is excluded or the
    /// mapped target does not exist.
    fn remap_request(
        &self,
        base_dir: &Path,
        request: &str,
        documents: &dyn DocumentCache,
    ) -> Option<Option<PathBuf>> {
        if self.options.alias_fields.is_empty() {
            return None;
        }
        let (pkg_dir, manifest) = self.nearest_manifest(base_dir, documents)?;
        let alias = self.field_alias(&manifest, |key| key == request)?;

        Some(match alias {
            FieldAlias::Excluded => {
                trace!(request, manifest = %pkg_dir.display(), "Module excluded by alias field");
                None
            }
            FieldAlias::Target(target) => {
                trace!(request, target = %target, "Module remapped by alias field");
                self.load_field_target(&pkg_dir, &target, documents)
            }
        })
    }

    /// `file` as mapped by its owning manifest's alias fields.
    fn remap_file(&self, file: PathBuf, documents: &dyn DocumentCache) -> Option<PathBuf> {
        if self.options.alias_fields.is_empty() {
            return Some(file);
        }
        let Some((pkg_dir, manifest)) = self.nearest_manifest(parent_dir(&file), documents) else {
            return Some(file);
        };
        let relative = file.strip_prefix(&pkg_dir).ok().map(|relative| {
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        });
        let Some(relative) = relative else {
            return Some(file);
        };
        let stem = relative
            .rsplit_once('.')
            .filter(|(stem, ext)| !stem.is_empty() && !ext.contains('/'))
            .map_or(relative.as_str(), |(stem, _)| stem);

        let alias = self.field_alias(&manifest, |key| {
            key.strip_prefix("./")
                .is_some_and(|key| key == relative || key == stem)
        });
        match alias {
            None => Some(file),
            Some(FieldAlias::Excluded) => {
                trace!(file = %file.display(), "File excluded by alias field");
                None
            }
            Some(FieldAlias::Target(target)) => {
                trace!(file = %file.display(), target = %target, "File remapped by alias field");
                self.load_field_target(&pkg_dir, &target, documents)
            }
        }
    }

    /// Relative targets load beneath the manifest directory; others are package names.
    fn load_field_target(
        &self,
        pkg_dir: &Path,
        target: &str,
        documents: &dyn DocumentCache,
    ) -> Option<PathBuf> {
        if target.starts_with('.') {
            self.load_path(&resolve_against(pkg_dir, target), documents)
        } else {
            self.resolve_bare(pkg_dir, target, documents)
        }
    }

    /// First entry of an object-valued alias field whose key satisfies `matches`.
    fn field_alias(&self, manifest: &Value, matches: impl Fn(&str) -> bool) -> Option<FieldAlias> {
        let (_, value) = self
            .options
            .alias_fields
            .iter()
            .filter_map(|field| manifest.get(field.as_str())?.as_object())
            .flat_map(|map| map.iter())
            .find(|(key, _)| matches(key.as_str()))?;
        match value {
            Value::Bool(false) => Some(FieldAlias::Excluded),
            Value::String(target) => Some(FieldAlias::Target(target.clone())),
            _ => None,
        }
    }

    /// Closest `package.json` at or above `dir`, with its directory.
    fn nearest_manifest(
        &self,
        dir: &Path,
        documents: &dyn DocumentCache,
    ) -> Option<(PathBuf, Document)> {
        dir.ancestors().find_map(|dir| {
            let manifest_path = dir.join(MANIFEST);
            if self.kind(&manifest_path) != FileKind::File {
                return None;
            }
            read_document(&manifest_path, DocumentFormat::Json, documents)
                .map(|manifest| (dir.to_path_buf(), manifest))
        })
    }

    /// Absolute path first, then beneath each root.
    fn resolve_rooted(&self, request: &str, documents: &dyn DocumentCache) -> Option<PathBuf> {
        if let Some(found) = self.load_path(&normalize(Path::new(request)), documents) {
            return Some(found);
        }
        let relative = request.trim_start_matches('/');
        self.options
            .roots
            .iter()
            .find_map(|root| self.load_path(&resolve_against(root, relative), documents))
    }

    /// `#` specifiers through the `imports` field of the nearest manifest.
    fn resolve_hash_import(
        &self,
        base_dir: &Path,
        request: &str,
        documents: &dyn DocumentCache,
    ) -> Option<PathBuf> {
        for dir in base_dir.ancestors() {
            let manifest_path = dir.join(MANIFEST);
            if self.kind(&manifest_path) != FileKind::File {
                continue;
            }
            let manifest = read_document(&manifest_path, DocumentFormat::Json, documents)?;
            let targets = resolve_imports(&manifest, request, &self.options.condition_names)?;
            return self.first_file(dir, &targets);
        }
        None
    }

    fn resolve_bare(
        &self,
        base_dir: &Path,
        request: &str,
        documents: &dyn DocumentCache,
    ) -> Option<PathBuf> {
        let (name, subpath) = parse_bare_specifier(request);

        for dir in base_dir.ancestors() {
            if dir.file_name().is_some_and(|n| n == "node_modules") {
                continue;
            }
            let pkg_dir = dir.join("node_modules").join(name);
            if self.kind(&pkg_dir) != FileKind::Dir {
                continue;
            }

            match self.load_package(&pkg_dir, subpath, documents) {
                PackageLookup::Found(path) => return Some(path),
                PackageLookup::Blocked => {
                    trace!(request, package = %pkg_dir.display(), "Subpath not exported");
                    return None;
                }
                PackageLookup::Missing => {}
            }
        }

        None
    }

    fn load_package(
        &self,
        pkg_dir: &Path,
        subpath: Option<&str>,
        documents: &dyn DocumentCache,
    ) -> PackageLookup {
        let manifest_path = pkg_dir.join(MANIFEST);
        if self.kind(&manifest_path) == FileKind::File {
            if let Some(manifest) = read_document(&manifest_path, DocumentFormat::Json, documents) {
                let export_key = subpath.map_or_else(|| ".".to_string(), |s| format!("./{s}"));
                if let Some(targets) =
                    resolve_exports(&manifest, &export_key, &self.options.condition_names)
                {
                    return self
                        .first_file(pkg_dir, &targets)
                        .map_or(PackageLookup::Blocked, PackageLookup::Found);
                }
            }
        }

        let found = match subpath {
            Some(sub) => self.load_path(&resolve_against(pkg_dir, sub), documents),
            None => self.load_as_directory(pkg_dir, documents),
        };
        found.map_or(PackageLookup::Missing, PackageLookup::Found)
    }

    /// First `./`-relative target under `dir` that is an existing file.
    fn first_file(&self, dir: &Path, targets: &[String]) -> Option<PathBuf> {
        targets
            .iter()
            .map(|target| resolve_against(dir, target))
            .find(|path| self.kind(path) == FileKind::File)
    }

    fn load_path(&self, path: &Path, documents: &dyn DocumentCache) -> Option<PathBuf> {
        self.load_as_file(path)
            .or_else(|| self.load_as_directory(path, documents))
    }

    fn load_as_file(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_string_lossy();

        for (ext, replacements) in &self.options.extension_alias {
            if name.len() > ext.len() && name.ends_with(ext.as_str()) {
                let full = path.as_os_str().to_string_lossy();
                let stem = &full[..full.len() - ext.len()];
                return replacements
                    .iter()
                    .map(|replacement| PathBuf::from(format!("{stem}{replacement}")))
                    .find(|candidate| self.kind(candidate) == FileKind::File);
            }
        }

        if self.kind(path) == FileKind::File {
            return Some(path.to_path_buf());
        }
        self.try_extensions(path)
    }

    fn try_extensions(&self, path: &Path) -> Option<PathBuf> {
        self.options.extensions.iter().find_map(|ext| {
            let mut candidate = OsString::from(path.as_os_str());
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            (self.kind(&candidate) == FileKind::File).then_some(candidate)
        })
    }

    fn load_as_directory(&self, dir: &Path, documents: &dyn DocumentCache) -> Option<PathBuf> {
        if self.kind(dir) != FileKind::Dir {
            return None;
        }

        let manifest_path = dir.join(MANIFEST);
        if self.kind(&manifest_path) == FileKind::File {
            if let Some(manifest) = read_document(&manifest_path, DocumentFormat::Json, documents) {
                for field in &self.options.main_fields {
                    let Some(main) = manifest.get(field.as_str()).and_then(|v| v.as_str()) else {
                        continue;
                    };
                    let main_path = resolve_against(dir, main);
                    if let Some(found) = self
                        .load_as_file(&main_path)
                        .or_else(|| self.load_index(&main_path))
                    {
                        trace!(field = %field, path = %found.display(), "Resolved main field");
                        return Some(found);
                    }
                }
            }
        }

        self.load_index(dir)
    }

    fn load_index(&self, dir: &Path) -> Option<PathBuf> {
        if self.kind(dir) != FileKind::Dir {
            return None;
        }
        self.try_extensions(&dir.join("index"))
    }

    fn finalize(&self, path: PathBuf) -> PathBuf {
        if self.options.symlinks {
            dunce::canonicalize(&path).unwrap_or(path)
        } else {
            path
        }
    }

    fn kind(&self, path: &Path) -> FileKind {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(kind) = stats.get(path) {
            return *kind;
        }

        let kind = match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => FileKind::File,
            Ok(meta) if meta.is_dir() => FileKind::Dir,
            _ => FileKind::Missing,
        };
        stats.insert(path.to_path_buf(), kind);
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasEntry;
    use crate::documents::NoDocumentCache;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn fixture_root() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        (dir, root)
    }

    fn resolver() -> Resolver {
        Resolver::new(ResolverOptions::default())
    }

    fn resolve(resolver: &Resolver, dir: &Path, request: &str) -> Option<PathBuf> {
        resolver.resolve(dir, request, &NoDocumentCache)
    }

    #[test]
    fn test_relative_extension_lookup() {
        let (_dir, root) = fixture_root();
        write(&root, "src/a.ts", "");
        write(&root, "src/b.js", "");
        write(&root, "src/types.d.ts", "");
        let src = root.join("src");
        let r = resolver();

        assert_eq!(resolve(&r, &src, "./a"), Some(root.join("src/a.ts")));
        assert_eq!(resolve(&r, &src, "./b"), Some(root.join("src/b.js")));
        assert_eq!(resolve(&r, &src, "./types"), Some(root.join("src/types.d.ts")));
        assert_eq!(resolve(&r, &root, "./src/a.ts"), Some(root.join("src/a.ts")));
        assert_eq!(resolve(&r, &src, "./missing"), None);
    }

    #[test]
    fn test_extension_alias_prefers_source() {
        let (_dir, root) = fixture_root();
        write(&root, "a.ts", "");
        write(&root, "a.js", "");
        write(&root, "only.js", "");
        let r = resolver();

        assert_eq!(resolve(&r, &root, "./a.js"), Some(root.join("a.ts")));
        assert_eq!(resolve(&r, &root, "./only.js"), Some(root.join("only.js")));
        assert_eq!(resolve(&r, &root, "./nothing.js"), None);
    }

    #[test]
    fn test_directory_index_and_main() {
        let (_dir, root) = fixture_root();
        write(&root, "dir/index.js", "");
        write(&root, "pkg/package.json", r#"{"main": "lib/entry"}"#);
        write(&root, "pkg/lib/entry.js", "");
        write(&root, "typed/package.json", r#"{"types": "missing.d.ts", "main": "./main.js"}"#);
        write(&root, "typed/main.js", "");
        let r = resolver();

        assert_eq!(resolve(&r, &root, "./dir"), Some(root.join("dir/index.js")));
        assert_eq!(resolve(&r, &root, "./pkg"), Some(root.join("pkg/lib/entry.js")));
        assert_eq!(resolve(&r, &root, "./typed"), Some(root.join("typed/main.js")));
    }

    #[test]
    fn test_bare_with_main_and_subpath() {
        let (_dir, root) = fixture_root();
        write(&root, "node_modules/commonjs-pkg/package.json", r#"{"main": "lib/index.js"}"#);
        write(&root, "node_modules/commonjs-pkg/lib/index.js", "");
        write(&root, "node_modules/commonjs-pkg/index.js", "");
        let src = root.join("src/deep");
        fs::create_dir_all(&src).unwrap();
        let r = resolver();

        assert_eq!(
            resolve(&r, &src, "commonjs-pkg"),
            Some(root.join("node_modules/commonjs-pkg/lib/index.js"))
        );
        assert_eq!(
            resolve(&r, &src, "commonjs-pkg/index"),
            Some(root.join("node_modules/commonjs-pkg/index.js"))
        );
        assert_eq!(resolve(&r, &src, "not-installed"), None);
    }

    #[test]
    fn test_bare_with_exports() {
        let (_dir, root) = fixture_root();
        write(
            &root,
            "node_modules/module-pkg/package.json",
            r#"{
                "exports": {
                    ".": { "import": "./index.mjs", "require": "./index.cjs" },
                    "./lib-alias": "./lib/index.js",
                    "./export.js": "./export.js"
                }
            }"#,
        );
        write(&root, "node_modules/module-pkg/index.mjs", "");
        write(&root, "node_modules/module-pkg/index.js", "");
        write(&root, "node_modules/module-pkg/lib/index.js", "");
        write(&root, "node_modules/module-pkg/export.js", "");
        let r = resolver();

        assert_eq!(
            resolve(&r, &root, "module-pkg"),
            Some(root.join("node_modules/module-pkg/index.mjs"))
        );
        assert_eq!(
            resolve(&r, &root, "module-pkg/lib-alias"),
            Some(root.join("node_modules/module-pkg/lib/index.js"))
        );
        assert_eq!(
            resolve(&r, &root, "module-pkg/export.js"),
            Some(root.join("node_modules/module-pkg/export.js"))
        );
        assert_eq!(resolve(&r, &root, "module-pkg/index"), None);
        assert_eq!(resolve(&r, &root, "module-pkg/lib"), None);
    }

    #[test]
    fn test_browser_field_remaps_requests_and_files() {
        let (_dir, root) = fixture_root();
        write(
            &root,
            "node_modules/iso-pkg/package.json",
            r#"{
                "main": "./node.js",
                "browser": {
                    "./node.js": "./browser.js",
                    "./lib/server": "./lib/client.js",
                    "./lib/fs.js": false,
                    "module-a": false,
                    "module-b": "./shim-b.js"
                }
            }"#,
        );
        for file in [
            "node.js",
            "browser.js",
            "shim-b.js",
            "lib/server.js",
            "lib/client.js",
            "lib/fs.js",
        ] {
            write(&root, &format!("node_modules/iso-pkg/{file}"), "");
        }
        write(&root, "node_modules/module-a/index.js", "");
        write(&root, "node_modules/module-b/index.js", "");
        let pkg = root.join("node_modules/iso-pkg");
        let r = resolver();

        assert_eq!(resolve(&r, &root, "iso-pkg"), Some(pkg.join("browser.js")));
        assert_eq!(resolve(&r, &root, "iso-pkg/lib/server"), Some(pkg.join("lib/client.js")));
        assert_eq!(resolve(&r, &root, "iso-pkg/lib/fs"), None);
        assert_eq!(
            resolve(&r, &pkg.join("lib"), "./server.js"),
            Some(pkg.join("lib/client.js"))
        );
        assert_eq!(resolve(&r, &pkg.join("lib"), "module-a"), None);
        assert_eq!(resolve(&r, &pkg, "module-b"), Some(pkg.join("shim-b.js")));
        assert_eq!(
            resolve(&r, &root, "module-a"),
            Some(root.join("node_modules/module-a/index.js"))
        );

        let options = ResolverOptions {
            alias_fields: Vec::new(),
            ..ResolverOptions::default()
        };
        let r = Resolver::new(options);
        assert_eq!(resolve(&r, &root, "iso-pkg"), Some(pkg.join("node.js")));
        assert_eq!(
            resolve(&r, &pkg, "module-a"),
            Some(root.join("node_modules/module-a/index.js"))
        );
    }

    #[test]
    fn test_hash_imports() {
        let (_dir, root) = fixture_root();
        write(
            &root,
            "package.json",
            r##"{"imports": {"#internal/*": "./src/internal/*.js"}}"##,
        );
        write(&root, "src/internal/util.js", "");
        let r = resolver();

        assert_eq!(
            resolve(&r, &root.join("src"), "#internal/util"),
            Some(root.join("src/internal/util.js"))
        );
        assert_eq!(resolve(&r, &root.join("src"), "#internal/none"), None);
    }

    #[test]
    fn test_alias_then_fallthrough() {
        let (_dir, root) = fixture_root();
        write(&root, "src/a/index.js", "");
        write(&root, "node_modules/@/b/index.js", "");
        let options = ResolverOptions {
            alias: AliasTable::from_entries(vec![AliasEntry {
                key: "@".to_string(),
                targets: vec![root.join("missing"), root.join("src")],
            }]),
            ..ResolverOptions::default()
        };
        let r = Resolver::new(options);

        assert_eq!(resolve(&r, &root, "@/a"), Some(root.join("src/a/index.js")));
        assert_eq!(resolve(&r, &root, "@/b"), Some(root.join("node_modules/@/b/index.js")));
    }

    #[test]
    fn test_rooted_specifier() {
        let (_dir, root) = fixture_root();
        write(&root, "app/components/button.tsx", "");
        let options = ResolverOptions {
            roots: vec![root.join("app")],
            ..ResolverOptions::default()
        };
        let r = Resolver::new(options);

        assert_eq!(
            resolve(&r, &root, "/components/button"),
            Some(root.join("app/components/button.tsx"))
        );
        let absolute = root.join("app/components/button").to_string_lossy().into_owned();
        assert_eq!(
            resolve(&r, &root, &absolute),
            Some(root.join("app/components/button.tsx"))
        );
    }

    #[test]
    fn test_base_url_lookup() {
        let (_dir, root) = fixture_root();
        write(&root, "src/utils/math.ts", "");
        let options = ResolverOptions {
            base_url: Some(root.join("src")),
            ..ResolverOptions::default()
        };
        let r = Resolver::new(options);

        assert_eq!(resolve(&r, &root, "utils/math"), Some(root.join("src/utils/math.ts")));
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinks_resolved_to_real_path() {
        let (_dir, root) = fixture_root();
        write(&root, "packages/shared/index.js", "");
        fs::create_dir_all(root.join("app/node_modules")).unwrap();
        std::os::unix::fs::symlink(
            root.join("packages/shared"),
            root.join("app/node_modules/shared"),
        )
        .unwrap();

        let r = resolver();
        assert_eq!(
            resolve(&r, &root.join("app"), "shared"),
            Some(root.join("packages/shared/index.js"))
        );

        let options = ResolverOptions {
            symlinks: false,
            ..ResolverOptions::default()
        };
        let r = Resolver::new(options);
        assert_eq!(
            resolve(&r, &root.join("app"), "shared"),
            Some(root.join("app/node_modules/shared/index.js"))
        );
    }

    #[test]
    fn test_stat_cache_cleared() {
        let (_dir, root) = fixture_root();
        let r = resolver();
        assert_eq!(resolve(&r, &root, "./late"), None);
        assert!(r.cached_entries() > 0);

        write(&root, "late.js", "");
        r.clear_cache();
        assert_eq!(r.cached_entries(), 0);
        assert_eq!(resolve(&r, &root, "./late"), Some(root.join("late.js")));
    }

    #[test]
    fn test_cache_key_tracks_options() {
        let base = ResolverOptions::default();
        let mut other = base.clone();
        assert_eq!(base.cache_key(), other.cache_key());

        other.roots.push(PathBuf::from("/repo"));
        assert_ne!(base.cache_key(), other.cache_key());
        assert!(base.cache_key().is_some());
    }

    #[test]
    #[cfg(unix)]
    fn test_cache_key_absent_for_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut a = ResolverOptions::default();
        a.roots.push(PathBuf::from(OsStr::from_bytes(b"/repo/a\xff")));
        let mut b = ResolverOptions::default();
        b.roots.push(PathBuf::from(OsStr::from_bytes(b"/other/b\xfe")));
        b.extensions = vec![".js".to_string()];

        assert_eq!(a.cache_key(), None);
        assert_eq!(b.cache_key(), None);
    }
}
