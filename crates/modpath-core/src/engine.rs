//! Resolution entry points.
//!
//! `resolve` classifies the specifier. Non-relative specifiers first find their
//! owning package root and config, which together produce the alias table for a
//! cached [`Resolver`]. Every failure ends in [`ResolveResult::NotFound`].

use crate::alias::{build_alias_table, AliasTable};
use crate::cache::Caches;
use crate::options::ResolveOptions;
use crate::paths::{absolutize, parent_dir, unique};
use crate::resolver::{ResolveResult, Resolver, ResolverOptions};
use crate::specifier::{classify, Specifier};
use crate::tsconfig::{read_config_paths, select_config, ConfigPaths};
use crate::workspace::{find_closest_package_root, find_workspace_packages};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolve `specifier` imported from `source_file` using the process-wide caches.
///
/// `None` options use every default, with the current directory as the only root.
#[must_use]
pub fn resolve(
    specifier: &str,
    source_file: &Path,
    options: Option<&ResolveOptions>,
) -> ResolveResult {
    let default_options;
    let options = match options {
        Some(options) => options,
        None => {
            default_options = ResolveOptions::default();
            &default_options
        }
    };

    let caches = Caches::global();
    let roots = effective_roots(options);
    let context = Context {
        options,
        roots: &roots,
        caches,
    };

    let source_file = absolutize(source_file);
    match classify(specifier, options.platform) {
        Specifier::Absolute(_) | Specifier::Bare { .. } => {
            let packages = find_workspace_packages(&roots, options.packages.as_ref(), caches);
            context.resolve(specifier, &source_file, &packages)
        }
        _ => context.resolve(specifier, &source_file, &[]),
    }
}

/// Clear the process-wide caches used by [`resolve`].
pub fn clear_caches() {
    Caches::global().clear();
}

fn effective_roots(options: &ResolveOptions) -> Vec<PathBuf> {
    unique(options.effective_roots().iter().map(|root| absolutize(root)))
}

/// A long-lived resolver for one option set.
///
/// Workspace packages are discovered once, at construction.
#[derive(Debug)]
pub struct ImportResolver {
    options: ResolveOptions,
    roots: Vec<PathBuf>,
    packages: Vec<PathBuf>,
    caches: Arc<Caches>,
}

impl ImportResolver {
    /// Create a resolver with its own caches.
    #[must_use]
    pub fn new(options: ResolveOptions) -> Self {
        Self::with_caches(options, Arc::new(Caches::new()))
    }

    /// Create a resolver backed by `caches`.
    #[must_use]
    pub fn with_caches(options: ResolveOptions, caches: Arc<Caches>) -> Self {
        let roots = effective_roots(&options);
        let packages = find_workspace_packages(&roots, options.packages.as_ref(), &caches);
        debug!(roots = ?roots, packages = packages.len(), "Created import resolver");
        Self {
            options,
            roots,
            packages,
            caches,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Candidate package roots, deepest first.
    #[must_use]
    pub fn packages(&self) -> &[PathBuf] {
        &self.packages
    }

    #[must_use]
    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    /// Resolve `specifier` imported from `source_file`.
    #[must_use]
    pub fn resolve(&self, specifier: &str, source_file: &Path) -> ResolveResult {
        let context = Context {
            options: &self.options,
            roots: &self.roots,
            caches: &self.caches,
        };
        context.resolve(specifier, &absolutize(source_file), &self.packages)
    }
}

/// Borrowed state for one resolve call.
struct Context<'a> {
    options: &'a ResolveOptions,
    roots: &'a [PathBuf],
    caches: &'a Caches,
}

impl Context<'_> {
    fn resolve(&self, specifier: &str, source_file: &Path, packages: &[PathBuf]) -> ResolveResult {
        let classified = classify(specifier, self.options.platform);
        trace!(specifier, kind = classified.kind(), "Classified specifier");

        match classified {
            Specifier::Empty | Specifier::UnknownBuiltin => ResolveResult::NotFound,
            Specifier::Builtin => ResolveResult::builtin(),
            Specifier::Relative(request) => self.resolve_relative(request, source_file),
            Specifier::Absolute(request) => self.resolve_rooted(request, source_file, packages),
            Specifier::Bare { request, .. } => self.resolve_bare(request, source_file, packages),
        }
    }

    /// Relative specifiers bypass package and config discovery.
    fn resolve_relative(&self, request: &str, source_file: &Path) -> ResolveResult {
        let options = ResolverOptions::from_resolve_options(self.options);
        self.run(options, request, source_file)
    }

    /// `/` specifiers: the filesystem path, then beneath the package root and roots.
    fn resolve_rooted(&self, request: &str, source_file: &Path, packages: &[PathBuf]) -> ResolveResult {
        let mut options = ResolverOptions::from_resolve_options(self.options);
        options.roots = self.package_roots(find_closest_package_root(packages, source_file));
        self.run(options, request, source_file)
    }

    fn resolve_bare(&self, request: &str, source_file: &Path, packages: &[PathBuf]) -> ResolveResult {
        let Some(package_root) = find_closest_package_root(packages, source_file) else {
            debug!(source = %source_file.display(), "Source file is outside every package root");
            return ResolveResult::NotFound;
        };

        let config = select_config(
            &self.options.tsconfig,
            &self.options.jsconfig,
            package_root,
            source_file,
            self.caches,
        );
        let config_paths = config
            .as_ref()
            .map(|config| read_config_paths(config, self.caches))
            .unwrap_or_default();
        let alias = self.alias_table(package_root, &config_paths);

        let mut options = ResolverOptions::from_resolve_options(self.options);
        options.alias = alias;
        options.config = config;
        options.base_url = config_paths.base_url;
        options.roots = self.package_roots(Some(package_root));
        self.run(options, request, source_file)
    }

    fn alias_table(&self, package_root: &Path, config_paths: &ConfigPaths) -> AliasTable {
        build_alias_table(&self.options.alias, package_root, &config_paths.mappings)
    }

    /// `unique([package_root] ++ roots)`.
    fn package_roots(&self, package_root: Option<&Path>) -> Vec<PathBuf> {
        unique(
            package_root
                .map(Path::to_path_buf)
                .into_iter()
                .chain(self.roots.iter().cloned()),
        )
    }

    fn run(&self, options: ResolverOptions, request: &str, source_file: &Path) -> ResolveResult {
        let resolver = match options.cache_key() {
            Some(key) => self.caches.resolver(&key, || Resolver::new(options)),
            None => {
                debug!("Resolver options are not hashable, using an unshared handle");
                Arc::new(Resolver::new(options))
            }
        };
        let found = resolver.resolve(parent_dir(source_file), request, self.caches);

        debug!(
            request,
            source = %source_file.display(),
            resolved = ?found,
            "Resolved specifier"
        );
        ResolveResult::from(found)
    }
}
