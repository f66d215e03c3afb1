//! Project config (`tsconfig.json` / `jsconfig.json`) selection and path mappings.
//!
//! Config files are discovered under a package root, ordered from most to
//! least specific, and the first one whose directory contains the source file
//! applies. Its `compilerOptions.paths` (after following `extends`) feed the
//! alias table.

use crate::cache::Caches;
use crate::discovery::find_config_files;
use crate::documents::{read_document, DocumentCache, DocumentFormat};
use crate::error::{Error, Result};
use crate::options::{
    ConfigFlag, ReferencesMode, DEFAULT_CONFIG_IGNORE, JSCONFIG_FILENAME, TSCONFIG_FILENAME,
};
use crate::paths::{is_path_prefix, parent_dir, path_depth, resolve_against};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Which flag a config file was discovered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    /// `tsconfig`; wins ties against secondary configs.
    Primary,
    /// `jsconfig`.
    Secondary,
}

/// A discovered config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub depth: usize,
    pub kind: ConfigKind,
}

impl ConfigFile {
    #[must_use]
    pub fn new(path: PathBuf, kind: ConfigKind) -> Self {
        let depth = path_depth(&path);
        Self { path, depth, kind }
    }

    /// Directory containing the config.
    #[must_use]
    pub fn dir(&self) -> &Path {
        parent_dir(&self.path)
    }
}

/// Deeper first, then primary before secondary, then reverse lexicographic.
#[must_use]
pub fn compare_config_files(a: &ConfigFile, b: &ConfigFile) -> Ordering {
    b.depth
        .cmp(&a.depth)
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| b.path.to_string_lossy().cmp(&a.path.to_string_lossy()))
}

#[must_use]
pub fn sort_config_files(mut configs: Vec<ConfigFile>) -> Vec<ConfigFile> {
    configs.sort_by(compare_config_files);
    configs
}

/// First config in `sorted` whose directory contains `source_file`.
#[must_use]
pub fn find_closest_config<'a>(sorted: &'a [ConfigFile], source_file: &Path) -> Option<&'a ConfigFile> {
    let source_dir = parent_dir(source_file);
    sorted
        .iter()
        .find(|config| is_path_prefix(config.dir(), source_dir))
}

/// The config that applies to one source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedConfig {
    pub config_file: PathBuf,
    pub references: ReferencesMode,
}

/// How to search for one kind of config.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Search {
    /// Skip discovery; use this file.
    Fixed(PathBuf, ReferencesMode),
    Glob {
        filename: String,
        ignore: Vec<String>,
        references: ReferencesMode,
    },
}

fn default_config_ignore() -> Vec<String> {
    DEFAULT_CONFIG_IGNORE
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned())
}

fn search_for(flag: &ConfigFlag, default_filename: &str) -> Option<Search> {
    match flag {
        ConfigFlag::Disabled => None,
        ConfigFlag::Auto => Some(Search::Glob {
            filename: default_filename.to_string(),
            ignore: default_config_ignore(),
            references: ReferencesMode::default(),
        }),
        ConfigFlag::Named(name) => Some(Search::Glob {
            filename: basename(name),
            ignore: default_config_ignore(),
            references: ReferencesMode::default(),
        }),
        ConfigFlag::Explicit(options) => {
            let ignore = options.ignore.clone().unwrap_or_else(default_config_ignore);
            match options.config_file.as_deref() {
                Some(file) if Path::new(file).is_absolute() => {
                    Some(Search::Fixed(PathBuf::from(file), options.references))
                }
                Some(file) => Some(Search::Glob {
                    filename: basename(file),
                    ignore,
                    references: options.references,
                }),
                None => Some(Search::Glob {
                    filename: default_filename.to_string(),
                    ignore,
                    references: options.references,
                }),
            }
        }
    }
}

/// Pick the config file that applies to `source_file` inside `package_root`.
///
/// Returns `None` when both flags are disabled or no discovered config
/// contains the source file.
#[must_use]
pub fn select_config(
    tsconfig: &ConfigFlag,
    jsconfig: &ConfigFlag,
    package_root: &Path,
    source_file: &Path,
    caches: &Caches,
) -> Option<SelectedConfig> {
    let primary = search_for(tsconfig, TSCONFIG_FILENAME);
    let secondary = search_for(jsconfig, JSCONFIG_FILENAME);

    for search in [&primary, &secondary].into_iter().flatten() {
        if let Search::Fixed(path, references) = search {
            trace!(config = %path.display(), "Using explicit config file");
            return Some(SelectedConfig {
                config_file: path.clone(),
                references: *references,
            });
        }
    }

    let globs: Vec<(ConfigKind, &String, &Vec<String>, ReferencesMode)> = [
        (ConfigKind::Primary, &primary),
        (ConfigKind::Secondary, &secondary),
    ]
    .into_iter()
    .filter_map(|(kind, search)| match search {
        Some(Search::Glob {
            filename,
            ignore,
            references,
        }) => Some((kind, filename, ignore, *references)),
        _ => None,
    })
    .collect();

    if globs.is_empty() {
        return None;
    }

    let key = (
        package_root.to_path_buf(),
        globs.iter().map(|(_, name, _, _)| (*name).clone()).collect(),
        globs.iter().map(|(_, _, ignore, _)| ignore.join(",")).collect(),
    );

    let configs = caches.config_list(key, || {
        let mut found: Vec<ConfigFile> = Vec::new();
        for (kind, filename, ignore, _) in &globs {
            for path in find_config_files(package_root, std::slice::from_ref(*filename), ignore) {
                if !found.iter().any(|c| c.path == path) {
                    found.push(ConfigFile::new(path, *kind));
                }
            }
        }
        sort_config_files(found)
    });

    let closest = find_closest_config(&configs, source_file)?;
    let references = globs
        .iter()
        .find(|(kind, _, _, _)| *kind == closest.kind)
        .map_or_else(ReferencesMode::default, |(_, _, _, references)| *references);

    debug!(config = %closest.path.display(), "Selected config file");
    Some(SelectedConfig {
        config_file: closest.path.clone(),
        references,
    })
}

/// One `compilerOptions.paths` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    /// Raw key, e.g. `@/*`.
    pub pattern: String,
    /// Directory the targets are relative to.
    pub base: PathBuf,
    /// Raw targets, e.g. `src/*`.
    pub targets: Vec<String>,
}

/// Module lookup settings taken from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Absolute `baseUrl`; bare specifiers are also looked up beneath it.
    pub base_url: Option<PathBuf>,
    pub mappings: Vec<PathMapping>,
}

/// Effective path options after following `extends`.
#[derive(Debug, Clone, Default)]
struct CompilerPaths {
    base_url: Option<PathBuf>,
    /// `paths` and the directory of the config that declared it.
    paths: Option<(PathBuf, serde_json::Map<String, Value>)>,
}

impl CompilerPaths {
    fn apply(&mut self, other: CompilerPaths) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.paths.is_some() {
            self.paths = other.paths;
        }
    }

    fn into_config_paths(self) -> ConfigPaths {
        let base_url = self.base_url;
        let Some((paths_dir, paths)) = self.paths else {
            return ConfigPaths {
                base_url,
                mappings: Vec::new(),
            };
        };
        let base = base_url.clone().unwrap_or(paths_dir);

        let mappings = paths
            .into_iter()
            .filter_map(|(pattern, value)| {
                let targets: Vec<String> = value
                    .as_array()?
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect();
                Some(PathMapping {
                    pattern,
                    base: base.clone(),
                    targets,
                })
            })
            .collect();

        ConfigPaths { base_url, mappings }
    }
}

/// Locate the file named by an `extends` entry.
fn resolve_extends(extends: &str, config_dir: &Path) -> Result<PathBuf> {
    let not_found = || Error::ExtendsNotFound {
        extends: extends.to_string(),
        from: config_dir.to_path_buf(),
    };

    let with_json = |path: PathBuf| -> Option<PathBuf> {
        if path.is_file() {
            return Some(path);
        }
        let mut appended = path.into_os_string();
        appended.push(".json");
        let appended = PathBuf::from(appended);
        appended.is_file().then_some(appended)
    };

    if extends.starts_with('.') || Path::new(extends).is_absolute() {
        return with_json(resolve_against(config_dir, extends)).ok_or_else(not_found);
    }

    for dir in config_dir.ancestors() {
        let candidate = dir.join("node_modules").join(extends);
        if let Some(found) = with_json(candidate.clone()) {
            return Ok(found);
        }
        let nested = candidate.join(TSCONFIG_FILENAME);
        if nested.is_file() {
            return Ok(nested);
        }
    }

    Err(not_found())
}

fn load_compiler_paths(
    path: &Path,
    documents: &dyn DocumentCache,
    stack: &mut Vec<PathBuf>,
) -> Result<CompilerPaths> {
    if stack.iter().any(|p| p == path) {
        return Err(Error::ExtendsCycle {
            path: path.to_path_buf(),
        });
    }

    let Some(document) = read_document(path, DocumentFormat::Json5, documents) else {
        return Ok(CompilerPaths::default());
    };
    let config_dir = parent_dir(path).to_path_buf();

    stack.push(path.to_path_buf());
    let mut merged = CompilerPaths::default();

    let extends: Vec<&str> = match document.get("extends") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    for entry in extends {
        let base = resolve_extends(entry, &config_dir)?;
        merged.apply(load_compiler_paths(&base, documents, stack)?);
    }
    stack.pop();

    let compiler_options = document.get("compilerOptions");
    let own = CompilerPaths {
        base_url: compiler_options
            .and_then(|o| o.get("baseUrl"))
            .and_then(Value::as_str)
            .map(|base_url| resolve_against(&config_dir, base_url)),
        paths: compiler_options
            .and_then(|o| o.get("paths"))
            .and_then(Value::as_object)
            .map(|paths| (config_dir.clone(), paths.clone())),
    };
    merged.apply(own);

    Ok(merged)
}

/// Config files listed under `references`, resolved to files.
fn referenced_configs(path: &Path, documents: &dyn DocumentCache) -> Vec<PathBuf> {
    let Some(document) = read_document(path, DocumentFormat::Json5, documents) else {
        return Vec::new();
    };
    let config_dir = parent_dir(path);

    document
        .get("references")
        .and_then(Value::as_array)
        .map(|refs| {
            refs.iter()
                .filter_map(|r| r.get("path").and_then(Value::as_str))
                .map(|p| {
                    let target = resolve_against(config_dir, p);
                    if target.is_dir() {
                        target.join(TSCONFIG_FILENAME)
                    } else {
                        target
                    }
                })
                .filter(|p| p.as_path() != path)
                .collect()
        })
        .unwrap_or_default()
}

/// Path settings for one config file, following its `extends` chain.
pub fn load_config_paths(path: &Path, documents: &dyn DocumentCache) -> Result<ConfigPaths> {
    let mut stack = Vec::new();
    Ok(load_compiler_paths(path, documents, &mut stack)?.into_config_paths())
}

/// Path settings for the selected config.
///
/// With references enabled, mappings of referenced projects follow the
/// config's own. Only the selected config contributes `baseUrl`. Broken
/// configs contribute nothing.
#[must_use]
pub fn read_config_paths(config: &SelectedConfig, documents: &dyn DocumentCache) -> ConfigPaths {
    let mut paths = match load_config_paths(&config.config_file, documents) {
        Ok(paths) => paths,
        Err(e) => {
            debug!(config = %config.config_file.display(), error = %e, "Ignoring config");
            ConfigPaths::default()
        }
    };

    if config.references == ReferencesMode::Auto {
        for file in referenced_configs(&config.config_file, documents) {
            match load_config_paths(&file, documents) {
                Ok(found) => paths.mappings.extend(found.mappings),
                Err(e) => debug!(config = %file.display(), error = %e, "Ignoring referenced config"),
            }
        }
    }
    paths
}
