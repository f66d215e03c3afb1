//! Resolver options and their defaults.
//!
//! Options deserialize from the same JSON shape a linter configuration would
//! carry (camelCase keys, `bool | string | object` config flags, `string |
//! string[]` alias values). Loose shapes are normalized into tagged enums here,
//! before any discovery runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Extensions tried, in order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts", ".js", ".jsx", ".json", ".node"];

/// Condition names for `exports`/`imports` maps, highest priority first.
pub const DEFAULT_CONDITION_NAMES: &[&str] = &[
    "types",
    "import",
    // Angular package format
    "esm2020",
    "es2020",
    "es2015",
    "require",
    "node",
    "node-addons",
    "browser",
    "default",
];

/// Manifest fields consulted for a package entry point when `exports` is absent.
pub const DEFAULT_MAIN_FIELDS: &[&str] = &[
    "types",
    "typings",
    // Angular package format
    "fesm2020",
    "fesm2015",
    "esm2020",
    "es2020",
    "module",
    "jsnext:main",
    "main",
    "browser",
];

/// Manifest fields holding a browser-style replacement map.
pub const DEFAULT_ALIAS_FIELDS: &[&str] = &["browser"];

/// Requested extension -> extensions actually tried, in order.
///
/// Compiled output may originate from a higher-level source extension, so a
/// request for `./foo.js` also accepts `./foo.ts`.
pub const DEFAULT_EXTENSION_ALIAS: &[(&str, &[&str])] = &[
    (".js", &[".ts", ".tsx", ".d.ts", ".js"]),
    (".jsx", &[".tsx", ".d.ts", ".jsx"]),
    (".cjs", &[".cts", ".d.cts", ".cjs"]),
    (".mjs", &[".mts", ".d.mts", ".mjs"]),
    (".ts", &[".ts", ".d.ts", ".js"]),
    (".tsx", &[".tsx", ".d.ts", ".jsx", ".js"]),
    (".cts", &[".cts", ".d.cts", ".cjs"]),
    (".mts", &[".mts", ".d.mts", ".mjs"]),
];

/// Ignore globs for manifest discovery.
pub const DEFAULT_PACKAGE_IGNORE: &[&str] = &[
    "**/node_modules/**",
    "**/bower_components/**",
    "**/test/**",
    "**/tests/**",
];

/// Ignore globs for project config discovery.
pub const DEFAULT_CONFIG_IGNORE: &[&str] = &["**/node_modules/**"];

pub const PNPM_WORKSPACE_FILENAME: &str = "pnpm-workspace.yaml";
pub const TSCONFIG_FILENAME: &str = "tsconfig.json";
pub const JSCONFIG_FILENAME: &str = "jsconfig.json";

/// Environment variable that disables every cache when set to a non-empty value.
pub const CACHE_DISABLED_ENV: &str = "NEXT_RESOLVER_CACHE_DISABLED";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Runtime whose built-in modules are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Node,
    Bun,
}

impl Platform {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Bun => "bun",
        }
    }
}

/// How project references in a config file are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReferencesMode {
    /// Path mappings of referenced projects apply after the config's own.
    #[default]
    Auto,
    Disabled,
}

/// Explicit project config options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFileOptions {
    /// Config file path. Absolute paths skip discovery entirely.
    pub config_file: Option<String>,
    pub references: ReferencesMode,
    /// Ignore globs for discovery (defaults to dependency directories).
    pub ignore: Option<Vec<String>>,
}

/// Whether and how to look for a project config file of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "RawConfigFlag", into = "RawConfigFlag")]
pub enum ConfigFlag {
    Disabled,
    /// Search for the default filename of this kind.
    #[default]
    Auto,
    /// Search for the basename of this path.
    Named(String),
    Explicit(ConfigFileOptions),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawConfigFlag {
    Bool(bool),
    Name(String),
    Options(ConfigFileOptions),
}

impl From<RawConfigFlag> for ConfigFlag {
    fn from(raw: RawConfigFlag) -> Self {
        match raw {
            RawConfigFlag::Bool(true) => Self::Auto,
            RawConfigFlag::Bool(false) => Self::Disabled,
            RawConfigFlag::Name(name) => Self::Named(name),
            RawConfigFlag::Options(options) => Self::Explicit(options),
        }
    }
}

impl From<ConfigFlag> for RawConfigFlag {
    fn from(flag: ConfigFlag) -> Self {
        match flag {
            ConfigFlag::Disabled => Self::Bool(false),
            ConfigFlag::Auto => Self::Bool(true),
            ConfigFlag::Named(name) => Self::Name(name),
            ConfigFlag::Explicit(options) => Self::Options(options),
        }
    }
}

/// Workspace manifest (`pnpm-workspace.yaml`) lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "RawWorkspaceFile", into = "RawWorkspaceFile")]
pub enum WorkspaceFile {
    #[default]
    None,
    /// `pnpm-workspace.yaml` at each root.
    Default,
    /// A named file relative to each root.
    Named(String),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawWorkspaceFile {
    Bool(bool),
    Name(String),
}

impl From<RawWorkspaceFile> for WorkspaceFile {
    fn from(raw: RawWorkspaceFile) -> Self {
        match raw {
            RawWorkspaceFile::Bool(true) => Self::Default,
            RawWorkspaceFile::Bool(false) => Self::None,
            RawWorkspaceFile::Name(name) => Self::Named(name),
        }
    }
}

impl From<WorkspaceFile> for RawWorkspaceFile {
    fn from(file: WorkspaceFile) -> Self {
        match file {
            WorkspaceFile::None => Self::Bool(false),
            WorkspaceFile::Default => Self::Bool(true),
            WorkspaceFile::Named(name) => Self::Name(name),
        }
    }
}

/// Package discovery options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageOptions {
    /// Glob patterns of package directories, relative to each root.
    pub patterns: Option<Vec<String>>,
    /// Ignore globs (defaults to dependency and test directories).
    pub ignore: Option<Vec<String>>,
    /// Also treat the root itself as a package candidate.
    pub include_root: bool,
    pub pnpm_workspace: WorkspaceFile,
}

/// Workspace discovery configuration: a bare pattern list or full options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackagesOption {
    Patterns(Vec<String>),
    Options(PackageOptions),
}

impl PackagesOption {
    /// Normalize into full package options.
    #[must_use]
    pub fn into_options(self) -> PackageOptions {
        match self {
            Self::Patterns(patterns) => PackageOptions {
                patterns: Some(patterns),
                ..PackageOptions::default()
            },
            Self::Options(options) => options,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_alias<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, OneOrMany>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let targets = match value {
                OneOrMany::One(target) => vec![target],
                OneOrMany::Many(targets) => targets,
            };
            (key, targets)
        })
        .collect())
}

/// Options for one resolve call or one long-lived resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveOptions {
    /// Root directories. Empty means the current working directory.
    pub roots: Vec<PathBuf>,
    /// Explicit aliases; relative targets resolve against the nearest package root.
    #[serde(deserialize_with = "deserialize_alias")]
    pub alias: BTreeMap<String, Vec<String>>,
    /// Monorepo package discovery. `None` uses the roots as the only packages.
    pub packages: Option<PackagesOption>,
    pub tsconfig: ConfigFlag,
    pub jsconfig: ConfigFlag,
    pub extensions: Vec<String>,
    pub extension_alias: BTreeMap<String, Vec<String>>,
    pub condition_names: Vec<String>,
    pub main_fields: Vec<String>,
    /// Manifest fields whose object value remaps requests and files; `false` excludes a module.
    pub alias_fields: Vec<String>,
    pub platform: Platform,
    /// Resolve symlinks of found files to their real path.
    pub symlinks: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            alias: BTreeMap::new(),
            packages: None,
            tsconfig: ConfigFlag::Auto,
            jsconfig: ConfigFlag::Auto,
            extensions: strings(DEFAULT_EXTENSIONS),
            extension_alias: DEFAULT_EXTENSION_ALIAS
                .iter()
                .map(|(ext, targets)| ((*ext).to_string(), strings(targets)))
                .collect(),
            condition_names: strings(DEFAULT_CONDITION_NAMES),
            main_fields: strings(DEFAULT_MAIN_FIELDS),
            alias_fields: strings(DEFAULT_ALIAS_FIELDS),
            platform: Platform::default(),
            symlinks: true,
        }
    }
}

impl ResolveOptions {
    /// Create options with the given roots and every other value defaulted.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Parse options from JSON text.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        serde_json::from_str(text).map_err(|e| crate::Error::InvalidOptions(e.to_string()))
    }

    /// Configured roots, or the current working directory when none are set.
    #[must_use]
    pub fn effective_roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
        } else {
            self.roots.clone()
        }
    }

    /// Replace the root directories.
    #[must_use]
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.roots = roots.into_iter().collect();
        self
    }

    /// Add a root directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Set an alias to one or more targets.
    #[must_use]
    pub fn with_alias<I, S>(mut self, key: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias
            .insert(key.into(), targets.into_iter().map(Into::into).collect());
        self
    }

    /// Set workspace package discovery.
    #[must_use]
    pub fn with_packages(mut self, packages: PackagesOption) -> Self {
        self.packages = Some(packages);
        self
    }

    /// Set the primary (tsconfig) flag.
    #[must_use]
    pub fn with_tsconfig(mut self, flag: ConfigFlag) -> Self {
        self.tsconfig = flag;
        self
    }

    /// Set the secondary (jsconfig) flag.
    #[must_use]
    pub fn with_jsconfig(mut self, flag: ConfigFlag) -> Self {
        self.jsconfig = flag;
        self
    }

    /// Set the platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}
