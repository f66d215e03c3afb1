#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Module specifier resolution for JavaScript and TypeScript sources.
//!
//! Resolves import specifiers across monorepo packages, honoring explicit
//! aliases, `tsconfig`/`jsconfig` path mappings, and package manifest
//! `exports`/`imports` fields.

pub mod alias;
pub mod cache;
pub mod discovery;
pub mod documents;
pub mod engine;
pub mod error;
pub mod options;
pub mod paths;
pub mod resolver;
pub mod specifier;
pub mod tsconfig;
pub mod version;
pub mod workspace;

pub use cache::{CacheStats, Caches};
pub use engine::{clear_caches, resolve, ImportResolver};
pub use error::{Error, Result};
pub use options::{
    ConfigFileOptions, ConfigFlag, PackageOptions, PackagesOption, Platform, ReferencesMode,
    ResolveOptions, WorkspaceFile, CACHE_DISABLED_ENV,
};
pub use resolver::{ResolveResult, Resolver, ResolverOptions};
pub use specifier::{classify, Specifier};
pub use version::{version_string, OUTPUT_SCHEMA_VERSION, VERSION};
pub use workspace::find_workspace_packages;
