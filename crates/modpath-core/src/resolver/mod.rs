//! Module resolver for JavaScript/TypeScript.
//!
//! A [`Resolver`] is bound to one alias table, config and root list, and
//! turns a request into a file path. Package manifest `exports`/`imports`
//! evaluation lives in [`exports`].

pub mod exports;
mod handle;
mod result;

pub use exports::{resolve_exports, resolve_imports};
pub use handle::{Resolver, ResolverOptions};
pub use result::ResolveResult;
