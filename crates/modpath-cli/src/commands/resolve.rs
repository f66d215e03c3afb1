//! `modpath resolve` command implementation.

use super::OptionArgs;
use miette::{IntoDiagnostic, Result};
use modpath_core::{Caches, ResolveResult, OUTPUT_SCHEMA_VERSION};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON output of `modpath --json resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveOutput<'a> {
    pub schema_version: u32,
    pub specifier: &'a str,
    pub source_file: &'a Path,
    #[serde(flatten)]
    pub result: &'a ResolveResult,
}

/// Run the resolve command.
///
/// Exits with status 1 when the specifier cannot be resolved.
pub fn run(
    cwd: &Path,
    specifier: &str,
    source_file: &Path,
    args: &OptionArgs,
    no_cache: bool,
    json: bool,
) -> Result<()> {
    let options = args.to_options(cwd)?;
    let source_file: PathBuf = cwd.join(source_file);

    if no_cache {
        Caches::global().set_enabled(false);
    }

    debug!(specifier, source = %source_file.display(), "Resolving");
    let result = modpath_core::resolve(specifier, &source_file, Some(&options));

    if json {
        let output = ResolveOutput {
            schema_version: OUTPUT_SCHEMA_VERSION,
            specifier,
            source_file: &source_file,
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        match &result {
            ResolveResult::Found { path: Some(path) } => println!("{}", path.display()),
            ResolveResult::Found { path: None } => println!("{specifier} (builtin)"),
            ResolveResult::NotFound => {
                eprintln!(
                    "error: cannot resolve '{specifier}' from {}",
                    source_file.display()
                );
            }
        }
    }

    if !result.is_found() {
        std::process::exit(1);
    }
    Ok(())
}
