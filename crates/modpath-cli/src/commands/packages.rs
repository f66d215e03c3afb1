//! `modpath packages` command implementation.
//!
//! Lists the candidate package roots a resolve call would choose from.

use super::OptionArgs;
use miette::Result;
use modpath_core::{ImportResolver, OUTPUT_SCHEMA_VERSION};
use std::path::Path;

/// Run the packages command.
pub fn run(cwd: &Path, args: &OptionArgs, json: bool) -> Result<()> {
    let options = args.to_options(cwd)?;
    let resolver = ImportResolver::new(options);
    let packages = resolver.packages();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "schema_version": OUTPUT_SCHEMA_VERSION,
                "roots": resolver.options().roots,
                "packages": packages,
            })
        );
    } else {
        println!("Packages ({}):", packages.len());
        for package in packages {
            println!("  {}", package.display());
        }
    }

    Ok(())
}
