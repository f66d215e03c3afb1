pub mod packages;
pub mod resolve;
pub mod version;

use miette::{miette, IntoDiagnostic, Result, WrapErr};
use modpath_core::{ConfigFlag, PackagesOption, Platform, ResolveOptions};
use std::path::{Path, PathBuf};

/// Resolver options shared by `resolve` and `packages`.
#[derive(clap::Args, Debug, Default)]
pub struct OptionArgs {
    /// Load options from a JSON file (camelCase keys)
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Root directory (repeatable; defaults to the working directory)
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Alias as KEY=PATH (repeatable; PATH is relative to the package root)
    #[arg(long = "alias", value_name = "KEY=PATH")]
    pub aliases: Vec<String>,

    /// Workspace package directory globs, comma separated
    #[arg(long, value_delimiter = ',', value_name = "GLOB")]
    pub packages: Vec<String>,

    /// Ignore tsconfig.json files
    #[arg(long)]
    pub no_tsconfig: bool,

    /// Ignore jsconfig.json files
    #[arg(long)]
    pub no_jsconfig: bool,

    /// Treat bun built-ins as known modules
    #[arg(long)]
    pub bun: bool,
}

impl OptionArgs {
    /// Build resolver options: the options file first, then flag overrides.
    pub fn to_options(&self, cwd: &Path) -> Result<ResolveOptions> {
        let mut options = match &self.options {
            Some(file) => {
                let path = cwd.join(file);
                let text = std::fs::read_to_string(&path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to read options file {}", path.display()))?;
                ResolveOptions::from_json(&text).into_diagnostic()?
            }
            None => ResolveOptions::default(),
        };

        if !self.roots.is_empty() {
            options.roots = self.roots.clone();
        }
        if options.roots.is_empty() {
            options.roots.push(cwd.to_path_buf());
        }
        options.roots = options.roots.iter().map(|root| cwd.join(root)).collect();

        for alias in &self.aliases {
            let (key, target) = alias
                .split_once('=')
                .ok_or_else(|| miette!("invalid alias `{alias}`, expected KEY=PATH"))?;
            options.alias.entry(key.to_string()).or_default().push(target.to_string());
        }

        if !self.packages.is_empty() {
            options.packages = Some(PackagesOption::Patterns(self.packages.clone()));
        }
        if self.no_tsconfig {
            options.tsconfig = ConfigFlag::Disabled;
        }
        if self.no_jsconfig {
            options.jsconfig = ConfigFlag::Disabled;
        }
        if self.bun {
            options.platform = Platform::Bun;
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_cwd_root() {
        let options = OptionArgs::default().to_options(Path::new("/repo")).unwrap();
        assert_eq!(options.roots, vec![PathBuf::from("/repo")]);
        assert_eq!(options.tsconfig, ConfigFlag::Auto);
    }

    #[test]
    fn test_flag_overrides() {
        let args = OptionArgs {
            roots: vec![PathBuf::from("apps"), PathBuf::from("/abs")],
            aliases: vec!["@=./src".to_string(), "@=./lib".to_string()],
            packages: vec!["packages/*".to_string()],
            no_tsconfig: true,
            bun: true,
            ..OptionArgs::default()
        };
        let options = args.to_options(Path::new("/repo")).unwrap();

        assert_eq!(
            options.roots,
            vec![PathBuf::from("/repo/apps"), PathBuf::from("/abs")]
        );
        assert_eq!(options.alias["@"], vec!["./src", "./lib"]);
        assert_eq!(
            options.packages,
            Some(PackagesOption::Patterns(vec!["packages/*".to_string()]))
        );
        assert_eq!(options.tsconfig, ConfigFlag::Disabled);
        assert_eq!(options.jsconfig, ConfigFlag::Auto);
        assert_eq!(options.platform, Platform::Bun);
    }

    #[test]
    fn test_invalid_alias() {
        let args = OptionArgs {
            aliases: vec!["no-equals".to_string()],
            ..OptionArgs::default()
        };
        assert!(args.to_options(Path::new("/repo")).is_err());
    }
}
