#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]

mod commands;
mod logging;

use clap::Parser;
use commands::OptionArgs;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "modpath")]
#[command(author, version, about = "Resolve JavaScript/TypeScript import specifiers", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve a specifier as imported from a source file
    Resolve {
        /// The import specifier, e.g. "@/utils" or "./a"
        specifier: String,

        /// The importing file
        source_file: PathBuf,

        #[command(flatten)]
        options: OptionArgs,

        /// Skip the process caches
        #[arg(long)]
        no_cache: bool,
    },

    /// List candidate package roots, deepest first
    Packages {
        #[command(flatten)]
        options: OptionArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Some(Commands::Resolve {
            specifier,
            source_file,
            options,
            no_cache,
        }) => commands::resolve::run(&cwd, &specifier, &source_file, &options, no_cache, cli.json),
        Some(Commands::Packages { options }) => commands::packages::run(&cwd, &options, cli.json),
        Some(Commands::Version) | None => commands::version::run(cli.json),
    }
}
