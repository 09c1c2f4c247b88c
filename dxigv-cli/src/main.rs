//! dxigv - publish DNAnexus projects to IGV through a data server registry.
//!
//! ```text
//! dxigv add -p project-BzPb25j0627bFJv6q9g81ZX5 -p "NA12878 public"
//! dxigv new --dry-run
//! dxigv rebuild --existing-only -g LKCGP
//! dxigv manifest -p "NA12878 public" -o /tmp
//! ```

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::common::RegistryArgs;
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "dxigv", version, about = "IGV data server registries for DNAnexus projects")]
struct Cli {
    /// Enable debug logging for dxigv
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add projects, by id or name, to the registry
    Add {
        /// Project id or name (repeatable)
        #[arg(short = 'p', long = "project", required = true)]
        projects: Vec<String>,

        #[command(flatten)]
        registry: RegistryArgs,
    },

    /// Add every remote project that is not yet in the registry
    New {
        #[command(flatten)]
        registry: RegistryArgs,

        /// Only list the projects that would be added
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete all manifests and the registry file, then regenerate them
    Rebuild {
        #[command(flatten)]
        registry: RegistryArgs,

        /// Only rebuild projects that were already registered
        #[arg(long)]
        existing_only: bool,
    },

    /// List registered projects
    List {
        #[command(flatten)]
        registry: RegistryArgs,
    },

    /// Write project manifests without updating any registry
    Manifest {
        /// Project id or name (repeatable)
        #[arg(short = 'p', long = "project", required = true)]
        projects: Vec<String>,

        /// Output folder (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Validity of download URLs in seconds
        #[arg(short = 'd', long)]
        duration: Option<u64>,
    },

    /// Create or refresh the configuration file
    Init,

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    let verbose = cli.verbose;
    match cli.command {
        Commands::Add { projects, registry } => {
            commands::publish::run_add(&projects, &registry, verbose)
        }
        Commands::New { registry, dry_run } => {
            commands::publish::run_new(&registry, dry_run, verbose)
        }
        Commands::Rebuild {
            registry,
            existing_only,
        } => commands::publish::run_rebuild(&registry, existing_only, verbose),
        Commands::List { registry } => commands::publish::run_list(&registry),
        Commands::Manifest {
            projects,
            output,
            duration,
        } => commands::manifest::run(
            commands::manifest::ManifestArgs {
                projects,
                output,
                duration,
            },
            verbose,
        ),
        Commands::Init => commands::init::run(),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
