//! # webexport CLI
//!
//! Command-line interface for exporting model trees as interactive web pages.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "webexport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "webexport.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new webexport project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Export the model to the output directory
    Export {
        /// Delete the output directory before writing
        #[arg(long)]
        force: bool,

        /// Open the exported index page in a browser
        #[arg(long)]
        open: bool,

        /// Common web export settings. Short for: --force --open, copying
        /// JavaScript and opening composites
        #[arg(long)]
        web: bool,
    },

    /// Print the assembled pages as JSON without writing files
    Inspect {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Export { force, open, web } => {
            commands::export_site(&cli.config, commands::ExportFlags { force, open, web })
        }
        Commands::Inspect { pretty } => commands::inspect_site(&cli.config, pretty),
    }
}
