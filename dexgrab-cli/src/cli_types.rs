//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dexgrab_core::Source;

#[derive(Parser)]
#[command(name = "dexgrab")]
#[command(about = "Collect Pokémon images from the web into per-entity folders", long_about = None)]
pub(crate) struct Cli {
    /// Configuration file (defaults to ~/.config/dexgrab/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides applied on top of the configuration file for one run.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct RunArgs {
    /// Sources to run, by name or alias (e.g., wiki,gallery,booru)
    #[arg(short, long, value_delimiter = ',')]
    pub sources: Option<Vec<Source>>,

    /// Only process these entities (e.g., clodsire,rotom-frost)
    #[arg(short, long, value_delimiter = ',')]
    pub entities: Option<Vec<String>>,

    /// Base output directory (one subdirectory per entity)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of posts to fetch per entity from the tag search
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Download images for every configured entity
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// List configured entities and the search terms derived for each source
    Entities,

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the default config file path
    Path,

    /// Write the built-in defaults to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
