//! dexgrab CLI
//!
//! Command-line interface for collecting Pokémon images from an encyclopedia
//! wiki, an image gallery and a tag-search image board.

mod cli_types;
mod commands;
mod error;
mod logging;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cli_types::{Cli, Commands, ConfigAction};
use commands::config::{run_config_init, run_config_path, run_config_show};
use commands::entities::run_entities;
use commands::run::run_harvest;
use error::CliError;

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose, cli.quiet);

    let config_path = cli.config.as_deref();
    let result: Result<(), CliError> = match cli.command {
        Commands::Run { args } => run_harvest(config_path, &args, cli.quiet),
        Commands::Entities => run_entities(config_path),
        Commands::Config { action } => match action {
            ConfigAction::Show => run_config_show(config_path),
            ConfigAction::Path => run_config_path(),
            ConfigAction::Init { force } => run_config_init(config_path, force),
        },
    };

    if let Err(e) = result {
        log::error!("{} {}", "\u{2718}".if_supports_color(Stdout, |t| t.red()), e);
        std::process::exit(1);
    }
}
