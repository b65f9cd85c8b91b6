use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dexgrab_core::{bulbapedia_search_term, danbooru_tag, zerochan_search_term};
use dexgrab_scraper::entity_directory;

use super::load_config;
use crate::error::CliError;

/// List configured entities with the terms each source will search for.
pub(crate) fn run_entities(path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(path)?;

    log::info!("Configured entities:");
    log::info!("");
    for entity in &config.entities {
        let overridden = if entity.overrides.is_empty() {
            String::new()
        } else {
            format!(" {}", "(overrides)".if_supports_color(Stdout, |t| t.green()))
        };
        log::info!(
            "  {}{}",
            entity.name.if_supports_color(Stdout, |t| t.bold()),
            overridden,
        );
        log::info!("    Wiki article:  {}", bulbapedia_search_term(entity));
        log::info!("    Gallery term:  {}", zerochan_search_term(entity));
        log::info!("    Booru tag:     {}", danbooru_tag(entity));
        log::info!(
            "    Directory:     {}",
            entity_directory(&config.output_dir, entity)
                .display()
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
