use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use dexgrab_scraper::HarvestConfig;

use super::load_config;
use crate::error::CliError;

/// Show the config file status and the effective configuration as TOML.
pub(crate) fn run_config_show(path: Option<&Path>) -> Result<(), CliError> {
    log::info!(
        "{}",
        "dexgrab Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    let file = path
        .map(Path::to_path_buf)
        .or_else(dexgrab_scraper::config_path);
    match &file {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    log::info!("");

    let config = load_config(path)?;
    for line in config.to_toml_string()?.lines() {
        log::info!("  {}", line);
    }
    Ok(())
}

/// Print the default config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    match dexgrab_scraper::config_path() {
        Some(p) => {
            log::info!("{}", p.display());
            Ok(())
        }
        None => Err(CliError::config("could not determine config directory")),
    }
}

/// Write the built-in defaults to `path` (or the default location).
pub(crate) fn run_config_init(path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => dexgrab_scraper::config_path()
            .ok_or_else(|| CliError::config("could not determine config directory"))?,
    };

    if target.exists() && !force {
        return Err(CliError::config(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    HarvestConfig::default().save_to(&target)?;
    log::info!(
        "{} Default configuration written to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        target.display(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "entity_delay_ms = 1\n").unwrap();

        let err = run_config_init(Some(path.as_path()), false).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "entity_delay_ms = 1\n");

        run_config_init(Some(path.as_path()), true).unwrap();
        let loaded = HarvestConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.entity_delay_ms, HarvestConfig::default().entity_delay_ms);
    }
}
