pub(crate) mod config;
pub(crate) mod entities;
pub(crate) mod run;

use std::path::Path;

use dexgrab_scraper::HarvestConfig;

use crate::error::CliError;

/// Load the configuration selected by `--config`, or the default one.
pub(crate) fn load_config(path: Option<&Path>) -> Result<HarvestConfig, CliError> {
    Ok(HarvestConfig::load(path)?)
}
