//! Process-wide harvest configuration.
//!
//! Read once at startup from `~/.config/dexgrab/config.toml` (or a path
//! given on the command line). Every field has a default, so a partial file
//! only needs the values it changes, and no file at all means the built-in
//! data set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dexgrab_core::{Entity, default_entities};
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Base directory; each entity gets a subdirectory.
    pub output_dir: PathBuf,
    /// Pause after finishing all sources for one entity.
    pub entity_delay_ms: u64,
    pub http: HttpConfig,
    pub bulbapedia: BulbapediaConfig,
    pub zerochan: ZerochanConfig,
    pub danbooru: DanbooruConfig,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Connect timeout, and total deadline for HTML and JSON pages.
    pub timeout_secs: u64,
    /// Total deadline for a single image download.
    pub download_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulbapediaConfig {
    pub base_url: String,
    /// Host that serves full-resolution files; other hosts are ignored.
    pub media_host: String,
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZerochanConfig {
    pub base_url: String,
    /// Substring identifying full-resolution image links.
    pub static_host: String,
    pub request_delay_ms: u64,
    pub max_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DanbooruConfig {
    pub api_url: String,
    pub safety_filter: String,
    /// Target number of post records per entity.
    pub max_images_per_entity: usize,
    pub request_delay_ms: u64,
    /// Consecutive failed attempts on one page before giving up.
    pub max_attempts: u32,
    /// Extra wait after an HTTP 429.
    pub rate_limit_pause_ms: u64,
    /// Extra wait after a connection or timeout error.
    pub network_error_pause_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("pokemon_pics").join("web_scrape"),
            entity_delay_ms: 4000,
            http: HttpConfig::default(),
            bulbapedia: BulbapediaConfig::default(),
            zerochan: ZerochanConfig::default(),
            danbooru: DanbooruConfig::default(),
            entities: default_entities(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("dexgrab/{} (image dataset collector)", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            download_timeout_secs: 300,
        }
    }
}

impl Default for BulbapediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bulbapedia.bulbagarden.net".to_string(),
            media_host: "archives.bulbagarden.net".to_string(),
            request_delay_ms: 2000,
        }
    }
}

impl Default for ZerochanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.zerochan.net".to_string(),
            static_host: "static.zerochan.net".to_string(),
            request_delay_ms: 2000,
            max_pages: 5,
        }
    }
}

impl Default for DanbooruConfig {
    fn default() -> Self {
        Self {
            api_url: "https://danbooru.donmai.us/posts.json".to_string(),
            safety_filter: "-rating:explicit -rating:questionable rating:safe".to_string(),
            max_images_per_entity: 500,
            request_delay_ms: 1100,
            max_attempts: 5,
            rate_limit_pause_ms: 10_000,
            network_error_pause_ms: 5000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl BulbapediaConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl ZerochanConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DanbooruConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn rate_limit_pause(&self) -> Duration {
        Duration::from_millis(self.rate_limit_pause_ms)
    }

    pub fn network_error_pause(&self) -> Duration {
        Duration::from_millis(self.network_error_pause_ms)
    }
}

impl HarvestConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default config file
    /// is used if present and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ScrapeError> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match config_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => {
                    log::debug!("No config file found, using built-in defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ScrapeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
            .map_err(|e| ScrapeError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScrapeError> {
        toml::from_str(content).map_err(|e| ScrapeError::config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ScrapeError> {
        toml::to_string_pretty(self)
            .map_err(|e| ScrapeError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Write the configuration, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ScrapeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        if let Some(entity) = self.entities.iter().find(|e| e.name.trim().is_empty()) {
            return Err(ScrapeError::config(format!(
                "Entity with empty name (overrides: {:?})",
                entity.overrides
            )));
        }
        if self.danbooru.max_attempts == 0 {
            return Err(ScrapeError::config("danbooru.max_attempts must be at least 1"));
        }
        for (key, url) in [
            ("bulbapedia.base_url", &self.bulbapedia.base_url),
            ("zerochan.base_url", &self.zerochan.base_url),
            ("danbooru.api_url", &self.danbooru.api_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| ScrapeError::config(format!("{key} '{url}' is not a URL: {e}")))?;
        }
        Ok(())
    }

    pub fn entity_delay(&self) -> Duration {
        Duration::from_millis(self.entity_delay_ms)
    }
}

/// Default configuration file location.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dexgrab").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexgrab_core::Source;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = HarvestConfig::from_toml_str(
            r#"
            output_dir = "/data/pics"

            [danbooru]
            max_images_per_entity = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/data/pics"));
        assert_eq!(config.danbooru.max_images_per_entity, 40);
        assert_eq!(config.danbooru.max_attempts, 5);
        assert_eq!(config.bulbapedia.media_host, "archives.bulbagarden.net");
        assert_eq!(config.entities.len(), 6);
    }

    #[test]
    fn entities_with_overrides_parse() {
        let config = HarvestConfig::from_toml_str(
            r#"
            [[entities]]
            name = "rotom-frost"

            [entities.overrides]
            bulbapedia = "Rotom"
            danbooru = "rotom_(frost)"
            "#,
        )
        .unwrap();
        assert_eq!(config.entities.len(), 1);
        let entity = &config.entities[0];
        assert_eq!(entity.override_for(Source::Bulbapedia), Some("Rotom"));
        assert_eq!(entity.override_for(Source::Zerochan), None);
    }

    #[test]
    fn saved_defaults_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        HarvestConfig::default().save_to(&path).unwrap();

        let loaded = HarvestConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.entities, default_entities());
        assert_eq!(loaded.danbooru.safety_filter, DanbooruConfig::default().safety_filter);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HarvestConfig::load(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = HarvestConfig::default();
        config.danbooru.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_entity_name_rejected() {
        let mut config = HarvestConfig::default();
        config.entities.push(Entity::new("  "));
        assert!(config.validate().is_err());
    }
}
