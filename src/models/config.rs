//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::BUILTIN_SOURCES;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and adapter behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Where the feed and history documents live
    #[serde(default)]
    pub paths: PathsConfig,

    /// Merge behavior
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Adapter ids to run, in order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.paths.events_file.trim().is_empty() {
            return Err(AppError::validation("paths.events_file is empty"));
        }
        if self.paths.history_file.trim().is_empty() {
            return Err(AppError::validation("paths.history_file is empty"));
        }
        if self.paths.events_file == self.paths.history_file {
            return Err(AppError::validation(
                "paths.events_file and paths.history_file must differ",
            ));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources configured"));
        }

        let mut seen = HashSet::new();
        for id in &self.sources {
            if !BUILTIN_SOURCES.contains(&id.as_str()) {
                return Err(AppError::validation(format!("Unknown source id: {id}")));
            }
            if !seen.insert(id.as_str()) {
                return Err(AppError::validation(format!("Duplicate source id: {id}")));
            }
        }
        Ok(())
    }

    /// Path of the live feed document.
    pub fn events_path(&self) -> PathBuf {
        Path::new(&self.paths.output_dir).join(&self.paths.events_file)
    }

    /// Path of the history document.
    pub fn history_path(&self) -> PathBuf {
        Path::new(&self.paths.output_dir).join(&self.paths.history_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            paths: PathsConfig::default(),
            reconcile: ReconcileConfig::default(),
            logging: LoggingConfig::default(),
            sources: defaults::sources(),
        }
    }
}

/// HTTP client and adapter behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// How long a listing shared by several adapters stays fresh
    #[serde(default = "defaults::listing_cache_ttl")]
    pub listing_cache_ttl_secs: u64,

    /// Directory for locally cached poster images
    #[serde(default = "defaults::image_dir")]
    pub image_dir: String,

    /// Public path prefix under which cached images are served
    #[serde(default = "defaults::image_url_prefix")]
    pub image_url_prefix: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            listing_cache_ttl_secs: defaults::listing_cache_ttl(),
            image_dir: defaults::image_dir(),
            image_url_prefix: defaults::image_url_prefix(),
        }
    }
}

/// Output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    #[serde(default = "defaults::events_file")]
    pub events_file: String,

    #[serde(default = "defaults::history_file")]
    pub history_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            events_file: defaults::events_file(),
            history_file: defaults::history_file(),
        }
    }
}

/// Merge settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Also count lineup and age-restriction edits as changes
    #[serde(default)]
    pub compare_lineup: bool,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use crate::services::BUILTIN_SOURCES;

    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn listing_cache_ttl() -> u64 {
        60
    }
    pub fn image_dir() -> String {
        "public/images/astro".into()
    }
    pub fn image_url_prefix() -> String {
        "/images/astro".into()
    }

    pub fn output_dir() -> String {
        "output".into()
    }
    pub fn events_file() -> String {
        "events.json".into()
    }
    pub fn history_file() -> String {
        "history.json".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn sources() -> Vec<String> {
        BUILTIN_SOURCES.iter().map(|id| id.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.scraper.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.scraper.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_and_duplicate_sources() {
        let mut config = Config::default();
        config.sources = vec!["nowhere".into()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("nowhere")));

        config.sources = vec!["admiral".into(), "admiral".into()];
        assert!(config.validate().is_err());

        config.sources = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            sources = ["theslowdown", "admiral"]

            [paths]
            output_dir = "public"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources, vec!["theslowdown", "admiral"]);
        assert_eq!(config.scraper.timeout_secs, 30);
        assert_eq!(config.events_path(), Path::new("public").join("events.json"));
        assert!(!config.reconcile.compare_lineup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = Config::load_or_default("/definitely/not/here.toml");
        assert_eq!(config.sources.len(), BUILTIN_SOURCES.len());
    }
}
