//! Configuration loader
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use crate::core::types::RemoteAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_target")]
    pub target: TargetConfig,

    #[serde(default = "default_cache")]
    pub cache: CacheConfig,

    #[serde(default = "default_polling")]
    pub polling: PollingConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Target link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_target_name")]
    pub name: String,
    #[serde(default = "default_connect_on_open")]
    pub connect_on_open: bool,
}

/// Read cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,
}

/// Polling configuration for the watch loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_watch_address")]
    pub watch_address: String,
    #[serde(default = "default_watch_size")]
    pub watch_size: usize,
}

impl PollingConfig {
    /// Parsed watch address
    pub fn watch_address(&self) -> Result<RemoteAddress, ConfigError> {
        RemoteAddress::from_str(&self.watch_address)
            .map_err(|e| ConfigError::Invalid(format!("watch_address: {}", e)))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if file doesn't exist
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::new("config.toml").load_or_default()
}

// Default functions for serde
fn default_target() -> TargetConfig {
    let defaults = default_config();
    TargetConfig {
        name: defaults.target.name,
        connect_on_open: defaults.target.connect_on_open,
    }
}

fn default_cache() -> CacheConfig {
    CacheConfig {
        fallback_enabled: default_config().cache.fallback_enabled,
    }
}

fn default_polling() -> PollingConfig {
    let defaults = default_config();
    PollingConfig {
        interval_ms: defaults.polling.interval_ms,
        watch_address: defaults.polling.watch_address,
        watch_size: defaults.polling.watch_size,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        file: defaults.logging.file,
    }
}

// Individual field defaults
fn default_target_name() -> String {
    default_config().target.name
}

fn default_connect_on_open() -> bool {
    default_config().target.connect_on_open
}

fn default_fallback_enabled() -> bool {
    default_config().cache.fallback_enabled
}

fn default_interval_ms() -> u64 {
    default_config().polling.interval_ms
}

fn default_watch_address() -> String {
    default_config().polling.watch_address
}

fn default_watch_size() -> usize {
    default_config().polling.watch_size
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_log_file() -> String {
    default_config().logging.file
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target: default_target(),
            cache: default_cache(),
            polling: default_polling(),
            logging: default_logging(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.target.name, "PS3");
        assert!(config.cache.fallback_enabled);
        assert_eq!(
            config.polling.watch_address().unwrap(),
            RemoteAddress::new(0x3000_0000)
        );
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let result = loader.load();
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let config = loader.load_or_default().unwrap();
        assert_eq!(config.polling.interval_ms, 250);
    }

    #[test]
    fn test_load_or_default_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[polling\ninterval_ms = ").unwrap();

        let result = ConfigLoader::new(&config_path).load_or_default();
        assert!(matches!(result.unwrap_err(), ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.target.name = "devkit-01".to_string();
        let loader = ConfigLoader::new(&config_path);

        loader.save(&config).unwrap();
        assert!(config_path.exists());

        let loaded = loader.load().unwrap();
        assert_eq!(loaded.target.name, "devkit-01");
        assert_eq!(loaded.polling.watch_size, config.polling.watch_size);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [polling]
            watch_address = "$10010"
            interval_ms = 1000
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.polling.interval_ms, 1000);
        assert_eq!(
            config.polling.watch_address().unwrap(),
            RemoteAddress::new(0x10010)
        );
        // Check defaults are applied
        assert_eq!(config.polling.watch_size, 16);
        assert!(config.cache.fallback_enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_bad_watch_address() {
        let mut config = Config::default();
        config.polling.watch_address = "0xnothex".to_string();
        assert!(matches!(
            config.polling.watch_address(),
            Err(ConfigError::Invalid(_))
        ));
    }
}
