//! Configuration validator
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{CacheConfig, Config, ConfigError, LoggingConfig, PollingConfig, TargetConfig};

/// Largest watch window the polling loop will read
pub const MAX_WATCH_SIZE: usize = 4096;

/// Slowest accepted polling interval
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_target(&config.target)?;
        Self::validate_cache(&config.cache)?;
        Self::validate_polling(&config.polling)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    fn validate_target(target: &TargetConfig) -> Result<(), ConfigError> {
        if target.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Target name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_cache(cache: &CacheConfig) -> Result<(), ConfigError> {
        if !cache.fallback_enabled {
            tracing::warn!("read fallback disabled; transient zeroed reads will reach the host");
        }
        Ok(())
    }

    /// Validates polling configuration
    fn validate_polling(polling: &PollingConfig) -> Result<(), ConfigError> {
        if polling.interval_ms == 0 || polling.interval_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "Polling interval must be between 1 and {} ms",
                MAX_INTERVAL_MS
            )));
        }

        if polling.watch_size == 0 || polling.watch_size > MAX_WATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "Watch size must be between 1 and {} bytes",
                MAX_WATCH_SIZE
            )));
        }

        let start = polling.watch_address()?;
        if start.as_u64() + polling.watch_size as u64 > 1u64 << 32 {
            return Err(ConfigError::Invalid(
                "Watch window runs past the end of the 32-bit address space".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        if logging.file.is_empty() {
            return Err(ConfigError::Invalid(
                "Log file path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_target_name() {
        let mut config = Config::default();
        config.target.name = "  ".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("Target name"));
    }

    #[test]
    fn test_invalid_interval() {
        let mut config = Config::default();
        config.polling.interval_ms = 0;
        assert!(validate_config(&config).is_err());

        config.polling.interval_ms = MAX_INTERVAL_MS + 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_watch_size() {
        let mut config = Config::default();
        config.polling.watch_size = 0;
        assert!(validate_config(&config).is_err());

        config.polling.watch_size = MAX_WATCH_SIZE + 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_watch_window_past_end() {
        let mut config = Config::default();
        config.polling.watch_address = "0xFFFFFFF8".to_string();
        config.polling.watch_size = 16;
        assert!(validate_config(&config).is_err());

        config.polling.watch_size = 8;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unparsable_watch_address() {
        let mut config = Config::default();
        config.polling.watch_address = "0xGG".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("log level"));
    }

    #[test]
    fn test_edge_cases() {
        let mut config = Config::default();
        config.polling.interval_ms = 1;
        config.polling.watch_size = 1;
        config.cache.fallback_enabled = false;
        assert!(validate_config(&config).is_ok());

        config.polling.interval_ms = MAX_INTERVAL_MS;
        config.polling.watch_size = MAX_WATCH_SIZE;
        assert!(validate_config(&config).is_ok());
    }
}
