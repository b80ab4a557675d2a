//! Default configuration values

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub target: TargetDefaults,
    pub cache: CacheDefaults,
    pub polling: PollingDefaults,
    pub logging: LoggingDefaults,
}

/// Default target link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDefaults {
    pub name: String,
    pub connect_on_open: bool,
}

/// Default read cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheDefaults {
    pub fallback_enabled: bool,
}

/// Default polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingDefaults {
    pub interval_ms: u64,
    pub watch_address: String,
    pub watch_size: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub file: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        target: TargetDefaults {
            name: "PS3".to_string(),
            connect_on_open: false,
        },
        cache: CacheDefaults {
            fallback_enabled: true,
        },
        polling: PollingDefaults {
            interval_ms: 250,
            watch_address: "0x30000000".to_string(),
            watch_size: 16,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            file: "remote-memory-bridge.log".to_string(),
        },
    }
}
