use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::utils::paths::get_config_path;

/// Default port for the API server
pub const DEFAULT_API_PORT: u16 = 48661;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Foreground refresh cadence for `watch`, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Background status worker cadence, in seconds.
    #[serde(default = "default_worker_interval_secs")]
    pub worker_interval_secs: u64,

    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_worker_interval_secs() -> u64 {
    60
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            worker_interval_secs: default_worker_interval_secs(),
            api_port: default_api_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.worker_interval_secs, 60);
        assert_eq!(config.api_port, DEFAULT_API_PORT);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: Config = toml::from_str("poll_interval_secs = 5").unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.worker_interval_secs, 60);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut config = Config::default();
        config.api_port = 9999;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api_port, 9999);
    }
}
