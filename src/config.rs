use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use log::info;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "tormeta.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub peer_id_prefix: String,
    pub listen_port: u16,
    pub request_timeout: u64, // seconds
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peer_id_prefix: "-TM0001-".to_string(),
            listen_port: 6881,
            request_timeout: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Reads the config at `path`, or writes the defaults there if it does not exist yet.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref();
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Self::default();
            // Save default config
            let toml = toml::to_string(&config)?;
            fs::write(config_path, toml)?;
            info!("wrote default config to {}", config_path.display());
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tormeta.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // the written file reads back to the same values
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tormeta.toml");
        fs::write(&path, "listen_port = 7000\npeer_id_prefix = \"-XX0001-\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.listen_port, 7000);
        assert_eq!(config.peer_id_prefix, "-XX0001-");
        assert_eq!(config.request_timeout, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tormeta.toml");
        fs::write(&path, "listen_port = \"not a port\"").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
