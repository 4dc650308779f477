//! Configuration file support for the simulator CLI

use serde::{Deserialize, Serialize};
use sr_protocol::ProtocolConfig;
use sr_sim::{NetworkConfig, NetworkError};
use std::fs;
use std::path::Path;

/// Combined configuration
///
/// ```toml
/// [protocol]
/// window_size = 6
/// max_seq = 16
/// timeout_ms = 16
///
/// [network]
/// messages = 1000
/// loss = 0.1
/// corrupt = 0.05
/// lambda = 10.0
/// reorder = true
/// seed = 1234
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window and timer parameters
    pub protocol: ProtocolConfig,
    /// Link and application parameters
    pub network: NetworkConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check both sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.protocol.validate()?;
        self.network.validate()?;
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid protocol configuration: {0}")]
    Protocol(#[from] sr_protocol::ConfigError),

    #[error("Invalid network configuration: {0}")]
    Network(#[from] NetworkError),
}
