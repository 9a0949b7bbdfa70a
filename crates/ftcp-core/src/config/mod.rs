//! Configuration management for FTCP.
//!
//! This module handles loading and saving the FTCP configuration file.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/ftcp/config.toml` |
//! | macOS | `~/Library/Application Support/ftcp/config.toml` |
//! | Windows | `%APPDATA%\ftcp\config.toml` |
//!
//! Every section and field has a default, so a partial (or absent) file is
//! fine. Command-line flags override whatever the file says.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for FTCP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub network: NetworkConfig,
    /// Transfer settings
    pub transfer: TransferConfig,
    /// Receiver settings
    pub receive: ReceiveConfig,
}

/// Network configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// TCP port for transfers
    pub port: u16,
    /// Connection attempts before the sender gives up
    pub connect_attempts: u32,
    /// Socket timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            connect_attempts: crate::DEFAULT_CONNECT_ATTEMPTS,
            timeout_secs: crate::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Transfer configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Chunk size in bytes
    pub chunk_size: u32,
    /// Attempts per chunk before the transfer aborts
    pub max_retries: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
            max_retries: crate::MAX_CHUNK_RETRIES,
        }
    }
}

/// Receiver configuration options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiveConfig {
    /// Default output directory for received files
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read config: {e}")))?;

        toml::from_str(&content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("failed to create config directory: {e}")))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

        std::fs::write(&path, content)
            .map_err(|e| Error::Config(format!("failed to write config: {e}")))
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "ftcp", "ftcp")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_constants() {
        let config = Config::default();
        assert_eq!(config.network.port, 8080);
        assert_eq!(config.network.timeout_secs, 60);
        assert_eq!(config.transfer.chunk_size, 524_288);
        assert_eq!(config.transfer.max_retries, 3);
        assert!(config.receive.output_dir.is_none());
    }

    #[test]
    fn toml_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).expect("serialize");
        let parsed: Config = toml::from_str(&serialized).expect("parse");
        assert_eq!(parsed.network.port, config.network.port);
        assert_eq!(parsed.transfer.chunk_size, config.transfer.chunk_size);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str("[network]\nport = 9000\n").expect("parse");
        assert_eq!(parsed.network.port, 9000);
        assert_eq!(parsed.network.timeout_secs, 60);
        assert_eq!(parsed.transfer.chunk_size, 524_288);
    }

    #[test]
    fn config_path_ends_with_toml() {
        assert!(Config::config_path().to_string_lossy().ends_with("config.toml"));
    }
}
