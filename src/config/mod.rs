//! Configuration management
//!
//! This module handles parsing and validation of the bridge configuration
//! from static TOML files.

mod toml_parser;
mod validation;

pub use toml_parser::TomlConfig;

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default routing prefix stripped from inbound paths
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server identity and routing prefix
    #[serde(default)]
    pub server: ServerConfig,

    /// Batch endpoint behaviour
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Server identity and routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported by the health endpoint
    #[serde(default = "default_name")]
    pub name: String,

    /// Prefix stripped from inbound paths before route lookup
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

/// Batch endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Default for `options.stop_on_error` when a batch omits it
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,

    /// Maximum number of steps accepted in one batch
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
}

impl Config {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self {
            server: ServerConfig::default(),
            batch: BatchConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let toml_config = TomlConfig::from_file(path)?;
        let config: Config = toml_config.into();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse(toml: &str) -> Result<Self> {
        let config: Config = TomlConfig::parse(toml)?.into();
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.server
            .validate()
            .map_err(|e| BridgeError::Config(format!("[server]: {}", e)))?;
        self.batch
            .validate()
            .map_err(|e| BridgeError::Config(format!("[batch]: {}", e)))?;
        Ok(())
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_server_name(&self.name)?;
        validation::validate_api_prefix(&self.api_prefix)?;
        Ok(())
    }
}

impl BatchConfig {
    /// Validate batch configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_max_requests(self.max_requests)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            api_prefix: default_api_prefix(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stop_on_error: default_stop_on_error(),
            max_requests: default_max_requests(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_name() -> String {
    crate::APP_NAME.to_string()
}

pub(crate) fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

pub(crate) fn default_stop_on_error() -> bool {
    true
}

pub(crate) fn default_max_requests() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.api_prefix, "/api/v1");
        assert_eq!(config.server.name, "harmony-bridge");
        assert!(config.batch.stop_on_error);
        assert_eq!(config.batch.max_requests, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial() {
        let config = Config::parse(
            r#"
[batch]
stop_on_error = false
"#,
        )
        .unwrap();

        assert!(!config.batch.stop_on_error);
        assert_eq!(config.batch.max_requests, 256);
        assert_eq!(config.server.api_prefix, "/api/v1");
    }

    #[test]
    fn test_parse_rejects_invalid_prefix() {
        let result = Config::parse(
            r#"
[server]
api_prefix = "api/v1/"
"#,
        );
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
name = "editor-bridge"
api_prefix = "/bridge"

[batch]
max_requests = 8
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.name, "editor-bridge");
        assert_eq!(config.server.api_prefix, "/bridge");
        assert_eq!(config.batch.max_requests, 8);
        assert!(config.batch.stop_on_error);
    }

    #[test]
    fn test_from_missing_file() {
        let result = Config::from_file("/nonexistent/bridge.toml");
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }
}
