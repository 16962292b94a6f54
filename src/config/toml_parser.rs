//! TOML configuration file parser
//!
//! Every section and key is optional in the file; absent values fall back
//! to the same defaults as `Config::default()`.

use crate::config::{
    default_api_prefix, default_max_requests, default_name, default_stop_on_error, BatchConfig,
    Config, ServerConfig,
};
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// `[server]` section
    #[serde(default)]
    pub server: Option<TomlServerConfig>,

    /// `[batch]` section
    #[serde(default)]
    pub batch: Option<TomlBatchConfig>,
}

/// TOML `[server]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlServerConfig {
    /// Server name
    #[serde(default = "default_name")]
    pub name: String,

    /// Routing prefix
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

/// TOML `[batch]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlBatchConfig {
    /// Default stop-on-error policy
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,

    /// Step limit per batch
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                BridgeError::NotFound(format!("Config file {}", path.display()))
            }
            _ => BridgeError::Config(format!("Failed to read config file {:?}: {}", path, e)),
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml)
            .map_err(|e| BridgeError::Config(format!("Failed to parse TOML config: {}", e)))
    }
}

// Convert TOML config to internal Config
impl From<TomlConfig> for Config {
    fn from(toml: TomlConfig) -> Self {
        Config {
            server: toml.server.map(Into::into).unwrap_or_default(),
            batch: toml.batch.map(Into::into).unwrap_or_default(),
        }
    }
}

impl From<TomlServerConfig> for ServerConfig {
    fn from(toml: TomlServerConfig) -> Self {
        ServerConfig {
            name: toml.name,
            api_prefix: toml.api_prefix,
        }
    }
}

impl From<TomlBatchConfig> for BatchConfig {
    fn from(toml: TomlBatchConfig) -> Self {
        BatchConfig {
            stop_on_error: toml.stop_on_error,
            max_requests: toml.max_requests,
        }
    }
}
