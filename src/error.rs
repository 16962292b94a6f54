//! Error types for harmony-bridge
//!
//! This module defines the error types used outside the request path.
//! Handler failures never surface here: they are encoded as error
//! Responses. We use `thiserror` for ergonomic error definitions and
//! `anyhow` for error propagation in the binary.

use thiserror::Error;

/// Main error type for harmony-bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unrecognized request method
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}
