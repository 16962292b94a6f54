//! Configuration validation functions

use crate::error::{BridgeError, Result};

/// Largest batch the configuration may allow
pub const MAX_BATCH_LIMIT: usize = 10_000;

/// Validate the server name (non-empty, printable)
pub fn validate_server_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BridgeError::Validation("Server name cannot be empty".to_string()));
    }

    if name.chars().any(char::is_control) {
        return Err(BridgeError::Validation(format!(
            "Server name '{}' contains control characters",
            name.escape_debug()
        )));
    }

    Ok(())
}

/// Validate routing prefix (`/segment[/segment...]`, max 64 chars)
pub fn validate_api_prefix(prefix: &str) -> Result<()> {
    if !prefix.starts_with('/') {
        return Err(BridgeError::Validation(format!(
            "API prefix '{}' must start with '/'",
            prefix
        )));
    }

    if prefix.len() > 1 && prefix.ends_with('/') {
        return Err(BridgeError::Validation(format!(
            "API prefix '{}' must not end with '/'",
            prefix
        )));
    }

    if prefix.len() > 64 {
        return Err(BridgeError::Validation(format!(
            "API prefix '{}' exceeds maximum length of 64 characters",
            prefix
        )));
    }

    if prefix.chars().any(char::is_whitespace) {
        return Err(BridgeError::Validation(format!(
            "API prefix '{}' contains whitespace",
            prefix
        )));
    }

    Ok(())
}

/// Validate the batch step limit (1-10000)
pub fn validate_max_requests(max: usize) -> Result<()> {
    if !(1..=MAX_BATCH_LIMIT).contains(&max) {
        return Err(BridgeError::Validation(format!(
            "max_requests value {} is out of valid range (1-{})",
            max, MAX_BATCH_LIMIT
        )));
    }
    Ok(())
}
