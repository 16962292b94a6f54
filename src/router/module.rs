//! Handler modules
//!
//! A handler module groups related routes under a base path and registers
//! them with the router once, at startup.

use crate::router::{Method, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A group of routes registered together
pub trait HandlerModule: Send + Sync {
    /// Common path prefix of the module's routes (may be empty)
    fn base_path(&self) -> &str;

    /// Human-readable name, used by introspection and logging
    fn name(&self) -> &str;

    /// One-line description of the module's purpose
    fn description(&self) -> &str;

    /// Schemas of the module's endpoints
    fn endpoint_schemas(&self) -> Vec<EndpointSchema> {
        Vec::new()
    }

    /// Register the module's routes with `router`
    fn register_routes(self: Arc<Self>, router: &Arc<Router>);

    /// Release resources before the router stops
    fn shutdown(&self) {}
}

/// Introspection record of a registered module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Module name
    pub name: String,
    /// Module base path
    pub path: String,
    /// Module description
    pub description: String,
}

impl ModuleInfo {
    /// Describe a module
    pub fn of(module: &dyn HandlerModule) -> Self {
        Self {
            name: module.name().to_string(),
            path: module.base_path().to_string(),
            description: module.description().to_string(),
        }
    }
}

/// Description of a single endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSchema {
    /// Endpoint method
    pub method: Method,
    /// Endpoint path
    pub path: String,
    /// What the endpoint does
    pub summary: String,
    /// Accepted parameters (body fields or query keys)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSchema>,
}

impl EndpointSchema {
    /// Create an endpoint schema with no parameters
    pub fn new(method: Method, path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            summary: summary.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn param(
        mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParamSchema {
            name: name.into(),
            kind: kind.into(),
            required,
            description: description.into(),
        });
        self
    }
}

/// Description of an endpoint parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSchema {
    /// Parameter name
    pub name: String,
    /// Value type (`string`, `bool`, `object`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter description
    pub description: String,
}
