//! Request routing
//!
//! This module provides the route table, the dispatcher that turns inbound
//! requests into handler calls, and the handler module interface used to
//! register groups of routes at startup.

mod api;
mod dispatcher;
mod module;
mod table;

pub use api::{Method, Request, Response, BAD_REQUEST, NOT_FOUND, SERVER_ERROR};
pub use dispatcher::{normalize_path, parse_body, parse_query, RawRequest, RawResponse};
pub use module::{EndpointSchema, HandlerModule, ModuleInfo, ParamSchema};
pub use table::{Handler, RouteKey, RouteTable};

use crate::config::{ServerConfig, DEFAULT_API_PREFIX};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Route table plus the modules that populated it
///
/// Constructed once by the composition root and shared as `Arc<Router>`.
/// Registration takes the write lock; dispatch only ever reads.
pub struct Router {
    /// Prefix stripped from inbound paths
    api_prefix: String,
    /// Registered routes
    routes: RwLock<RouteTable>,
    /// Registered modules, in registration order
    modules: RwLock<Vec<Arc<dyn HandlerModule>>>,
}

impl Router {
    /// Create a router using the default `/api/v1` prefix
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_API_PREFIX)
    }

    /// Create a router stripping `api_prefix` from inbound paths
    pub fn with_prefix(api_prefix: impl Into<String>) -> Self {
        Self {
            api_prefix: api_prefix.into(),
            routes: RwLock::new(RouteTable::new()),
            modules: RwLock::new(Vec::new()),
        }
    }

    /// Create a router from server configuration
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::with_prefix(config.api_prefix.clone())
    }

    /// The routing prefix
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// Register a route; an existing handler for the pair is replaced
    pub fn register_route(&self, method: Method, path: &str, handler: Handler) {
        if self.write_routes().register(method, path, handler).is_some() {
            warn!("Route {} {} re-registered, previous handler replaced", method, path);
        } else {
            debug!("Registered route {} {}", method, path);
        }
    }

    /// Register a closure as the handler for `(method, path)`
    pub fn route<F>(&self, method: Method, path: &str, f: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.register_route(method, path, Handler::new(f));
    }

    /// Look up the handler for an exact `(method, path)`
    pub fn lookup(&self, method: Method, path: &str) -> Option<Handler> {
        self.read_routes().lookup(method, path).cloned()
    }

    /// Register a module and let it add its routes
    pub fn register_module(self: &Arc<Self>, module: Arc<dyn HandlerModule>) {
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(module.clone());

        info!(
            "Registered handler module '{}' at '{}'",
            module.name(),
            module.base_path()
        );
        module.register_routes(self);
    }

    /// Registered route keys, sorted by path then method
    pub fn routes(&self) -> Vec<RouteKey> {
        self.read_routes().keys()
    }

    /// Descriptors of registered modules, in registration order
    pub fn modules(&self) -> Vec<ModuleInfo> {
        self.handler_modules()
            .iter()
            .map(|module| ModuleInfo::of(module.as_ref()))
            .collect()
    }

    /// Registered modules, in registration order
    pub fn handler_modules(&self) -> Vec<Arc<dyn HandlerModule>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Shut down every module, then drop all routes and modules
    pub fn shutdown(&self) {
        let modules: Vec<Arc<dyn HandlerModule>> = self
            .modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for module in &modules {
            debug!("Shutting down handler module '{}'", module.name());
            module.shutdown();
        }

        self.write_routes().clear();
        info!("Router stopped ({} module(s) shut down)", modules.len());
    }

    fn read_routes(&self) -> RwLockReadGuard<'_, RouteTable> {
        self.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_routes(&self) -> RwLockWriteGuard<'_, RouteTable> {
        self.routes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("api_prefix", &self.api_prefix)
            .field("routes", &self.read_routes().len())
            .finish_non_exhaustive()
    }
}
