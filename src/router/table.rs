//! Route table
//!
//! Maps a `(method, path)` pair to exactly one handler. Registering the same
//! pair again replaces the previous handler.

use crate::router::{Method, Request, Response};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

type HandlerFn = dyn Fn(&Request) -> Option<Response> + Send + Sync;

/// Composite route key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    /// Request method
    pub method: Method,
    /// Exact route path
    pub path: String,
}

impl RouteKey {
    /// Create a route key
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A route handler
///
/// Either owns a closure outright, or is bound weakly to a module instance
/// and becomes unbound once that instance is dropped.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Handler backed by a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(move |request: &Request| Some(f(request))),
        }
    }

    /// Handler calling `method` on `target` for as long as `target` lives
    pub fn bind<T>(target: &Arc<T>, method: fn(&T, &Request) -> Response) -> Self
    where
        T: Send + Sync + 'static,
    {
        let target: Weak<T> = Arc::downgrade(target);
        Self {
            inner: Arc::new(move |request: &Request| {
                target.upgrade().map(|target| method(&target, request))
            }),
        }
    }

    /// Invoke the handler; `None` when it is no longer bound
    pub fn invoke(&self, request: &Request) -> Option<Response> {
        (self.inner)(request)
    }

    /// Whether both values refer to the same registered handler
    pub fn same_as(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// Registry of routes
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: HashMap<RouteKey, Handler>,
}

impl RouteTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler` under `(method, path)`, returning any handler it replaced
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Handler,
    ) -> Option<Handler> {
        self.routes.insert(RouteKey::new(method, path), handler)
    }

    /// Look up the handler for an exact `(method, path)`
    pub fn lookup(&self, method: Method, path: &str) -> Option<&Handler> {
        self.routes.get(&RouteKey::new(method, path))
    }

    /// Whether any handler is registered for the pair
    pub fn contains(&self, method: Method, path: &str) -> bool {
        self.lookup(method, path).is_some()
    }

    /// Registered keys, sorted by path then method
    pub fn keys(&self) -> Vec<RouteKey> {
        let mut keys: Vec<RouteKey> = self.routes.keys().cloned().collect();
        keys.sort_by(|a, b| a.path.cmp(&b.path).then(a.method.cmp(&b.method)));
        keys
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Remove every route
    pub fn clear(&mut self) {
        self.routes.clear();
    }
}
