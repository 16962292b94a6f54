//! Request dispatch
//!
//! Turns a raw transport request into a [`Request`], looks up its route and
//! invokes the handler. The dispatcher never validates bodies itself: a body
//! that fails to parse is simply absent, and the handler reports whatever
//! field it was missing.

use crate::router::api::ensure_leading_slash;
use crate::router::{Method, Request, Response, Router};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Request as received from the transport layer
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    /// Request method
    pub method: Method,
    /// Request path, possibly carrying the routing prefix
    pub path: String,
    /// Query parameters in arrival order
    pub query: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl RawRequest {
    /// Create a raw request for `target`, which may carry a `?query` suffix
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, Vec::new()),
        };

        Self {
            method,
            path: path.to_string(),
            query,
            body: Vec::new(),
        }
    }

    /// Attach raw body bytes
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Response handed back to the transport layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP-style status code
    pub status: u16,
    /// Serialized JSON body (`{}` when the handler returned none)
    pub body: String,
}

/// Strip `prefix` from `path` and guarantee a leading "/".
///
/// The prefix only matches on a segment boundary, so `/api/v1x` is left
/// alone when the prefix is `/api/v1`.
pub fn normalize_path(path: &str, prefix: &str) -> String {
    let stripped = match path.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => path,
    };

    ensure_leading_slash(stripped.to_string())
}

/// Split a query string into decoded `(key, value)` pairs
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Parse a body; empty or malformed input yields `None`
pub fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Ignoring unparseable request body: {}", e);
            None
        }
    }
}

impl Router {
    /// Dispatch a request arriving from the transport layer
    pub fn dispatch(&self, raw: RawRequest) -> RawResponse {
        let RawRequest {
            method,
            path,
            query,
            body,
        } = raw;

        // Later duplicates overwrite earlier ones.
        let query: HashMap<String, String> = query.into_iter().collect();

        let request = Request {
            method,
            path: normalize_path(&path, self.api_prefix()),
            query,
            body: parse_body(&body),
        };

        let response = self.execute(&request);
        RawResponse {
            status: response.status,
            body: response.to_json(),
        }
    }

    /// Dispatch an in-process request, without a transport round-trip
    ///
    /// The path is normalized exactly as [`Router::dispatch`] would.
    pub fn dispatch_internal(&self, request: &Request) -> Response {
        let normalized = normalize_path(&request.path, self.api_prefix());
        if normalized == request.path {
            return self.execute(request);
        }

        let request = Request {
            path: normalized,
            ..request.clone()
        };
        self.execute(&request)
    }

    fn execute(&self, request: &Request) -> Response {
        debug!("Dispatching {} {}", request.method, request.path);

        // The handler is cloned out so the table lock is released before it
        // runs; batch handlers re-enter the router.
        let Some(handler) = self.lookup(request.method, &request.path) else {
            debug!("No route for {} {}", request.method, request.path);
            return Response::not_found(format!(
                "Route not found: {} {}",
                request.method, request.path
            ));
        };

        match handler.invoke(request) {
            Some(response) => {
                debug!(
                    "{} {} -> {}",
                    request.method, request.path, response.status
                );
                response
            }
            None => {
                warn!(
                    "Route {} {} has no bound handler",
                    request.method, request.path
                );
                Response::server_error("Route handler not bound")
            }
        }
    }
}
