//! harmony-bridge: in-process request routing and batch execution
//!
//! This library maps `(method, path)` pairs to handler functions, dispatches
//! inbound requests to them, and runs batches of sub-requests in which later
//! steps can reference values from earlier responses.
//!
//! # Architecture
//!
//! A single [`Router`] is built at startup and shared as `Arc<Router>`. Handler
//! modules register their routes against it once; afterwards every request is
//! dispatched through the same table. The transport that delivers requests is
//! outside this crate: callers hand the router a [`router::RawRequest`] and
//! get back a status code and a JSON body.
//!
//! # Modules
//!
//! - `router`: Route table, dispatcher and handler module interface
//! - `batch`: Batch execution and `$N.path` reference substitution
//! - `body`: Structured request bodies and path resolution
//! - `handlers`: Built-in health, discovery and batch endpoints
//! - `config`: Configuration parsing and validation
//! - `error`: Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod body;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;

// Re-export commonly used types
pub use error::{BridgeError, Result};
pub use router::{Handler, HandlerModule, Method, Request, Response, Router};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
