//! Request and response envelope types
//!
//! This module defines the normalized request passed to every route handler
//! and the response envelope handlers return.

use crate::body::FieldError;
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Error code for malformed or missing input
pub const BAD_REQUEST: &str = "BAD_REQUEST";

/// Error code for an unknown route or entity
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Error code for an internal invariant violation
pub const SERVER_ERROR: &str = "SERVER_ERROR";

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// All supported methods
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

    /// Parse a method name (case-insensitive)
    pub fn parse(value: &str) -> Result<Self, BridgeError> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(BridgeError::InvalidMethod(value.to_string())),
        }
    }

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Normalized request handed to route handlers
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request method
    pub method: Method,

    /// Route path, always starting with "/"
    pub path: String,

    /// Query parameters (last occurrence of a key wins)
    pub query: HashMap<String, String>,

    /// Parsed body, absent when missing or unparseable
    pub body: Option<Value>,
}

impl Request {
    /// Create a request with no query and no body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: ensure_leading_slash(path.into()),
            query: HashMap::new(),
            body: None,
        }
    }

    /// Attach a body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Look up a query parameter
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

pub(crate) fn ensure_leading_slash(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

/// Response envelope returned by route handlers
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP-style status code
    pub status: u16,

    /// Response body; serialized as `{}` when absent
    pub body: Option<Value>,
}

impl Response {
    /// Create a response with an explicit status
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// 200 with a body
    pub fn ok(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    /// Failure envelope `{success: false, error, message}`
    pub fn error(status: u16, code: &str, message: impl Into<String>) -> Self {
        Self::new(
            status,
            Some(json!({
                "success": false,
                "error": code,
                "message": message.into(),
            })),
        )
    }

    /// 400 BAD_REQUEST
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(400, BAD_REQUEST, message)
    }

    /// 404 NOT_FOUND
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(404, NOT_FOUND, message)
    }

    /// 500 SERVER_ERROR
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::error(500, SERVER_ERROR, message)
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `error` code of a failure envelope, if any
    pub fn error_code(&self) -> Option<&str> {
        self.body.as_ref()?.get("error")?.as_str()
    }

    /// Serialize the body for the transport layer
    pub fn to_json(&self) -> String {
        match &self.body {
            Some(body) => body.to_string(),
            None => "{}".to_string(),
        }
    }
}

impl From<FieldError> for Response {
    fn from(err: FieldError) -> Self {
        Response::bad_request(err.to_string())
    }
}
