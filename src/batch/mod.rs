//! Batch execution
//!
//! Runs an ordered list of sub-requests through the router in a single
//! call. Before each step runs, references like `$0.node.id` in its body are
//! replaced with values from earlier steps' responses.
//!
//! Steps run strictly one after another. With `stop_on_error` set, the
//! first failing step halts the batch; results produced so far are kept.

mod substitution;

pub use substitution::{substitute, substitute_str};

use crate::body::{kind_of, BodyExt, FieldError};
use crate::router::{Method, Request, Response, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Error text recorded for a step that is not a well-formed request object
pub const INVALID_STEP: &str = "Invalid request object";

/// Anything able to run a single in-process request
pub trait Dispatch {
    /// Run `request` to completion and return its response
    fn dispatch(&self, request: &Request) -> Response;
}

impl Dispatch for Router {
    fn dispatch(&self, request: &Request) -> Response {
        self.dispatch_internal(request)
    }
}

impl<F> Dispatch for F
where
    F: Fn(&Request) -> Response,
{
    fn dispatch(&self, request: &Request) -> Response {
        self(request)
    }
}

/// Batch options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Halt at the first failing step
    pub stop_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { stop_on_error: true }
    }
}

/// A parsed batch document
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    /// Raw step objects, validated one at a time while running
    pub requests: Vec<Value>,
    /// Execution options
    pub options: BatchOptions,
}

/// Failure to read a batch document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchRequestError {
    /// `requests` absent or not an array
    #[error("Missing required field: requests (array)")]
    MissingRequests,

    /// More steps than allowed
    #[error("Batch contains {count} requests, maximum is {max}")]
    TooManyRequests {
        /// Submitted steps
        count: usize,
        /// Configured limit
        max: usize,
    },

    /// Malformed `options`
    #[error(transparent)]
    Options(#[from] FieldError),
}

impl BatchRequest {
    /// Read a batch document; `defaults` applies where `options` is silent
    pub fn parse(
        body: &Option<Value>,
        defaults: BatchOptions,
        max_requests: usize,
    ) -> Result<Self, BatchRequestError> {
        let requests = body
            .get_array("requests")
            .map_err(|_| BatchRequestError::MissingRequests)?;

        if requests.len() > max_requests {
            return Err(BatchRequestError::TooManyRequests {
                count: requests.len(),
                max: max_requests,
            });
        }

        let options = match body.field("options") {
            None | Some(Value::Null) => defaults,
            Some(options @ Value::Object(_)) => BatchOptions {
                stop_on_error: options.optional_bool("stop_on_error", defaults.stop_on_error)?,
            },
            Some(other) => {
                return Err(FieldError::WrongType {
                    field: "options".to_string(),
                    expected: "an object",
                    found: kind_of(other),
                }
                .into())
            }
        };

        Ok(Self {
            requests: requests.clone(),
            options,
        })
    }
}

/// One well-formed step
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStep {
    /// Position in the batch
    pub index: usize,
    /// Request method
    pub method: Method,
    /// Path as submitted
    pub path: String,
    /// Body before reference substitution
    pub body: Option<Value>,
}

impl BatchStep {
    /// Validate a raw step object
    ///
    /// A step needs a string `path`, a string `method` naming a supported
    /// verb (any case), and, if present, an object or null `body`.
    pub fn parse(index: usize, raw: &Value) -> Result<Self, FieldError> {
        let method = raw.get_str("method")?;
        let method = Method::parse(method).map_err(|_| FieldError::WrongType {
            field: "method".to_string(),
            expected: "one of GET, POST, PUT, DELETE",
            found: "an unsupported method",
        })?;

        let path = match raw.get_str("path") {
            Ok(path) => path.to_string(),
            Err(FieldError::Empty { .. }) => String::new(),
            Err(e) => return Err(e),
        };

        let body = match raw.field("body") {
            None | Some(Value::Null) => None,
            Some(body @ Value::Object(_)) => Some(body.clone()),
            Some(other) => {
                return Err(FieldError::WrongType {
                    field: "body".to_string(),
                    expected: "an object",
                    found: kind_of(other),
                })
            }
        };

        Ok(Self {
            index,
            method,
            path,
            body,
        })
    }
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Position in the batch
    pub index: usize,

    /// Method, upper-case (absent for invalid steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,

    /// Path as submitted (absent for invalid steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Response status (absent for invalid steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Whether the status was 2xx
    pub success: bool,

    /// Response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Why the step could not be run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResult {
    /// Result of a step that was dispatched
    pub fn dispatched(step: &BatchStep, response: Response) -> Self {
        Self {
            index: step.index,
            method: Some(step.method),
            path: Some(step.path.clone()),
            status: Some(response.status),
            success: response.is_success(),
            data: response.body,
            error: None,
        }
    }

    /// Result of a step rejected before dispatch
    pub fn invalid(index: usize) -> Self {
        Self {
            index,
            method: None,
            path: None,
            status: None,
            success: false,
            data: None,
            error: Some(INVALID_STEP.to_string()),
        }
    }
}

/// How a batch run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Every step was attempted
    Finished,
    /// Stopped after the failing step at this index
    Halted(usize),
}

/// Aggregated batch response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// True when no step failed
    pub success: bool,
    /// One result per executed step, in order
    pub results: Vec<BatchResult>,
    /// Steps with a 2xx status
    pub completed: usize,
    /// Invalid or non-2xx steps
    pub failed: usize,
    /// How the run ended
    #[serde(skip)]
    pub state: BatchState,
}

impl BatchOutcome {
    /// Wire representation
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            warn!("Failed to serialize batch outcome: {}", e);
            Value::Null
        })
    }
}

/// Run `steps` in order through `dispatcher`
pub fn run<D>(steps: &[Value], options: BatchOptions, dispatcher: &D) -> BatchOutcome
where
    D: Dispatch + ?Sized,
{
    let mut results = Vec::with_capacity(steps.len());
    // Response bodies by step index, for reference resolution
    let mut responses: Vec<Value> = Vec::with_capacity(steps.len());
    let mut completed = 0;
    let mut failed = 0;
    let mut state = BatchState::Finished;

    for (index, raw) in steps.iter().enumerate() {
        let step = match BatchStep::parse(index, raw) {
            Ok(step) => step,
            Err(e) => {
                debug!("Batch step {} rejected: {}", index, e);
                results.push(BatchResult::invalid(index));
                responses.push(Value::Null);
                failed += 1;

                if options.stop_on_error {
                    state = BatchState::Halted(index);
                    break;
                }
                continue;
            }
        };

        let mut request = Request::new(step.method, step.path.clone());
        request.body = step.body.as_ref().map(|body| substitute(body, &responses));

        debug!("Batch step {}: {} {}", index, step.method, step.path);
        let response = dispatcher.dispatch(&request);

        responses.push(response.body.clone().unwrap_or(Value::Null));
        let result = BatchResult::dispatched(&step, response);
        let success = result.success;
        results.push(result);

        if success {
            completed += 1;
        } else {
            failed += 1;
            if options.stop_on_error {
                state = BatchState::Halted(index);
                break;
            }
        }
    }

    if let BatchState::Halted(index) = state {
        warn!(
            "Batch halted at step {} of {} ({} completed)",
            index,
            steps.len(),
            completed
        );
    }

    BatchOutcome {
        success: failed == 0,
        results,
        completed,
        failed,
        state,
    }
}
