//! Structured request and response bodies
//!
//! Bodies are `serde_json::Value` (built with `preserve_order`, so object
//! keys keep their insertion order). Handlers read fields through
//! [`BodyExt`], which never coerces between variants: a field of the wrong
//! type is a [`FieldError`], not a default.

mod path;

pub use path::resolve;

use serde_json::{Map, Value};
use thiserror::Error;

/// Structured value used for every request and response body
pub type Body = Value;

/// Failure to read a typed field from a body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// No body, or the body is not an object
    #[error("Request body must be a JSON object")]
    MissingBody,

    /// Required field absent
    #[error("Missing required field: {field}")]
    Missing {
        /// Field name
        field: String,
    },

    /// Field present with another variant
    #[error("Field '{field}' must be {expected}, found {found}")]
    WrongType {
        /// Field name
        field: String,
        /// Expected variant
        expected: &'static str,
        /// Actual variant
        found: &'static str,
    },

    /// Required string field present but empty
    #[error("Missing required field: {field}")]
    Empty {
        /// Field name
        field: String,
    },
}

/// Name of a value's variant, as used in error messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Checked field accessors for object bodies
pub trait BodyExt {
    /// Look up a raw field; absent when the value is not an object
    fn field(&self, key: &str) -> Option<&Value>;

    /// Borrow the object, or fail with [`FieldError::MissingBody`]
    fn as_fields(&self) -> Result<&Map<String, Value>, FieldError>;

    /// Required non-empty string
    fn get_str(&self, key: &str) -> Result<&str, FieldError> {
        match self.required(key)? {
            Value::String(s) if s.is_empty() => Err(FieldError::Empty {
                field: key.to_string(),
            }),
            Value::String(s) => Ok(s),
            other => Err(wrong_type(key, "a string", other)),
        }
    }

    /// Required non-empty string, owned
    fn get_string(&self, key: &str) -> Result<String, FieldError> {
        self.get_str(key).map(str::to_string)
    }

    /// Required boolean
    fn get_bool(&self, key: &str) -> Result<bool, FieldError> {
        match self.required(key)? {
            Value::Bool(b) => Ok(*b),
            other => Err(wrong_type(key, "a boolean", other)),
        }
    }

    /// Required integer
    fn get_i64(&self, key: &str) -> Result<i64, FieldError> {
        let value = self.required(key)?;
        value
            .as_i64()
            .ok_or_else(|| wrong_type(key, "an integer", value))
    }

    /// Required number
    fn get_f64(&self, key: &str) -> Result<f64, FieldError> {
        let value = self.required(key)?;
        value.as_f64().ok_or_else(|| wrong_type(key, "a number", value))
    }

    /// Required object
    fn get_object(&self, key: &str) -> Result<&Map<String, Value>, FieldError> {
        let value = self.required(key)?;
        value
            .as_object()
            .ok_or_else(|| wrong_type(key, "an object", value))
    }

    /// Required array
    fn get_array(&self, key: &str) -> Result<&Vec<Value>, FieldError> {
        let value = self.required(key)?;
        value
            .as_array()
            .ok_or_else(|| wrong_type(key, "an array", value))
    }

    /// Optional string; `default` only when the field is absent
    fn optional_str<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, FieldError> {
        match self.field(key) {
            None => Ok(default),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(wrong_type(key, "a string", other)),
        }
    }

    /// Optional boolean; `default` only when the field is absent
    fn optional_bool(&self, key: &str, default: bool) -> Result<bool, FieldError> {
        match self.field(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(wrong_type(key, "a boolean", other)),
        }
    }

    /// Optional integer; `default` only when the field is absent
    fn optional_i64(&self, key: &str, default: i64) -> Result<i64, FieldError> {
        match self.field(key) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| wrong_type(key, "an integer", value)),
        }
    }

    /// Optional number; `default` only when the field is absent
    fn optional_f64(&self, key: &str, default: f64) -> Result<f64, FieldError> {
        match self.field(key) {
            None => Ok(default),
            Some(value) => value.as_f64().ok_or_else(|| wrong_type(key, "a number", value)),
        }
    }

    #[doc(hidden)]
    fn required(&self, key: &str) -> Result<&Value, FieldError> {
        self.as_fields()?.get(key).ok_or_else(|| FieldError::Missing {
            field: key.to_string(),
        })
    }
}

impl BodyExt for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    fn as_fields(&self) -> Result<&Map<String, Value>, FieldError> {
        self.as_object().ok_or(FieldError::MissingBody)
    }
}

impl BodyExt for Option<Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_ref().and_then(|value| value.field(key))
    }

    fn as_fields(&self) -> Result<&Map<String, Value>, FieldError> {
        self.as_ref()
            .ok_or(FieldError::MissingBody)
            .and_then(|value| value.as_fields())
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &Value) -> FieldError {
    FieldError::WrongType {
        field: key.to_string(),
        expected,
        found: kind_of(found),
    }
}
