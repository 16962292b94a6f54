//! Batch variable references
//!
//! A string inside a step body may reference an earlier step's response
//! with `$N.field.path`. Each reference is resolved against the response
//! body of step `N` and replaced by the string or number found there.
//! Anything that cannot be resolved (out-of-range index, bare `$N`, missing
//! field, non-scalar value) is left in place as literal text.

use crate::body::resolve;
use regex::{Captures, Regex};
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;
use tracing::debug;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\d+)(?:\.([A-Za-z0-9_.]+))?").expect("reference pattern is valid")
});

/// Rewrite every reference in the string leaves of `body`.
///
/// Objects are rewritten field by field; arrays and non-string scalars are
/// copied unchanged.
pub fn substitute(body: &Value, prior_results: &[Value]) -> Value {
    match body {
        Value::String(text) => Value::String(substitute_str(text, prior_results)),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), substitute(value, prior_results)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

/// Rewrite the references in a single string.
///
/// All references are resolved against the same `prior_results`; replaced
/// text is never scanned again.
pub fn substitute_str(text: &str, prior_results: &[Value]) -> String {
    REFERENCE
        .replace_all(text, |caps: &Captures<'_>| {
            resolve_reference(caps, prior_results).unwrap_or_else(|| {
                debug!("Leaving unresolved batch reference '{}'", &caps[0]);
                caps[0].to_string()
            })
        })
        .into_owned()
}

fn resolve_reference(caps: &Captures<'_>, prior_results: &[Value]) -> Option<String> {
    let index: usize = caps[1].parse().ok()?;
    let path = caps.get(2)?.as_str();

    match resolve(prior_results.get(index)?, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(render_number(n)),
        _ => None,
    }
}

/// Integral numbers render without a fractional part
pub(crate) fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }

    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
