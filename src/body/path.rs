//! Dot-separated field path lookup

use serde_json::Value;

/// Resolve `path` (e.g. `"node.id"`) against `root`.
///
/// Every segment but the last must name a field of an object; the last
/// segment's value is returned whatever its variant. Arrays are not
/// indexable. Empty segments are skipped, so `"a..b"` and `"a.b."` both
/// mean `"a.b"`.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.').filter(|segment| !segment.is_empty());
    let mut current = root.as_object()?.get(segments.next()?)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    Some(current)
}
