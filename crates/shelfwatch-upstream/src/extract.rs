//! Ordered-fallback extraction of facts from heterogeneous JSON payloads.
//!
//! Upstream payload shapes vary by product type and market, so no strict
//! schema is assumed. Each fact is described by an ordered list of candidate
//! dot-paths ("try the more specific field, then the more general one");
//! the first path resolving to a non-null value wins, and a missing segment
//! never fails — it just falls through to the next candidate. Accommodating
//! upstream schema drift is a one-line addition to a path list.

use serde_json::Value;

/// Walks one dot-separated path against `payload`. Numeric segments index
/// arrays (`"product.images.0.imageUrl"`). Returns `None` on any missing
/// segment or when the resolved value is JSON `null`.
#[must_use]
pub fn pluck<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Returns the first candidate path that resolves to a non-null value.
#[must_use]
pub fn extract<'a>(payload: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| pluck(payload, path))
}

/// String form of [`extract`]. Bare numbers stringify, since upstreams are
/// inconsistent about quoting identifiers.
#[must_use]
pub fn extract_str(payload: &Value, paths: &[&str]) -> Option<String> {
    extract(payload, paths).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Float form of [`extract`]; numeric strings parse.
#[must_use]
pub fn extract_f64(payload: &Value, paths: &[&str]) -> Option<f64> {
    extract(payload, paths).and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Unsigned-integer form of [`extract`]; numeric strings parse.
#[must_use]
pub fn extract_u64(payload: &Value, paths: &[&str]) -> Option<u64> {
    extract(payload, paths).and_then(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
