//! Dot-path field access.

use serde_json::Value;

/// Resolve a dot-separated `path` against `value`.
///
/// Each segment indexes the current value: objects by field name, arrays by
/// decimal index. An empty path returns `value` itself.
///
/// Returns `None` when a segment cannot be followed (missing key, scalar,
/// bad index). A `null` stored at the path is returned as `Some(Value::Null)`.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.')
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        })
}
