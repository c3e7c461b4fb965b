//! Deep merge of partial tab payload updates.

use serde_json::Value;

use crate::types::JsonMap;

/// Merge `delta` into a copy of `base`.
///
/// Keys whose values are objects on both sides merge recursively; any other
/// value in `delta` replaces the one in `base`, including arrays, which are
/// never merged element-wise. Keys only present in `base` are kept.
pub fn deep_merge(base: &JsonMap, delta: &JsonMap) -> JsonMap {
    let mut merged = base.clone();
    for (key, incoming) in delta {
        let value = match (merged.get(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => Value::Object(deep_merge(existing, nested)),
            _ => incoming.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}
