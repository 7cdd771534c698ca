//! Cache key construction.

use serde_json::{Map, Value};

/// Builds the cache key for a read of `endpoint` with `params`.
///
/// Absent, `null` or empty-object parameters yield the bare endpoint.
/// Otherwise the key is `"{endpoint}:{params}"` with object keys sorted at
/// every depth, so `{"page":1,"status":"paid"}` and `{"status":"paid","page":1}`
/// produce the same key.
///
/// ```
/// use medportal_cache::cache_key;
/// use serde_json::json;
///
/// assert_eq!(cache_key("/bills", None), "/bills");
/// assert_eq!(
///     cache_key("/bills", Some(&json!({"status": "paid", "page": 2}))),
///     r#"/bills:{"page":2,"status":"paid"}"#
/// );
/// ```
#[must_use]
pub fn cache_key(endpoint: &str, params: Option<&Value>) -> String {
    match params {
        None | Some(Value::Null) => endpoint.to_string(),
        Some(Value::Object(map)) if map.is_empty() => endpoint.to_string(),
        Some(params) => format!("{endpoint}:{}", canonical(params)),
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k.clone(), canonical(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_params() {
        assert_eq!(cache_key("/staff", None), "/staff");
        assert_eq!(cache_key("/staff", Some(&Value::Null)), "/staff");
        assert_eq!(cache_key("/staff", Some(&json!({}))), "/staff");
    }

    #[test]
    fn test_param_order_does_not_matter() {
        let a = json!({"doctor_id": "d1", "date": "2026-10-16", "filter": {"z": 1, "a": 2}});
        let b = json!({"filter": {"a": 2, "z": 1}, "date": "2026-10-16", "doctor_id": "d1"});
        assert_eq!(cache_key("/appointments", Some(&a)), cache_key("/appointments", Some(&b)));
    }

    #[test]
    fn test_distinct_params_distinct_keys() {
        let page1 = cache_key("/bills", Some(&json!({"page": 1})));
        let page2 = cache_key("/bills", Some(&json!({"page": 2})));
        assert_ne!(page1, page2);
        assert!(page1.starts_with("/bills:"));
    }

    #[test]
    fn test_array_order_is_preserved() {
        let a = cache_key("/lab/orders", Some(&json!({"ids": [1, 2]})));
        let b = cache_key("/lab/orders", Some(&json!({"ids": [2, 1]})));
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_contains_endpoint_for_invalidation() {
        let key = cache_key("/pharmacy/medicines", Some(&json!({"search": "amox"})));
        assert!(key.contains("/pharmacy/medicines"));
        assert!(key.contains("/pharmacy"));
    }
}
