//! Cache key derivation
//!
//! A key is every parameter followed by [`KEY_DELIMITER`], in request order.
//! Requests with any non-string parameter get no key and bypass the cache.

use crate::cache::types::CacheKey;
use crate::request::RequestValue;

/// Separator appended after each parameter
pub const KEY_DELIMITER: &str = "$$";

/// Build the cache key for a request, or `None` if the request is not cacheable
pub fn build_key(params: &[RequestValue]) -> Option<CacheKey> {
    let mut key = String::with_capacity(capacity_hint(params));

    for param in params {
        match param {
            RequestValue::Str(s) => {
                key.push_str(s);
                key.push_str(KEY_DELIMITER);
            }
            RequestValue::Int(_)
            | RequestValue::Float(_)
            | RequestValue::Bool(_)
            | RequestValue::Json(_) => return None,
        }
    }

    Some(key)
}

/// Build the cache key for an all-string rule
pub fn rule_key(rule: &[String]) -> CacheKey {
    let mut key = String::with_capacity(rule.iter().map(|p| p.len() + KEY_DELIMITER.len()).sum());
    for param in rule {
        key.push_str(param);
        key.push_str(KEY_DELIMITER);
    }
    key
}

fn capacity_hint(params: &[RequestValue]) -> usize {
    params
        .iter()
        .map(|p| p.as_str().map_or(0, str::len) + KEY_DELIMITER.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strs(parts: &[&str]) -> Vec<RequestValue> {
        parts.iter().map(|p| RequestValue::from(*p)).collect()
    }

    #[test]
    fn test_string_params_build_key() {
        let key = build_key(&strs(&["alice", "data1", "read"]));
        assert_eq!(key.as_deref(), Some("alice$$data1$$read$$"));
    }

    #[test]
    fn test_same_params_same_key() {
        let a = build_key(&strs(&["bob", "data2", "write"]));
        let b = build_key(&strs(&["bob", "data2", "write"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_matters() {
        let a = build_key(&strs(&["alice", "read"]));
        let b = build_key(&strs(&["read", "alice"]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_non_string_param_not_cacheable() {
        let params = vec![
            RequestValue::from("alice"),
            RequestValue::from(json!({"owner": "alice"})),
            RequestValue::from("read"),
        ];
        assert_eq!(build_key(&params), None);

        let params = vec![RequestValue::from("alice"), RequestValue::from(3i64)];
        assert_eq!(build_key(&params), None);

        // A JSON string is still structured input
        let params = vec![RequestValue::Json(json!("alice"))];
        assert_eq!(build_key(&params), None);
    }

    #[test]
    fn test_empty_params() {
        assert_eq!(build_key(&[]).as_deref(), Some(""));
    }

    #[test]
    fn test_rule_key_matches_build_key() {
        let rule = vec!["alice".to_string(), "data1".to_string(), "read".to_string()];
        assert_eq!(Some(rule_key(&rule)), build_key(&strs(&["alice", "data1", "read"])));
    }
}
