//! Flattening nested JSON into (key path, scalar) pairs.
//!
//! A key path is a bracket-encoded walk from the root of a value to one
//! scalar leaf: object segments quote the key (`['name']`), array segments
//! carry the decimal index (`[0]`). The path uniquely identifies the walk
//! until `clean_field_name` strips the structural punctuation.

use crate::config::ParseConfig;
use crate::error::ParseError;
use serde_json::Value;

/// Flatten a JSON value into (key path, scalar) pairs.
///
/// Every scalar leaf reachable from `value` produces one pair. Empty
/// objects and arrays produce nothing: the branch vanishes rather than
/// leaving a placeholder, so a field that is empty in every row never
/// becomes a column.
pub fn flatten_value(
    value: &Value,
    prefix: &str,
    config: &ParseConfig,
) -> Result<Vec<(String, Value)>, ParseError> {
    let mut pairs = Vec::new();
    descend(value, prefix, 0, config.max_depth, &mut pairs)?;
    Ok(pairs)
}

fn descend(
    value: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
    pairs: &mut Vec<(String, Value)>,
) -> Result<(), ParseError> {
    if depth > max_depth {
        return Err(ParseError::DepthExceeded { limit: max_depth });
    }

    match value {
        Value::Object(obj) => {
            for (key, child) in obj.iter() {
                let segment = format!("{path}['{key}']");
                descend(child, &segment, depth + 1, max_depth, pairs)?;
            }
        }
        Value::Array(arr) => {
            for (idx, child) in arr.iter().enumerate() {
                let segment = format!("{path}[{idx}]");
                descend(child, &segment, depth + 1, max_depth, pairs)?;
            }
        }
        // Scalar leaf (including null): emit and stop.
        _ => pairs.push((path.to_string(), value.clone())),
    }

    Ok(())
}

/// Strip brackets and quotes from a key path, producing the externally
/// visible column id. Two distinct paths can clean to the same id; that
/// collision is resolved last-write-wins downstream.
pub fn clean_field_name(path: &str) -> String {
    path.chars().filter(|c| !matches!(c, '[' | ']' | '\'')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flatten(value: &Value) -> Vec<(String, Value)> {
        flatten_value(value, "", &ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_scalar_leaf() {
        let pairs = flatten(&json!(42));
        assert_eq!(pairs, vec![(String::new(), json!(42))]);
    }

    #[test]
    fn test_nested_object() {
        let pairs = flatten(&json!({"a": 1, "b": {"c": "x"}}));
        assert_eq!(
            pairs,
            vec![
                ("['a']".to_string(), json!(1)),
                ("['b']['c']".to_string(), json!("x")),
            ]
        );
    }

    #[test]
    fn test_array_indices() {
        let pairs = flatten(&json!({"tags": ["x", "y"]}));
        assert_eq!(
            pairs,
            vec![
                ("['tags'][0]".to_string(), json!("x")),
                ("['tags'][1]".to_string(), json!("y")),
            ]
        );
    }

    #[test]
    fn test_null_leaf_is_emitted() {
        let pairs = flatten(&json!({"a": null}));
        assert_eq!(pairs, vec![("['a']".to_string(), Value::Null)]);
    }

    #[test]
    fn test_empty_containers_vanish() {
        let pairs = flatten(&json!({"a": 1, "empty_obj": {}, "empty_arr": []}));
        assert_eq!(pairs, vec![("['a']".to_string(), json!(1))]);
    }

    #[test]
    fn test_object_order_preserved() {
        let pairs = flatten(&json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["['z']", "['a']", "['m']"]);
    }

    #[test]
    fn test_depth_guard() {
        let mut value = json!(1);
        for _ in 0..40 {
            value = json!({ "n": value });
        }

        let err = flatten_value(&value, "", &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::DepthExceeded { limit: 32 }));
    }

    #[test]
    fn test_clean_field_name() {
        assert_eq!(clean_field_name("['users'][0]['name']"), "users0name");
        assert_eq!(clean_field_name("['a'].['b']"), "a.b");
    }
}
