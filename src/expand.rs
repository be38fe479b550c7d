//! Row expansion: turning one flattened row into N flat rows.
//!
//! A flattened row may contain key paths with array-index segments, which
//! encode structural repetition. Expansion consumes one nesting level per
//! recursive call, depth-first: fields are grouped by the index value at
//! their first array segment (the "row number" for that level), each group
//! is merged with the scalar fields, and the merge is expanded again.
//!
//! Sibling arrays at the same level pair strictly by shared original
//! index, never as a cartesian product. When sibling lengths differ, the
//! surplus indices produce partial rows. That is preserved upstream
//! behavior and a candidate product decision, not a bug to correct here.

use crate::config::ParseConfig;
use crate::datetime::{is_datetime_field, normalize_datetime};
use crate::error::ParseError;
use crate::flatten::clean_field_name;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One flattened JSON element: key path → scalar.
pub type FlatRow = Map<String, Value>;

/// One emittable record: cleaned field name → scalar.
pub type ExpandedRow = Map<String, Value>;

// First bare-index segment in a key path, with everything after it.
// Quoted object keys (`['0']`) never match; only array segments do.
static ARRAY_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(.*?)\[([0-9]+)\](.*)$").unwrap());

/// Expand one flattened row into independent flat rows.
///
/// A row with no array segments expands to exactly one row. Otherwise the
/// output is the union of the recursive expansions for every distinct row
/// number found at this nesting level, in ascending index order.
pub fn expand_row(row: &FlatRow, config: &ParseConfig) -> Result<Vec<ExpandedRow>, ParseError> {
    expand(row, 0, config)
}

fn expand(
    row: &FlatRow,
    depth: usize,
    config: &ParseConfig,
) -> Result<Vec<ExpandedRow>, ParseError> {
    if depth > config.max_depth {
        return Err(ParseError::DepthExceeded {
            limit: config.max_depth,
        });
    }

    // Scalar fields shared by every row produced at this level.
    let mut template = Map::new();
    // Array fields grouped by row number, keyed by the remainder path.
    let mut groups: BTreeMap<u64, FlatRow> = BTreeMap::new();

    for (path, value) in row.iter() {
        match split_on_array_segment(path) {
            Some((prefix, row_num, rest)) => {
                // Re-join with the level separator; no separator when the
                // array held a scalar directly (`['tags'][0]` → `['tags']`).
                let sub_path = if rest.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{prefix}.{rest}")
                };
                groups
                    .entry(row_num)
                    .or_default()
                    .insert(sub_path, value.clone());
            }
            None => {
                let clean = clean_field_name(path);
                let converted = if is_datetime_field(&clean, config) {
                    normalize_datetime(value)
                } else {
                    value.clone()
                };
                // Last write wins when distinct paths clean to the same id.
                template.insert(clean, converted);
            }
        }
    }

    if groups.is_empty() {
        return Ok(vec![template]);
    }

    let mut rows = Vec::new();
    for (_, sub_row) in groups {
        let mut merged = template.clone();
        merged.extend(sub_row);
        rows.extend(expand(&merged, depth + 1, config)?);
    }
    Ok(rows)
}

fn split_on_array_segment(path: &str) -> Option<(&str, u64, &str)> {
    let caps = ARRAY_SEGMENT.captures(path)?;
    let row_num: u64 = caps.get(2)?.as_str().parse().ok()?;
    Some((
        caps.get(1)?.as_str(),
        row_num,
        caps.get(3)?.as_str(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(pairs: &[(&str, Value)]) -> FlatRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn expand(row: &FlatRow) -> Vec<ExpandedRow> {
        expand_row(row, &ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_no_arrays_single_row() {
        let row = flat(&[("['a']", json!(1)), ("['b']['c']", json!("x"))]);
        let rows = expand(&row);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&json!(1)));
        assert_eq!(rows[0].get("bc"), Some(&json!("x")));
    }

    #[test]
    fn test_nested_array_expands_by_index() {
        // {a: 1, b: [{c: 2}, {c: 3}]}
        let row = flat(&[
            ("['a']", json!(1)),
            ("['b'][0]['c']", json!(2)),
            ("['b'][1]['c']", json!(3)),
        ]);
        let rows = expand(&row);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("a"), Some(&json!(1)));
        assert_eq!(rows[0].get("b.c"), Some(&json!(2)));
        assert_eq!(rows[1].get("a"), Some(&json!(1)));
        assert_eq!(rows[1].get("b.c"), Some(&json!(3)));
    }

    #[test]
    fn test_scalar_array_column_name() {
        let row = flat(&[
            ("['id']", json!(1)),
            ("['tags'][0]", json!("x")),
            ("['tags'][1]", json!("y")),
        ]);
        let rows = expand(&row);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("tags"), Some(&json!("x")));
        assert_eq!(rows[1].get("tags"), Some(&json!("y")));
    }

    #[test]
    fn test_two_levels_of_nesting() {
        // {a: 1, b: [{c: [{d: 9}, {d: 8}]}]}
        let row = flat(&[
            ("['a']", json!(1)),
            ("['b'][0]['c'][0]['d']", json!(9)),
            ("['b'][0]['c'][1]['d']", json!(8)),
        ]);
        let rows = expand(&row);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("b.c.d"), Some(&json!(9)));
        assert_eq!(rows[1].get("b.c.d"), Some(&json!(8)));
        assert!(rows.iter().all(|r| r.get("a") == Some(&json!(1))));
    }

    #[test]
    fn test_sibling_arrays_pair_by_index_not_cartesian() {
        // {x: [1, 2], y: ["a", "b", "c"]} — three rows, paired where the
        // index values coincide; index 2 exists only in y, so its row has
        // no x field at all.
        let row = flat(&[
            ("['x'][0]", json!(1)),
            ("['x'][1]", json!(2)),
            ("['y'][0]", json!("a")),
            ("['y'][1]", json!("b")),
            ("['y'][2]", json!("c")),
        ]);
        let rows = expand(&row);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("x"), Some(&json!(1)));
        assert_eq!(rows[0].get("y"), Some(&json!("a")));
        assert_eq!(rows[1].get("x"), Some(&json!(2)));
        assert_eq!(rows[1].get("y"), Some(&json!("b")));
        assert_eq!(rows[2].get("x"), None);
        assert_eq!(rows[2].get("y"), Some(&json!("c")));
    }

    #[test]
    fn test_row_numbers_iterate_in_ascending_order() {
        let row = flat(&[
            ("['v'][2]", json!("late")),
            ("['v'][0]", json!("early")),
            ("['v'][1]", json!("mid")),
        ]);
        let rows = expand(&row);

        let values: Vec<&Value> = rows.iter().filter_map(|r| r.get("v")).collect();
        assert_eq!(values, vec![&json!("early"), &json!("mid"), &json!("late")]);
    }

    #[test]
    fn test_datetime_fields_normalized_during_expansion() {
        let row = flat(&[
            ("['createdAt']", json!("2023-06-01T00:00:00Z")),
            ("['events'][0]['updatedAt']", json!("2023-06-02T00:00:00Z")),
        ]);
        let rows = expand(&row);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("createdAt"), Some(&json!("2023-06-01T00:00:00.000Z")));
        // Array-derived timestamp converts once its level is consumed.
        assert_eq!(
            rows[0].get("events.updatedAt"),
            Some(&json!("2023-06-02T00:00:00.000Z"))
        );
    }

    #[test]
    fn test_clean_name_collision_last_write_wins() {
        // "['a']['b']" and "['ab']" both clean to "ab".
        let row = flat(&[("['a']['b']", json!("first")), ("['ab']", json!("second"))]);
        let rows = expand(&row);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].get("ab"), Some(&json!("second")));
    }

    #[test]
    fn test_depth_guard_on_pathological_nesting() {
        let mut config = ParseConfig::default();
        config.max_depth = 3;

        let row = flat(&[("['a'][0]['b'][0]['c'][0]['d'][0]['e'][0]", json!(1))]);
        let err = expand_row(&row, &config).unwrap_err();
        assert!(matches!(err, ParseError::DepthExceeded { limit: 3 }));
    }
}
