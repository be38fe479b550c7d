//! Schema unification: freezing the column list and backfilling rows.
//!
//! Not every expanded row carries every field, so the final column list is
//! the union of field ids across all rows, in first-discovery order. After
//! the freeze, every row is padded with explicit nulls until its field set
//! matches the column list exactly.

use crate::expand::ExpandedRow;
use crate::infer::{Column, DataType};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Build the final ordered column list for one table.
///
/// Ids appear in first-discovery order: the first row's fields first, then
/// any new fields later rows introduce, in the order they first appear.
/// Columns with no inferred type (all values null) resolve to String.
pub fn unify_schema(rows: &[ExpandedRow], types: &IndexMap<String, DataType>) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::new();
    let mut seen: IndexSet<&str> = IndexSet::new();

    for row in rows {
        for id in row.keys() {
            if seen.insert(id.as_str()) {
                let data_type = match types.get(id).copied() {
                    Some(DataType::Unknown) | None => DataType::String,
                    Some(t) => t,
                };
                columns.push(Column {
                    id: id.clone(),
                    data_type,
                });
            }
        }
    }

    columns
}

/// Insert an explicit null for every column a row is missing, so each
/// row's field set equals the column id set exactly.
pub fn backfill_rows(rows: &mut [ExpandedRow], columns: &[Column]) {
    for row in rows.iter_mut() {
        if row.len() == columns.len() {
            continue;
        }
        for column in columns {
            if !row.contains_key(&column.id) {
                row.insert(column.id.clone(), Value::Null);
            }
        }
    }
}
