//! Column type inference over expanded rows.
//!
//! Types resolve with asymmetric stickiness: Datetime (decided by field
//! name alone), Bool, and String lock in the moment they are assigned and
//! no later observation changes them. Int and Float stay weak — a later
//! numeric observation can flip them, and the first sticky observation
//! replaces them outright. Nulls never revise anything. A column that
//! never shows a non-null value stays Unknown and resolves to String when
//! the schema freezes.

use crate::config::ParseConfig;
use crate::datetime::is_datetime_field;
use crate::expand::ExpandedRow;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Int,
    Float,
    Bool,
    Datetime,
    /// No non-null value observed yet; resolves to String at freeze time.
    Unknown,
}

impl DataType {
    /// Sticky types are never revised by later observations.
    fn is_sticky(self) -> bool {
        matches!(self, DataType::Bool | DataType::String | DataType::Datetime)
    }
}

/// A finalized column: the cleaned field name and its resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub data_type: DataType,
}

/// Derive a data type per column from all rows of one table.
///
/// Columns appear in the returned map in first-seen field order. The scan
/// visits rows in order and fields in row order, evaluating each non-null
/// value against the current (possibly weak) assignment.
pub fn infer_columns(rows: &[ExpandedRow], config: &ParseConfig) -> IndexMap<String, DataType> {
    let mut columns: IndexMap<String, DataType> = IndexMap::new();

    for row in rows {
        for (name, value) in row.iter() {
            let entry = columns
                .entry(name.clone())
                .or_insert_with(|| initial_type(name, config));

            if entry.is_sticky() {
                continue;
            }
            if value.is_null() {
                continue;
            }
            if let Some(observed) = classify_value(value) {
                *entry = observed;
            }
        }
    }

    columns
}

/// The name-based decision, made before any value is looked at. A field
/// whose cleaned name qualifies as a timestamp is Datetime (or String when
/// datetime typing is disabled), final either way.
fn initial_type(name: &str, config: &ParseConfig) -> DataType {
    if is_datetime_field(name, config) {
        if config.allow_datetime {
            DataType::Datetime
        } else {
            DataType::String
        }
    } else {
        DataType::Unknown
    }
}

fn classify_value(value: &Value) -> Option<DataType> {
    match value {
        Value::Bool(_) => Some(DataType::Bool),
        Value::Number(n) => {
            // Int vs Float by the canonical decimal rendering.
            if n.to_string().contains('.') {
                Some(DataType::Float)
            } else {
                Some(DataType::Int)
            }
        }
        Value::String(_) => Some(DataType::String),
        // Containers never reach expanded rows; leave the column open.
        _ => None,
    }
}
