//! The per-table parsing pipeline.
//!
//! A document's top-level keys are table names; the value under each key
//! is that table's query result in whatever shape the source produced.
//! Tables are processed strictly one after another: flatten every element,
//! expand nested arrays into rows, infer column types, freeze and backfill
//! the schema, then emit to the sink. No state survives between tables or
//! between parse invocations.

use crate::config::ParseConfig;
use crate::expand::{expand_row, ExpandedRow, FlatRow};
use crate::flatten::flatten_value;
use crate::infer::infer_columns;
use crate::sink::TableSink;
use crate::unify::{backfill_rows, unify_schema};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Per-table counts reported after a parse invocation.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

/// Outcome of one parse invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseSummary {
    pub tables: Vec<TableSummary>,
}

impl ParseSummary {
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Converts one materialized JSON document into flat, typed tables.
pub struct DocumentParser {
    config: ParseConfig,
}

impl DocumentParser {
    pub fn new(config: ParseConfig) -> Self {
        DocumentParser { config }
    }

    /// Parse a document and emit every table to the sink.
    ///
    /// The only failures that propagate are the sink refusing to provide
    /// a table and nesting past the configured depth guard. Unexpected
    /// but valid shapes (null elements, empty containers, mixed-type
    /// arrays) degrade to nulls, String columns, or vanished branches.
    pub fn parse(&self, document: &Value, sink: &mut dyn TableSink) -> Result<ParseSummary> {
        let Value::Object(tables) = document else {
            bail!("document root must be an object keyed by table name");
        };

        let mut summary = ParseSummary::default();
        for (table_name, table_value) in tables.iter() {
            let table = self
                .parse_table(table_name, table_value, sink)
                .with_context(|| format!("failed to parse table: {table_name}"))?;
            summary.tables.push(table);
        }

        info!(tables = summary.table_count(), "parsing complete for all tables");
        Ok(summary)
    }

    fn parse_table(
        &self,
        name: &str,
        value: &Value,
        sink: &mut dyn TableSink,
    ) -> Result<TableSummary> {
        info!(table = name, "parsing data");

        // Each element of the result set becomes one flattened row.
        let mut rows: Vec<ExpandedRow> = Vec::new();
        for element in table_elements(value) {
            let flat: FlatRow = flatten_value(element, "", &self.config)?
                .into_iter()
                .collect();
            rows.extend(expand_row(&flat, &self.config)?);
        }

        info!(table = name, rows = rows.len(), "parsing metadata");
        let types = infer_columns(&rows, &self.config);

        let is_new = sink
            .open_table(name)
            .with_context(|| format!("sink failed to provide table: {name}"))?;

        let columns = unify_schema(&rows, &types);
        backfill_rows(&mut rows, &columns);

        if is_new {
            sink.add_column_headers(name, &columns)
                .with_context(|| format!("failed to register columns for table: {name}"))?;
        }

        let summary = TableSummary {
            name: name.to_string(),
            rows: rows.len(),
            columns: columns.len(),
        };
        sink.add_rows(name, rows)
            .with_context(|| format!("failed to append rows to table: {name}"))?;

        info!(table = name, "parsing complete");
        Ok(summary)
    }
}

/// The per-row elements of a table value: array elements, object entry
/// values, or the value itself when it is already a scalar.
fn table_elements(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(obj) => obj.values().collect(),
        scalar => vec![scalar],
    }
}
