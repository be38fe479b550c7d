//! # Smelter - nested JSON to columnar tables
//!
//! A transformation engine that converts an arbitrarily nested JSON
//! document (the result of a GraphQL-style metadata query) into flat,
//! consistently typed tables. It flattens unknown heterogeneous nesting,
//! expands arrays into multiple rows, infers a stable type per column,
//! and guarantees every emitted row matches the table's final column list.
//!
//! ## Quick Start
//!
//! ```rust
//! use smelter::{parse_document, MemorySink, ParseConfig};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let document = json!({
//!     "users": [
//!         {"id": 1, "name": "Ann", "tags": ["x", "y"]}
//!     ]
//! });
//!
//! let mut sink = MemorySink::new();
//! let summary = parse_document(&document, &mut sink, ParseConfig::default())?;
//!
//! assert_eq!(summary.table_count(), 1);
//! let users = sink.table("users").unwrap();
//! // One row per tag element, schema-congruent with [id, name, tags].
//! assert_eq!(users.rows.len(), 2);
//! assert_eq!(users.columns.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! Per table: [`flatten`] reduces each element to (key path, scalar)
//! pairs, [`expand`] turns nested-array markers into independent rows,
//! [`infer`] derives a column type from the observed values, [`unify`]
//! freezes the column list and backfills missing fields with null, and a
//! [`sink::TableSink`] receives the finished (columns, rows) pair.

use anyhow::Result;
use serde_json::Value;

pub mod config;
pub mod datetime;
pub mod error;
pub mod expand;
pub mod flatten;
pub mod infer;
pub mod parser;
pub mod sink;
pub mod unify;

// Re-export commonly used types for convenience
pub use config::ParseConfig;
pub use error::ParseError;
pub use expand::{ExpandedRow, FlatRow};
pub use infer::{Column, DataType};
pub use parser::{DocumentParser, ParseSummary, TableSummary};
pub use sink::{JsonlSink, MemorySink, MemoryTable, TableSink};

/// Main entry point: parse one materialized document into tables.
pub fn parse_document(
    document: &Value,
    sink: &mut dyn TableSink,
    config: ParseConfig,
) -> Result<ParseSummary> {
    DocumentParser::new(config).parse(document, sink)
}
