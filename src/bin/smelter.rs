//! smelter: flatten a nested JSON document into typed columnar tables
//!
//! The input is one JSON object whose top-level keys are table names and
//! whose values are the (arbitrarily nested) query results for that table.
//!
//! Usage:
//!   # Read from file, stream rows to stdout
//!   smelter results.json
//!
//!   # Read from stdin
//!   curl ... | smelter
//!
//!   # Write one .jsonl file (plus schema) per table
//!   smelter results.json --output-dir ./tables
//!
//!   # Treat timestamp-named fields as plain strings
//!   smelter results.json --no-datetime

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use smelter::{DocumentParser, JsonlSink, MemorySink, ParseConfig};
use std::io::{Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smelter")]
#[command(about = "Flatten nested JSON query results into typed tables", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Output directory for one .jsonl file per table.
    /// If omitted, rows stream to stdout tagged with a "_table" key.
    #[arg(long, short = 'o')]
    output_dir: Option<String>,

    /// Maximum nesting depth before parsing fails (default: 32)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Type timestamp-named fields as String instead of Datetime
    #[arg(long)]
    no_datetime: bool,

    /// Comma-separated field-name substrings to add to the datetime
    /// allow-list
    #[arg(long)]
    datetime_fields: Option<String>,

    /// Print a per-table summary (as JSON) after parsing
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Build config
    let mut config = ParseConfig::default();
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    config.allow_datetime = !args.no_datetime;
    if let Some(fields_str) = args.datetime_fields {
        config
            .datetime_fields
            .extend(fields_str.split(',').map(|s| s.trim().to_string()));
    }

    let document = read_document(args.input.as_deref())?;
    let parser = DocumentParser::new(config);

    let summary = if let Some(output_dir) = args.output_dir {
        let mut sink = JsonlSink::new(&output_dir)?;
        let summary = parser.parse(&document, &mut sink)?;
        sink.flush()?;
        summary
    } else {
        let mut sink = MemorySink::new();
        let summary = parser.parse(&document, &mut sink)?;
        write_tables_to_stdout(&sink)?;
        summary
    };

    if args.summary {
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Read the whole document, trying SIMD parsing first and falling back to
/// serde_json when the input defeats it.
fn read_document(input: Option<&str>) -> Result<Value> {
    let bytes = match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read input file: {path}"))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let mut simd_buf = bytes.clone();
    match simd_json::serde::from_slice::<Value>(&mut simd_buf) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_slice(&bytes).context("Failed to parse JSON document"),
    }
}

/// Stream every table's rows as newline-delimited JSON with a `_table` tag.
fn write_tables_to_stdout(sink: &MemorySink) -> Result<()> {
    let mut stdout = std::io::stdout();
    for (name, table) in sink.tables.iter() {
        for row in &table.rows {
            let line = serde_json::to_string(&tag_row(row.clone(), name))?;
            writeln!(stdout, "{line}")?;
        }
    }
    Ok(())
}

/// Tag a row with the table it belongs to. A real column that cleaned to
/// the name `_table` keeps its value; the tag is only added when the key
/// is free.
fn tag_row(mut row: smelter::ExpandedRow, table: &str) -> smelter::ExpandedRow {
    row.entry("_table")
        .or_insert_with(|| Value::String(table.to_string()));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_row_adds_table_name() {
        let mut row = smelter::ExpandedRow::new();
        row.insert("id".to_string(), json!(1));

        let tagged = tag_row(row, "users");
        assert_eq!(tagged.get("_table"), Some(&json!("users")));
    }

    #[test]
    fn test_tag_row_keeps_existing_table_column() {
        let mut row = smelter::ExpandedRow::new();
        row.insert("_table".to_string(), json!("from the data"));

        let tagged = tag_row(row, "users");
        assert_eq!(tagged.get("_table"), Some(&json!("from the data")));
    }
}
