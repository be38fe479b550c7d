//! The downstream table-storage boundary.
//!
//! The parsing core never owns persistence. It asks a [`TableSink`] for a
//! table by name, learns whether that table is newly created, registers
//! column headers once for new tables, and appends rows. Two
//! implementations ship with the crate: an in-memory sink for tests and
//! stdout streaming, and a JSON Lines sink that writes one file per table.

use crate::expand::ExpandedRow;
use crate::infer::Column;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where finalized tables land.
pub trait TableSink {
    /// Look up (or create) a table by name. Returns true when this call
    /// created the table; headers are registered only in that case.
    fn open_table(&mut self, name: &str) -> Result<bool>;

    /// One-time column registration for a newly created table.
    fn add_column_headers(&mut self, name: &str, columns: &[Column]) -> Result<()>;

    /// Append rows keyed by column id.
    fn add_rows(&mut self, name: &str, rows: Vec<ExpandedRow>) -> Result<()>;
}

/// A finalized in-memory table.
#[derive(Debug, Default, Clone)]
pub struct MemoryTable {
    pub columns: Vec<Column>,
    pub rows: Vec<ExpandedRow>,
}

/// Collects tables in memory, in creation order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tables: IndexMap<String, MemoryTable>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }
}

impl TableSink for MemorySink {
    fn open_table(&mut self, name: &str) -> Result<bool> {
        let is_new = !self.tables.contains_key(name);
        if is_new {
            self.tables.insert(name.to_string(), MemoryTable::default());
        }
        Ok(is_new)
    }

    fn add_column_headers(&mut self, name: &str, columns: &[Column]) -> Result<()> {
        let table = self
            .tables
            .get_mut(name)
            .with_context(|| format!("table not opened: {name}"))?;
        table.columns = columns.to_vec();
        Ok(())
    }

    fn add_rows(&mut self, name: &str, rows: Vec<ExpandedRow>) -> Result<()> {
        let table = self
            .tables
            .get_mut(name)
            .with_context(|| format!("table not opened: {name}"))?;
        table.rows.extend(rows);
        Ok(())
    }
}

/// Writes one `<table>.jsonl` file per table into an output directory,
/// with the column list alongside in `<table>.schema.json`.
pub struct JsonlSink {
    output_dir: PathBuf,
    writers: HashMap<String, File>,
}

impl JsonlSink {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;
        Ok(JsonlSink {
            output_dir: output_dir.as_ref().to_path_buf(),
            writers: HashMap::new(),
        })
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.jsonl"))
    }

    fn schema_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.schema.json"))
    }

    pub fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush().context("Failed to flush table file")?;
        }
        Ok(())
    }
}

impl TableSink for JsonlSink {
    fn open_table(&mut self, name: &str) -> Result<bool> {
        if self.writers.contains_key(name) {
            return Ok(false);
        }

        let path = self.data_path(name);
        // A file left by an earlier run means the table already exists;
        // rows append and headers are not resent.
        let is_new = !path.exists();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open table file: {}", path.display()))?;
        self.writers.insert(name.to_string(), file);
        Ok(is_new)
    }

    fn add_column_headers(&mut self, name: &str, columns: &[Column]) -> Result<()> {
        let path = self.schema_path(name);
        let json = serde_json::to_string_pretty(columns)
            .context("Failed to serialize column headers")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write schema file: {}", path.display()))?;
        Ok(())
    }

    fn add_rows(&mut self, name: &str, rows: Vec<ExpandedRow>) -> Result<()> {
        let writer = self
            .writers
            .get_mut(name)
            .with_context(|| format!("table not opened: {name}"))?;
        for row in rows {
            let json = serde_json::to_string(&row).context("Failed to serialize row")?;
            writeln!(writer, "{json}").context("Failed to write row")?;
        }
        Ok(())
    }
}
