use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::debug;

/// Row-oriented string data addressed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Table {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Appends a row, padding it with empty cells up to the column count.
    pub fn push_row<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<()> {
        if cells.len() > self.columns.len() {
            bail!(
                "Row has {} cells but the table has {} columns",
                cells.len(),
                self.columns.len()
            );
        }
        let mut row: Vec<String> = cells.iter().map(|c| c.as_ref().to_string()).collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
        Ok(())
    }

    /// Cell of `row` under column `name`; `None` when the column is unknown.
    pub fn get<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.column_index(name)
            .and_then(|i| row.get(i))
            .map(String::as_str)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Saved {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .clone();
        let mut table = Table::new(&headers.iter().collect::<Vec<_>>());
        for (line, result) in reader.records().enumerate() {
            let record =
                result.with_context(|| format!("Bad record {} in {}", line + 1, path.display()))?;
            table.push_row(&record.iter().collect::<Vec<_>>())?;
        }
        debug!("Loaded {} rows from {}", table.len(), path.display());
        Ok(table)
    }
}
