use std::path::Path;

use crate::error::{ReportError, Result};

/// In-memory form of one CSV file: an ordered header row plus string rows.
///
/// Both scanners disagree on almost everything except "it's a comma file
/// with a header", so the pipeline works on untyped string cells and lets
/// the enrichment functions parse what they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Appends a row, padding or truncating it to the header width so every
    /// row always has exactly one cell per column.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column the pipeline cannot proceed without. A missing
    /// required column is a structural error and aborts the run.
    pub fn require_column(&self, name: &str, path: &Path) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            ReportError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            }
            .into()
        })
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    /// Inserts a new column at `index` with one value per row.
    /// `values` must have exactly one entry per row.
    pub fn insert_column(&mut self, index: usize, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.insert(index, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(index, value);
        }
    }

    /// Inserts a derived column directly after its logical source column.
    /// The anchor must exist; callers resolve it through `require_column`
    /// before deriving values.
    pub fn insert_column_after(&mut self, anchor: usize, name: &str, values: Vec<String>) {
        self.insert_column(anchor + 1, name, values);
    }

    pub fn append_column(&mut self, name: &str, values: Vec<String>) {
        self.insert_column(self.headers.len(), name, values);
    }

    /// Applies `derive` to every row, producing one value per row. Used to
    /// build derived columns before inserting them.
    pub fn map_rows<F>(&self, derive: F) -> Vec<String>
    where
        F: Fn(&[String]) -> String,
    {
        self.rows.iter().map(|row| derive(row)).collect()
    }
}
