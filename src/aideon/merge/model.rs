use serde::{Deserialize, Serialize};

/// Represents a single typed spreadsheet value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Cell {
    /// Plain text. An empty string is still text, not [`Cell::Null`].
    Text(String),
    /// Numeric value. Integer cells are widened to `f64`.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Date or date-time stored as an Excel serial number.
    Date(f64),
    /// Explicit missing value.
    Null,
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Convenience constructor for text cells.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(label: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Creates a column holding `rows` null cells.
    pub fn nulls(label: impl Into<String>, rows: usize) -> Self {
        Self::new(label, vec![Cell::Null; rows])
    }
}

/// An in-memory grid loaded from one source file.
///
/// Columns are stored column-major and are expected to hold exactly
/// `row_count` values each. The loader always upholds this; tables assembled
/// by hand may not, which the normalizer reports as a ragged column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// File name of the source, used for provenance.
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<Column>,
}

impl Table {
    /// Creates a table whose row count is taken from its longest column.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let row_count = columns
            .iter()
            .map(|column| column.values.len())
            .max()
            .unwrap_or(0);
        Self::with_row_count(name, row_count, columns)
    }

    pub fn with_row_count(name: impl Into<String>, row_count: usize, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            row_count,
            columns,
        }
    }

    /// Labels in column order.
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.label.clone()).collect()
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.label == label)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A table without data rows or without columns never takes part in a
    /// merge.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }
}

/// The result of concatenating every table of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    /// Labels as they are displayed and written, one per column.
    pub header: Vec<String>,
    /// Column-major cell data, aligned with `header`.
    pub columns: Vec<Vec<Cell>>,
    pub row_count: usize,
}

impl MergedTable {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Returns the cells of the first column displayed under `label`.
    pub fn column(&self, label: &str) -> Option<&[Cell]> {
        self.header
            .iter()
            .position(|candidate| candidate == label)
            .and_then(|index| self.columns.get(index))
            .map(Vec::as_slice)
    }

    /// Returns one row across all columns.
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.row_count {
            return None;
        }
        self.columns
            .iter()
            .map(|column| column.get(index))
            .collect()
    }
}
