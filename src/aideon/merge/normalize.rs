//! Schema reconciliation.
//!
//! Every table of a batch is re-expressed over the [`UnifiedSchema`], the
//! sorted union of all column labels. Columns a table lacks are filled with
//! null cells; present columns are copied verbatim. Inputs are never
//! modified.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, instrument, warn};

use crate::aideon::merge::error::NormalizeError;
use crate::aideon::merge::model::{Column, Table};

/// Sorted, duplicate-free list of every column label seen in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnifiedSchema {
    labels: Vec<String>,
}

impl UnifiedSchema {
    /// Builds the schema from the labels of every table, in byte-wise
    /// lexicographic order.
    pub fn from_tables(tables: &[Table]) -> Self {
        let labels: BTreeSet<&str> = tables
            .iter()
            .flat_map(|table| table.columns.iter())
            .map(|column| column.label.as_str())
            .collect();
        Self {
            labels: labels.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of `label` in schema order.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels
            .binary_search_by(|candidate| candidate.as_str().cmp(label))
            .ok()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub schema: UnifiedSchema,
    /// One table per input, in input order.
    pub tables: Vec<Table>,
    /// Tables that could not be widened and were passed through unmodified,
    /// keyed by their index in `tables`.
    pub degraded: Vec<(usize, NormalizeError)>,
}

impl Normalized {
    pub fn is_degraded(&self, index: usize) -> bool {
        self.degraded.iter().any(|(degraded, _)| *degraded == index)
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|table| table.row_count).sum()
    }
}

/// Widens `table` to `schema`.
///
/// Fails when the table repeats a label or holds a column whose length
/// differs from its row count.
pub fn widen(table: &Table, schema: &UnifiedSchema) -> Result<Table, NormalizeError> {
    let mut seen = HashSet::with_capacity(table.columns.len());
    for column in &table.columns {
        if !seen.insert(column.label.as_str()) {
            return Err(NormalizeError::DuplicateLabel {
                label: column.label.clone(),
            });
        }
        if column.values.len() != table.row_count {
            return Err(NormalizeError::RaggedColumn {
                label: column.label.clone(),
                expected: table.row_count,
                actual: column.values.len(),
            });
        }
    }

    let columns = schema
        .labels()
        .iter()
        .map(|label| match table.column(label) {
            Some(column) => column.clone(),
            None => Column::nulls(label.clone(), table.row_count),
        })
        .collect();

    Ok(Table::with_row_count(
        table.name.clone(),
        table.row_count,
        columns,
    ))
}

/// Widens every table to the batch's unified schema.
///
/// A table that fails to widen is logged and substituted unmodified, so the
/// output always has one entry per input. Such a table does not share the
/// unified schema; callers find it through [`Normalized::degraded`].
#[instrument(level = "info", skip_all, fields(table_count = tables.len()))]
pub fn normalize(tables: &[Table]) -> Normalized {
    let schema = UnifiedSchema::from_tables(tables);
    debug!(column_count = schema.len(), "unified schema computed");

    let mut widened = Vec::with_capacity(tables.len());
    let mut degraded = Vec::new();
    for (index, table) in tables.iter().enumerate() {
        match widen(table, &schema) {
            Ok(table) => widened.push(table),
            Err(err) => {
                warn!(table = %table.name, error = %err, "table left unwidened");
                widened.push(table.clone());
                degraded.push((index, err));
            }
        }
    }

    Normalized {
        schema,
        tables: widened,
        degraded,
    }
}
