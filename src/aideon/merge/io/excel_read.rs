use std::collections::HashSet;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xls, XlsError, Xlsx, XlsxError, open_workbook};
use tracing::{debug, instrument};

use crate::aideon::merge::error::LoadError;
use crate::aideon::merge::model::{Cell, Column, Table};

/// On-disk spreadsheet variants the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Office Open XML workbook (`.xlsx`).
    Modern,
    /// BIFF binary workbook (`.xls`).
    Legacy,
}

impl SpreadsheetFormat {
    /// Order in which formats are tried, regardless of the file extension.
    pub const TRIAL_ORDER: [SpreadsheetFormat; 2] =
        [SpreadsheetFormat::Modern, SpreadsheetFormat::Legacy];

    fn read_first_sheet(self, path: &Path) -> Result<Range<DataType>, String> {
        match self {
            SpreadsheetFormat::Modern => {
                let workbook: Xlsx<BufReader<File>> =
                    open_workbook(path).map_err(|err: XlsxError| err.to_string())?;
                first_sheet(workbook)
            }
            SpreadsheetFormat::Legacy => {
                let workbook: Xls<BufReader<File>> =
                    open_workbook(path).map_err(|err: XlsError| err.to_string())?;
                first_sheet(workbook)
            }
        }
    }
}

/// Reads the first worksheet of `path` into a [`Table`].
///
/// The modern format is tried first and the legacy one second; the file is
/// rejected only when both fail. A table without data rows is returned as is,
/// callers check [`Table::is_empty`].
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut reasons = Vec::with_capacity(SpreadsheetFormat::TRIAL_ORDER.len());
    for format in SpreadsheetFormat::TRIAL_ORDER {
        match format.read_first_sheet(path) {
            Ok(range) => {
                debug!(?format, "worksheet read");
                return Ok(range_to_table(name, &range));
            }
            Err(reason) => {
                debug!(?format, %reason, "format rejected");
                reasons.push(reason);
            }
        }
    }

    let mut reasons = reasons.into_iter();
    Err(LoadError {
        path: path.to_path_buf(),
        modern: reasons.next().unwrap_or_default(),
        legacy: reasons.next().unwrap_or_default(),
    })
}

fn first_sheet<R>(mut workbook: R) -> Result<Range<DataType>, String>
where
    R: Reader<BufReader<File>>,
    R::Error: Display,
{
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(err)) => Err(err.to_string()),
        None => Err("workbook has no worksheet".to_string()),
    }
}

/// Converts a worksheet range into a table.
///
/// The first non-blank row is the header. Columns are counted from sheet
/// column A, so blank leading columns come back as `Unnamed: n` columns of
/// nulls instead of shifting the data left.
pub fn range_to_table(name: String, range: &Range<DataType>) -> Table {
    let leading = range.start().map_or(0, |(_, column)| column as usize);
    let mut rows = range.rows();
    let raw_labels: Vec<String> = match rows.next() {
        Some(header) => (0..leading)
            .map(|index| header_label(index, &DataType::Empty))
            .chain(
                header
                    .iter()
                    .enumerate()
                    .map(|(offset, cell)| header_label(leading + offset, cell)),
            )
            .collect(),
        None => Vec::new(),
    };

    let mut columns: Vec<Column> = dedupe_labels(raw_labels)
        .into_iter()
        .map(|label| Column::new(label.trim(), Vec::new()))
        .collect();

    let mut row_count = 0;
    for row in rows {
        for (index, column) in columns.iter_mut().enumerate() {
            let cell = index.checked_sub(leading).and_then(|offset| row.get(offset));
            column.values.push(to_cell(cell));
        }
        row_count += 1;
    }

    Table::with_row_count(name, row_count, columns)
}

fn header_label(index: usize, cell: &DataType) -> String {
    let label = match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    };
    if label.is_empty() {
        format!("Unnamed: {index}")
    } else {
        label
    }
}

/// Suffixes repeated raw labels with `.1`, `.2`, ... so that only labels
/// differing in surrounding whitespace can collide after trimming.
fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = labels.iter().cloned().collect();
    let mut emitted: HashSet<String> = HashSet::with_capacity(labels.len());
    labels
        .into_iter()
        .map(|label| {
            if emitted.insert(label.clone()) {
                return label;
            }
            let mut suffix = 1;
            loop {
                let candidate = format!("{label}.{suffix}");
                if seen.insert(candidate.clone()) {
                    emitted.insert(candidate.clone());
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

fn to_cell(cell: Option<&DataType>) -> Cell {
    match cell {
        Some(DataType::String(value)) => Cell::Text(value.clone()),
        Some(DataType::Float(value)) => Cell::Number(*value),
        Some(DataType::Int(value)) => Cell::Number(*value as f64),
        Some(DataType::Bool(value)) => Cell::Boolean(*value),
        Some(DataType::DateTime(value)) => Cell::Date(*value),
        Some(DataType::Empty) | None => Cell::Null,
        Some(other) => Cell::Text(other.to_string()),
    }
}
