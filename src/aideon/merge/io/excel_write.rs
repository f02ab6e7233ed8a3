use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::{debug, instrument};

use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::model::{Cell, MergedTable};

/// Name of the single worksheet holding the merged rows.
pub const MERGED_SHEET: &str = "Sheet1";

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes the merged table to `path` as a single-sheet workbook.
///
/// Null cells are left blank. Any failure is reported as
/// [`MergeError::Write`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_merged(path: &Path, table: &MergedTable) -> Result<()> {
    write_workbook(path, table).map_err(|source| MergeError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_workbook(path: &Path, table: &MergedTable) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let date_time_format = Format::new().set_num_format(DATE_TIME_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(MERGED_SHEET)?;

    for (col_idx, header) in table.header.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (col_idx, column) in table.columns.iter().enumerate() {
        let col = col_idx as u16;
        for (row_idx, cell) in column.iter().enumerate() {
            let row = (row_idx + 1) as u32;
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(row, col, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, *value)?;
                }
                Cell::Boolean(value) => {
                    worksheet.write_boolean(row, col, *value)?;
                }
                Cell::Date(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &date_time_format
                    };
                    worksheet.write_number_with_format(row, col, *serial, format)?;
                }
                Cell::Null => {}
            }
        }
    }

    if !table.header.is_empty() {
        let col_end = (table.header.len() as u16).saturating_sub(1);
        worksheet.autofilter(0, 0, table.row_count as u32, col_end)?;
    }

    workbook.save(path)?;
    debug!(
        rows = table.row_count,
        columns = table.column_count(),
        "merged workbook saved"
    );
    Ok(())
}
