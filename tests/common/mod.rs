#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use aideon_merge::model::Cell;
use rust_xlsxwriter::{Format, Workbook};

/// Writes a single-sheet workbook with `header` on row 0 and `rows` below.
/// Blank header labels and null cells are left unwritten.
pub fn write_sheet(path: &Path, header: &[&str], rows: &[Vec<Cell>]) -> PathBuf {
    write_sheet_at(path, (0, 0), header, rows)
}

/// Like [`write_sheet`], with the header's top-left cell at `origin`.
pub fn write_sheet_at(
    path: &Path,
    origin: (u32, u16),
    header: &[&str],
    rows: &[Vec<Cell>],
) -> PathBuf {
    let (first_row, first_col) = origin;
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let worksheet = workbook.add_worksheet();

    for (col, label) in header.iter().enumerate() {
        if !label.is_empty() {
            worksheet
                .write_string(first_row, first_col + col as u16, *label)
                .expect("header written");
        }
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = first_row + (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = first_col + col as u16;
            match cell {
                Cell::Text(value) => {
                    worksheet
                        .write_string(row_num, col, value)
                        .expect("text written");
                }
                Cell::Number(value) => {
                    worksheet
                        .write_number(row_num, col, *value)
                        .expect("number written");
                }
                Cell::Date(value) => {
                    worksheet
                        .write_number_with_format(row_num, col, *value, &date_format)
                        .expect("date written");
                }
                Cell::Boolean(value) => {
                    worksheet
                        .write_boolean(row_num, col, *value)
                        .expect("boolean written");
                }
                Cell::Null => {}
            }
        }
    }

    workbook.save(path).expect("workbook saved");
    path.to_path_buf()
}

/// Writes bytes that neither spreadsheet reader accepts.
pub fn write_garbage(path: &Path) -> PathBuf {
    fs::write(path, b"this is not a spreadsheet").expect("garbage written");
    path.to_path_buf()
}

pub fn text(value: &str) -> Cell {
    Cell::text(value)
}

pub fn num(value: f64) -> Cell {
    Cell::Number(value)
}
