mod common;

use std::path::{Path, PathBuf};

use aideon_merge::io::discovery::discover_inputs;
use aideon_merge::io::excel_read::load_table;
use aideon_merge::io::excel_write::write_merged;
use aideon_merge::model::{Cell, MergedTable};
use aideon_merge::MergeError;
use common::{num, text, write_garbage, write_sheet, write_sheet_at};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn loads_header_and_typed_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet(
        &temp_dir.path().join("sales.xlsx"),
        &["Product", "Units", "Paid"],
        &[
            vec![text("Widget"), num(3.0), Cell::Boolean(true)],
            vec![text("Gadget"), Cell::Null, Cell::Boolean(false)],
        ],
    );

    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(table.name, "sales.xlsx");
    assert_eq!(table.row_count, 2);
    assert_eq!(table.labels(), ["Product", "Units", "Paid"]);
    assert_eq!(
        table.column("Units").expect("Units column").values,
        vec![num(3.0), Cell::Null]
    );
    assert_eq!(
        table.column("Paid").expect("Paid column").values,
        vec![Cell::Boolean(true), Cell::Boolean(false)]
    );
}

#[test]
fn labels_are_trimmed() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet(
        &temp_dir.path().join("padded.xlsx"),
        &["  ID", "Name  "],
        &[vec![num(1.0), text("Alice")]],
    );

    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(table.labels(), ["ID", "Name"]);
}

#[test]
fn blank_and_repeated_labels_are_disambiguated() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet(
        &temp_dir.path().join("messy.xlsx"),
        &["ID", "", "ID", "Note"],
        &[vec![num(1.0), text("x"), num(2.0), text("y")]],
    );

    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(table.labels(), ["ID", "Unnamed: 1", "ID.1", "Note"]);
}

#[test]
fn whitespace_variants_collide_after_trimming() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet(
        &temp_dir.path().join("collide.xlsx"),
        &["Name", "Name "],
        &[vec![text("a"), text("b")]],
    );

    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(table.labels(), ["Name", "Name"]);
}

#[test]
fn header_only_sheet_is_empty() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet(&temp_dir.path().join("header.xlsx"), &["ID", "Name"], &[]);

    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(table.row_count, 0);
    assert!(table.is_empty());
}

#[test]
fn format_is_detected_by_content_not_extension() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet(
        &temp_dir.path().join("mislabelled.xls"),
        &["ID"],
        &[vec![num(1.0)], vec![num(2.0)]],
    );

    let table = load_table(&path).expect("modern payload under legacy name");

    assert_eq!(table.row_count, 2);
}

#[test]
fn legacy_binary_workbook_is_loaded() {
    let table = load_table(&fixture("legacy.xls")).expect("legacy workbook loaded");

    assert_eq!(table.name, "legacy.xls");
    assert_eq!(table.labels(), ["ID", "Name", "Joined", "Active"]);
    assert_eq!(table.row_count, 2);
    assert_eq!(
        table.column("ID").expect("ID column").values,
        vec![num(1.0), num(2.0)]
    );
    assert_eq!(
        table.column("Name").expect("Name column").values,
        vec![text("Alice"), text("Bob")]
    );
    assert_eq!(
        table.column("Joined").expect("Joined column").values,
        vec![Cell::Date(45000.0), Cell::Null]
    );
    assert_eq!(
        table.column("Active").expect("Active column").values,
        vec![Cell::Boolean(true), Cell::Boolean(false)]
    );
}

#[test]
fn merged_dates_load_back_as_dates() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("dates.xlsx");
    let merged = MergedTable {
        header: vec!["When".to_string(), "ID".to_string()],
        columns: vec![
            vec![Cell::Date(45000.0), Cell::Date(45000.5)],
            vec![num(1.0), num(2.0)],
        ],
        row_count: 2,
    };

    write_merged(&path, &merged).expect("merged workbook written");
    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(
        table.column("When").expect("When column").values,
        vec![Cell::Date(45000.0), Cell::Date(45000.5)]
    );
    assert_eq!(
        table.column("ID").expect("ID column").values,
        vec![num(1.0), num(2.0)]
    );
}

#[test]
fn date_formatted_cells_load_as_dates() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet(
        &temp_dir.path().join("joined.xlsx"),
        &["Joined"],
        &[vec![Cell::Date(44927.0)], vec![Cell::Null]],
    );

    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(
        table.column("Joined").expect("Joined column").values,
        vec![Cell::Date(44927.0), Cell::Null]
    );
}

#[test]
fn header_is_first_non_blank_row_and_columns_start_at_a() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_sheet_at(
        &temp_dir.path().join("offset.xlsx"),
        (1, 1),
        &["ID", "Name"],
        &[vec![num(1.0), text("Alice")], vec![num(2.0), text("Bob")]],
    );

    let table = load_table(&path).expect("workbook loaded");

    assert_eq!(table.labels(), ["Unnamed: 0", "ID", "Name"]);
    assert_eq!(table.row_count, 2);
    assert_eq!(
        table.column("Unnamed: 0").expect("leading column").values,
        vec![Cell::Null, Cell::Null]
    );
    assert_eq!(
        table.column("ID").expect("ID column").values,
        vec![num(1.0), num(2.0)]
    );
    assert_eq!(
        table.column("Name").expect("Name column").values,
        vec![text("Alice"), text("Bob")]
    );
}

#[test]
fn unreadable_file_reports_both_formats() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_garbage(&temp_dir.path().join("broken.xlsx"));

    let err = load_table(&path).expect_err("garbage rejected");

    assert_eq!(err.path, path);
    assert!(!err.modern.is_empty());
    assert!(!err.legacy.is_empty());
    assert!(err.to_string().contains("broken.xlsx"));
}

#[test]
fn discovery_lists_modern_files_before_legacy_ones() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_garbage(&dir.join("b.xls"));
    write_garbage(&dir.join("c.xlsx"));
    write_garbage(&dir.join("a.xlsx"));
    write_garbage(&dir.join("notes.txt"));
    std::fs::create_dir(dir.join("nested.xlsx")).expect("directory created");

    let files = discover_inputs(dir, None).expect("inputs discovered");
    let names: Vec<String> = files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, ["a.xlsx", "c.xlsx", "b.xls"]);
}

#[test]
fn discovery_skips_excluded_output() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_garbage(&dir.join("input.xlsx"));
    let output = write_garbage(&dir.join("merged.xlsx"));

    let files = discover_inputs(dir, Some(&output)).expect("inputs discovered");

    assert_eq!(files, vec![dir.join("input.xlsx")]);
}

#[test]
fn discovery_rejects_missing_directory() {
    let temp_dir = tempdir().expect("temporary directory");
    let missing = temp_dir.path().join("absent");

    let err = discover_inputs(&missing, None).expect_err("missing directory rejected");

    assert!(matches!(err, MergeError::MissingInput(path) if path == missing));
}
