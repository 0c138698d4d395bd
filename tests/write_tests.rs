//! End-to-end write tests against real .xlsx files
//!
//! Files are written through the library and read back with calamine, so
//! these tests check what another reader of the workbook would see.

use calamine::{open_workbook, Data, Reader, Xlsx};
use pretty_assertions::assert_eq;
use sheetforge::core::{describe_file, read_from_file, write_to_file, ReadRequest};
use sheetforge::{CellValue, SheetError, WriteRequest};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn request(path: &Path, sheet: &str, new_sheet: bool, range: &str, values: &str) -> WriteRequest {
    WriteRequest {
        file_absolute_path: path.to_path_buf(),
        sheet_name: sheet.to_string(),
        new_sheet,
        range: range.to_string(),
        values: serde_json::from_str(values).unwrap(),
    }
}

fn book_path(dir: &TempDir) -> PathBuf {
    dir.path().join("book.xlsx")
}

fn cell(path: &Path, sheet: &str, row: u32, col: u32) -> Data {
    let mut book: Xlsx<_> = open_workbook(path).unwrap();
    let range = book.worksheet_range(sheet).unwrap();
    range.get_value((row, col)).cloned().unwrap_or(Data::Empty)
}

fn formula(path: &Path, sheet: &str, row: u32, col: u32) -> Option<String> {
    let mut book: Xlsx<_> = open_workbook(path).unwrap();
    let formulas = book.worksheet_formula(sheet).unwrap();
    formulas
        .get_value((row, col))
        .filter(|f| !f.is_empty())
        .cloned()
}

fn serial(data: &Data) -> f64 {
    match data {
        Data::DateTime(dt) => dt.as_f64(),
        Data::Float(f) => *f,
        other => panic!("expected a serial number, got {:?}", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LITERAL WRITES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_write_literals_to_new_sheet() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);

    let report = write_to_file(&request(
        &path,
        "Data",
        true,
        "A1:B2",
        r#"[["Name","Age"],["Alice",30]]"#,
    ))
    .unwrap();

    assert!(!report.formula_mode);
    assert_eq!(report.outcome.cells_written, 4);
    assert_eq!(cell(&path, "Data", 0, 0), Data::String("Name".to_string()));
    assert_eq!(cell(&path, "Data", 0, 1), Data::String("Age".to_string()));
    assert_eq!(cell(&path, "Data", 1, 0), Data::String("Alice".to_string()));
    assert_eq!(cell(&path, "Data", 1, 1), Data::Float(30.0));

    let html = report.to_string();
    assert!(html.starts_with("<h2>Written Sheet</h2>"));
    assert!(html.contains("<tr><th></th><th>A</th><th>B</th></tr>"));
    assert!(html.contains("<tr><th>2</th><td>Alice</td><td>30</td></tr>"));
    assert!(html.contains("<li>backend: umya-spreadsheet</li>"));
    assert!(html.contains("<p>Values wrote successfully.</p>"));
}

#[test]
fn test_write_booleans_and_text_that_looks_numeric() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(&path, "S", true, "A1:C1", r#"[[true, "007", "2026-13-45"]]"#)).unwrap();

    assert_eq!(cell(&path, "S", 0, 0), Data::Bool(true));
    assert_eq!(cell(&path, "S", 0, 1), Data::String("007".to_string()));
    assert_eq!(cell(&path, "S", 0, 2), Data::String("2026-13-45".to_string()));
}

#[test]
fn test_write_at_offset_range() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    let report =
        write_to_file(&request(&path, "S", true, "c3:d3", r#"[["left","right"]]"#)).unwrap();

    assert_eq!(cell(&path, "S", 2, 2), Data::String("left".to_string()));
    assert_eq!(cell(&path, "S", 2, 3), Data::String("right".to_string()));
    assert!(report.table.contains("<th>C</th><th>D</th>"));
    assert!(report.table.contains("<tr><th>3</th>"));
}

// ═══════════════════════════════════════════════════════════════════════════
// FORMULAS AND DATES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_formula_switches_report_to_formulas() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    let report = write_to_file(&request(
        &path,
        "Calc",
        true,
        "A1:B1",
        r#"[[2, "=A1*3"]]"#,
    ))
    .unwrap();

    assert!(report.formula_mode);
    assert!(report.outcome.any_formula_written);
    assert!(report.table.contains("<td>2</td><td>=A1*3</td>"));
    assert_eq!(formula(&path, "Calc", 0, 1).as_deref(), Some("A1*3"));
    assert_eq!(formula(&path, "Calc", 0, 0), None);
}

#[test]
fn test_dates_are_stored_as_serials() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(
        &path,
        "Dates",
        true,
        "A1:C1",
        r#"[["2026-02-03", "2026-02-03T10:30:00", "2026-02-03T10:30:00Z"]]"#,
    ))
    .unwrap();

    assert_eq!(serial(&cell(&path, "Dates", 0, 0)), 46056.0);
    assert_eq!(serial(&cell(&path, "Dates", 0, 1)), 46056.4375);
    assert_eq!(serial(&cell(&path, "Dates", 0, 2)), 46056.4375);
}

#[test]
fn test_early_1900_dates_match_excel_serials() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(
        &path,
        "Dates",
        true,
        "A1:B1",
        r#"[["1900-01-15", "1900-03-01"]]"#,
    ))
    .unwrap();

    assert_eq!(serial(&cell(&path, "Dates", 0, 0)), 15.0);
    assert_eq!(serial(&cell(&path, "Dates", 0, 1)), 61.0);
}

#[test]
fn test_formula_reads_back_blank_in_values_mode() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(&path, "Calc", true, "A1:B1", r#"[[2, "=1+1"]]"#)).unwrap();

    let report = read_from_file(
        &ReadRequest {
            file_absolute_path: path.clone(),
            sheet_name: "Calc".to_string(),
            range: Some("A1:B1".to_string()),
            show_formula: false,
        },
        100,
    )
    .unwrap();
    assert!(report.table.contains("<td>2</td><td></td>"));
    assert!(!report.table.contains("<td>0</td>"));
}

#[test]
fn test_offset_date_keeps_wall_clock_time() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    let report = write_to_file(&request(
        &path,
        "Dates",
        true,
        "A1:A1",
        r#"[["2026-02-03T10:30:00+09:00"]]"#,
    ))
    .unwrap();

    assert_eq!(serial(&cell(&path, "Dates", 0, 0)), 46056.4375);
    assert!(report.table.contains("<td>2026-02-03 10:30:00</td>"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXISTING WORKBOOKS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_second_write_keeps_other_cells_and_sheets() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(&path, "One", true, "A1:B1", r#"[["a","b"]]"#)).unwrap();
    write_to_file(&request(&path, "Two", true, "A1:A1", r#"[[1]]"#)).unwrap();
    write_to_file(&request(&path, "One", false, "B1:B1", r#"[["B"]]"#)).unwrap();

    assert_eq!(cell(&path, "One", 0, 0), Data::String("a".to_string()));
    assert_eq!(cell(&path, "One", 0, 1), Data::String("B".to_string()));
    assert_eq!(cell(&path, "Two", 0, 0), Data::Float(1.0));

    let names: Vec<String> = describe_file(&path)
        .unwrap()
        .sheets
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["One".to_string(), "Two".to_string()]);
}

#[test]
fn test_write_keeps_merged_ranges_defined_names_and_formats() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book.new_sheet("Data").unwrap();
        sheet.get_cell_mut("A1").set_value_number(0.25);
        sheet
            .get_cell_mut("A1")
            .get_style_mut()
            .get_number_format_mut()
            .set_format_code("0.00%");
        sheet.get_cell_mut("A3").set_value_string("Heading");
        sheet.add_merge_cells("A3:D3");
        sheet.add_defined_name("Total", "Data!$A$1").unwrap();
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
    }

    write_to_file(&request(&path, "Data", false, "F1:F1", r#"[["x"]]"#)).unwrap();

    let book: Xlsx<_> = open_workbook(&path).unwrap();
    assert!(book
        .defined_names()
        .iter()
        .any(|(name, _)| name == "Total"));

    let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
    let sheet = book.get_sheet_by_name("Data").unwrap();
    assert_eq!(sheet.get_merge_cells().len(), 1);
    let format = sheet
        .get_cell("A1")
        .unwrap()
        .get_style()
        .get_number_format()
        .unwrap()
        .get_format_code()
        .to_string();
    assert_eq!(format, "0.00%");
    assert_eq!(sheet.get_value("F1"), "x");
    assert_eq!(cell(&path, "Data", 0, 0), Data::Float(0.25));
}

#[test]
fn test_null_clears_existing_cell() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(&path, "S", true, "A1:B1", r#"[["keep","drop"]]"#)).unwrap();
    write_to_file(&request(&path, "S", false, "A1:B1", r#"[["keep",null]]"#)).unwrap();

    assert_eq!(cell(&path, "S", 0, 0), Data::String("keep".to_string()));
    assert_eq!(cell(&path, "S", 0, 1), Data::Empty);
}

#[test]
fn test_same_write_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(&path, "S", true, "A1:B1", r#"[["x","=1+1"]]"#)).unwrap();
    let first = write_to_file(&request(&path, "S", false, "A1:B1", r#"[["x","=1+1"]]"#)).unwrap();
    let second = write_to_file(&request(&path, "S", false, "A1:B1", r#"[["x","=1+1"]]"#)).unwrap();
    assert_eq!(first.to_string(), second.to_string());
}

// ═══════════════════════════════════════════════════════════════════════════
// REJECTED WRITES LEAVE THE FILE ALONE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_row_count_mismatch_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(&path, "S", true, "A1:A1", r#"[["orig"]]"#)).unwrap();
    let before = std::fs::read(&path).unwrap();

    let err = write_to_file(&request(&path, "S", false, "A1:A2", r#"[["x"]]"#)).unwrap_err();
    assert!(matches!(
        err,
        SheetError::RowCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert!(err.is_invalid_argument());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_ragged_row_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    let err = write_to_file(&request(&path, "S", true, "A1:B2", r#"[["a","b"],["c"]]"#))
        .unwrap_err();
    assert!(matches!(err, SheetError::ColumnCountMismatch { row: 1, .. }));
    assert!(!path.exists());
}

#[test]
fn test_missing_sheet_is_invalid_argument() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    write_to_file(&request(&path, "S", true, "A1:A1", r#"[[1]]"#)).unwrap();
    let err = write_to_file(&request(&path, "Other", false, "A1:A1", r#"[[1]]"#)).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_malformed_range_is_invalid_argument() {
    let dir = TempDir::new().unwrap();
    let path = book_path(&dir);
    for range in ["", "A1:", "1A:B2", "B2:A1"] {
        let err = write_to_file(&request(&path, "S", true, range, r#"[[1]]"#)).unwrap_err();
        assert!(err.is_invalid_argument(), "range {:?} gave {}", range, err);
    }
}

#[test]
fn test_cell_value_conversions_from_json() {
    let grid: Vec<Vec<CellValue>> = serde_json::from_str(r#"[[1.5, "s", false, null]]"#).unwrap();
    assert_eq!(
        grid[0],
        vec![
            CellValue::Number(1.5),
            CellValue::from("s"),
            CellValue::Bool(false),
            CellValue::Null
        ]
    );
}
