//! Workbook import and Excel report export tests

use pretty_assertions::assert_eq;
use reportcard::core::{Analyzer, Classifier, Scope};
use reportcard::error::ReportError;
use reportcard::excel::{ReportExporter, SourceKind, Workbook};
use reportcard::types::CellValue;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two sheets of grades plus an empty one
fn write_grades_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("grades.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Term1").unwrap();
    let header = ["Class", "Name", "Family Name", "Math", "Science"];
    for (col, label) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *label).unwrap();
    }
    let rows: [(&str, &str, &str, f64, f64); 3] = [
        ("7/1", "Ali", "Rezaei", 18.0, 17.0),
        ("7/2", "Sara", "Ahmadi", 15.0, 16.0),
        ("7/1", "Mina", "Karimi", 19.0, 20.0),
    ];
    for (idx, (class, given, family, math, science)) in rows.iter().enumerate() {
        // Leave a blank row after the first student
        let row = if idx == 0 { 1 } else { idx as u32 + 2 };
        sheet.write_string(row, 0, *class).unwrap();
        sheet.write_string(row, 1, *given).unwrap();
        sheet.write_string(row, 2, *family).unwrap();
        sheet.write_number(row, 3, *math).unwrap();
        sheet.write_number(row, 4, *science).unwrap();
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Term2").unwrap();
    sheet.write_string(0, 0, "ریاضی").unwrap();
    sheet.write_string(0, 1, "ریاضی").unwrap();
    sheet.write_string(1, 0, "۱۸").unwrap();
    sheet.write_number(1, 1, 12.0).unwrap();

    workbook.add_worksheet().set_name("Empty").unwrap();

    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_open_lists_sheet_names_in_order() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();

    assert_eq!(workbook.kind(), SourceKind::Spreadsheet);
    assert_eq!(workbook.sheet_names(), ["Term1", "Term2", "Empty"]);
}

#[test]
fn test_load_sheet_skips_blank_rows() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();
    let table = workbook.load_sheet("Term1").unwrap();

    assert_eq!(table.sheet, "Term1");
    assert_eq!(
        table.columns,
        vec!["Class", "Name", "Family Name", "Math", "Science"]
    );
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.cell(1, 1), &CellValue::Text("Sara".to_string()));
    assert_eq!(table.cell(2, 3), &CellValue::Number(19.0));
}

#[test]
fn test_sheets_load_independently() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();

    let second = workbook.load_sheet("Term2").unwrap();
    let first = workbook.load_sheet("Term1").unwrap();
    let second_again = workbook.load_sheet("Term2").unwrap();

    assert_eq!(first.row_count(), 3);
    assert_eq!(second, second_again);
    assert_eq!(second.columns, vec!["ریاضی", "ریاضی.1"]);
}

#[test]
fn test_empty_sheet_fails_alone() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();

    let err = workbook.load_sheet("Empty").unwrap_err();
    assert!(matches!(err, ReportError::SheetRead { ref sheet, .. } if sheet == "Empty"));
    assert!(workbook.load_sheet("Term1").is_ok());
}

#[test]
fn test_missing_sheet_is_sheet_error() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();
    let err = workbook.load_sheet("Term9").unwrap_err();
    assert!(matches!(err, ReportError::SheetRead { .. }));
    assert!(err.is_structural());
}

#[test]
fn test_corrupt_file_is_file_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.xlsx");
    std::fs::write(&path, b"PK\x03\x04 definitely not a zip").unwrap();

    match Workbook::open(&path) {
        Err(ReportError::FileRead { path: reported, .. }) => {
            assert!(reported.ends_with("corrupt.xlsx"))
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("corrupt workbook opened"),
    }
}

#[test]
fn test_missing_file_is_file_error() {
    let result = Workbook::open("/nonexistent/grades.xlsx");
    assert!(matches!(result, Err(ReportError::FileRead { .. })));
}

#[test]
fn test_csv_document_is_one_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("term3.csv");
    std::fs::write(&path, "Name,Math,Science\nAli,18,absent\nSara,15,16\n").unwrap();

    let workbook = Workbook::open(&path).unwrap();
    assert_eq!(workbook.kind(), SourceKind::Csv);
    assert_eq!(workbook.sheet_names(), ["term3"]);

    let analyzer = Analyzer::new(workbook.load_first_sheet().unwrap(), &Classifier::default())
        .unwrap();
    assert_eq!(analyzer.clean().averages(), vec![18.0, 15.5]);
}

#[test]
fn test_persian_digits_from_workbook() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();
    let analyzer = Analyzer::new(workbook.load_sheet("Term2").unwrap(), &Classifier::default())
        .unwrap();

    assert_eq!(analyzer.clean().rows[0].scores, vec![Some(18.0), Some(12.0)]);
    assert_eq!(analyzer.clean().rows[0].average, 15.0);
}

// ═══════════════════════════════════════════════════════════════════════════
// REPORT EXPORT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_report_workbook_sheets() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();
    let analyzer = Analyzer::new(workbook.load_sheet("Term1").unwrap(), &Classifier::default())
        .unwrap();
    let analysis = analyzer.analyze(&Scope::All);

    let output = dir.path().join("report.xlsx");
    ReportExporter::new(&analysis).export(&output).unwrap();
    assert!(output.exists());

    let report = Workbook::open(&output).unwrap();
    assert_eq!(
        report.sheet_names(),
        ["Overview", "Students", "Subjects", "Classes", "Ranking"]
    );

    let ranking = report.load_sheet("Ranking").unwrap();
    assert_eq!(&ranking.columns[..3], &["rank", "displayName", "StudentAverage"]);
    assert_eq!(ranking.cell(0, 1), &CellValue::Text("Mina Karimi".to_string()));
    assert_eq!(ranking.cell(0, 2), &CellValue::Number(19.5));
}

#[test]
fn test_report_for_class_scope_has_no_class_sheet() {
    let dir = TempDir::new().unwrap();
    let workbook = Workbook::open(write_grades_workbook(dir.path())).unwrap();
    let analyzer = Analyzer::new(workbook.load_sheet("Term1").unwrap(), &Classifier::default())
        .unwrap();
    let analysis = analyzer.analyze(&Scope::Class("7/2".to_string()));

    let output = dir.path().join("report-7-2.xlsx");
    ReportExporter::new(&analysis).export(&output).unwrap();

    let report = Workbook::open(&output).unwrap();
    assert_eq!(
        report.sheet_names(),
        ["Overview", "Students", "Subjects", "Ranking"]
    );
    let students = report.load_sheet("Students").unwrap();
    assert_eq!(students.row_count(), 1);
}
