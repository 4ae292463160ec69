//! Workbook loading: spreadsheet or CSV document → one `RawTable` per sheet

use crate::error::{ReportError, ReportResult};
use crate::types::{format_number, CellValue, RawTable};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: &str = "\u{FEFF}";

/// Document format, decided from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// xlsx, xlsm, xlsb, xls or ods; the reader sniffs the exact format
    Spreadsheet,
    /// Single-sheet CSV
    Csv,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SourceKind::Csv,
            _ => SourceKind::Spreadsheet,
        }
    }
}

/// An in-memory workbook.
///
/// The source is read completely on open and the file handle released. Every
/// sheet load reads from a fresh cursor over those bytes, so loading a second
/// sheet never depends on where the previous read stopped.
pub struct Workbook {
    kind: SourceKind,
    bytes: Vec<u8>,
    sheet_names: Vec<String>,
}

impl Workbook {
    /// Read and validate a workbook from disk
    pub fn open<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ReportError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string();
        Self::from_bytes(&path.display().to_string(), &name, SourceKind::from_path(path), bytes)
    }

    /// Wrap bytes already in memory. `origin` names the document in errors;
    /// `name` becomes the sheet name of a CSV document.
    pub fn from_bytes(origin: &str, name: &str, kind: SourceKind, bytes: Vec<u8>) -> ReportResult<Self> {
        let sheet_names = match kind {
            SourceKind::Csv => vec![name.to_string()],
            SourceKind::Spreadsheet => {
                let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.as_slice())).map_err(
                    |e| ReportError::FileRead {
                        path: origin.to_string(),
                        reason: e.to_string(),
                    },
                )?;
                workbook.sheet_names()
            }
        };

        debug!(document = origin, sheets = sheet_names.len(), "workbook opened");
        Ok(Self {
            kind,
            bytes,
            sheet_names,
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Load the first sheet
    pub fn load_first_sheet(&self) -> ReportResult<RawTable> {
        let first = self
            .sheet_names
            .first()
            .ok_or_else(|| ReportError::SheetRead {
                sheet: String::new(),
                reason: "workbook has no sheets".to_string(),
            })?;
        self.load_sheet(first)
    }

    /// Load one sheet by name. A failure here leaves other sheets loadable.
    pub fn load_sheet(&self, sheet: &str) -> ReportResult<RawTable> {
        if !self.sheet_names.iter().any(|s| s == sheet) {
            return Err(ReportError::SheetRead {
                sheet: sheet.to_string(),
                reason: format!("no such sheet (available: {})", self.sheet_names.join(", ")),
            });
        }

        let grid = match self.kind {
            SourceKind::Csv => self.read_csv_grid(sheet)?,
            SourceKind::Spreadsheet => self.read_spreadsheet_grid(sheet)?,
        };

        build_table(sheet, grid).inspect_err(|e| warn!(sheet, error = %e, "sheet skipped"))
    }

    fn read_spreadsheet_grid(&self, sheet: &str) -> ReportResult<Vec<Vec<CellValue>>> {
        let sheet_error = |reason: String| ReportError::SheetRead {
            sheet: sheet.to_string(),
            reason,
        };

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes.as_slice()))
            .map_err(|e| sheet_error(e.to_string()))?;
        let range: Range<Data> = workbook
            .worksheet_range(sheet)
            .map_err(|e| sheet_error(e.to_string()))?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(data_to_cell_value).collect())
            .collect())
    }

    fn read_csv_grid(&self, sheet: &str) -> ReportResult<Vec<Vec<CellValue>>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(self.bytes.as_slice()));

        let mut grid = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ReportError::SheetRead {
                sheet: sheet.to_string(),
                reason: e.to_string(),
            })?;
            let row: Vec<CellValue> = record
                .iter()
                .enumerate()
                .map(|(col, field)| {
                    // Byte-order mark from spreadsheet-friendly exports
                    if grid.is_empty() && col == 0 {
                        CellValue::text(field.trim_start_matches(UTF8_BOM))
                    } else {
                        CellValue::text(field)
                    }
                })
                .collect();
            grid.push(row);
        }
        Ok(grid)
    }
}

/// Convert a calamine cell to a raw cell
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        // Excel serial date; dates never hold scores but keep the number
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#ERROR: {e:?}")),
    }
}

/// First non-blank row is the header; fully blank rows are skipped
fn build_table(sheet: &str, grid: Vec<Vec<CellValue>>) -> ReportResult<RawTable> {
    let mut rows = grid
        .into_iter()
        .filter(|row| row.iter().any(|c| !c.is_empty()));

    let header = rows.next().ok_or_else(|| ReportError::SheetRead {
        sheet: sheet.to_string(),
        reason: "sheet is empty".to_string(),
    })?;

    let data: Vec<Vec<CellValue>> = rows.collect();
    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let labels = (0..width)
        .map(|col| match header.get(col) {
            Some(CellValue::Text(s)) => s.trim().to_string(),
            Some(CellValue::Number(n)) => format_number(*n),
            Some(CellValue::Empty) | None => format!("Unnamed: {col}"),
        })
        .collect();

    debug!(sheet, columns = width, rows = data.len(), "sheet loaded");
    Ok(RawTable::new(sheet, unique_labels(labels), data))
}

/// Disambiguate repeated labels as `label.1`, `label.2`, ...
fn unique_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let mut candidate = label.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{label}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn csv_workbook(content: &str) -> Workbook {
        Workbook::from_bytes("test.csv", "grades", SourceKind::Csv, content.as_bytes().to_vec())
            .unwrap()
    }

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(&PathBuf::from("a.CSV")), SourceKind::Csv);
        assert_eq!(
            SourceKind::from_path(&PathBuf::from("a.xlsx")),
            SourceKind::Spreadsheet
        );
        assert_eq!(SourceKind::from_path(&PathBuf::from("a")), SourceKind::Spreadsheet);
    }

    #[test]
    fn test_unique_labels() {
        let labels = vec![
            "Math".to_string(),
            "Math".to_string(),
            "Name".to_string(),
            "Math".to_string(),
        ];
        assert_eq!(
            unique_labels(labels),
            vec!["Math", "Math.1", "Name", "Math.2"]
        );
    }

    #[test]
    fn test_data_to_cell_value() {
        assert_eq!(data_to_cell_value(&Data::Int(18)), CellValue::Number(18.0));
        assert_eq!(data_to_cell_value(&Data::Float(17.5)), CellValue::Number(17.5));
        assert_eq!(
            data_to_cell_value(&Data::String("  ".to_string())),
            CellValue::Empty
        );
        assert_eq!(data_to_cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            data_to_cell_value(&Data::Bool(true)),
            CellValue::Text("true".to_string())
        );
    }

    #[test]
    fn test_csv_sheet_named_after_document() {
        let wb = csv_workbook("Name,Math\nAli,18\n");
        assert_eq!(wb.sheet_names(), ["grades".to_string()]);
        let table = wb.load_first_sheet().unwrap();
        assert_eq!(table.sheet, "grades");
        assert_eq!(table.columns, vec!["Name", "Math"]);
        assert_eq!(table.cell(0, 1), &CellValue::Text("18".to_string()));
    }

    #[test]
    fn test_csv_bom_blank_rows_and_headers() {
        let wb = csv_workbook("\u{FEFF}Name,,Math,Math\n,,,\nAli,x,18,19\n");
        let table = wb.load_first_sheet().unwrap();
        assert_eq!(table.columns, vec!["Name", "Unnamed: 1", "Math", "Math.1"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_csv_ragged_rows_widen_header() {
        let wb = csv_workbook("Name,Math\nAli,18,extra\n");
        let table = wb.load_first_sheet().unwrap();
        assert_eq!(table.columns, vec!["Name", "Math", "Unnamed: 2"]);
    }

    #[test]
    fn test_empty_csv_is_sheet_error() {
        let wb = csv_workbook("\n\n");
        let err = wb.load_first_sheet().unwrap_err();
        assert!(matches!(err, ReportError::SheetRead { .. }));
    }

    #[test]
    fn test_missing_sheet_is_sheet_error() {
        let wb = csv_workbook("Name,Math\nAli,18\n");
        match wb.load_sheet("Other") {
            Err(ReportError::SheetRead { sheet, reason }) => {
                assert_eq!(sheet, "Other");
                assert!(reason.contains("grades"));
            }
            other => panic!("expected SheetRead, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_spreadsheet_is_file_error() {
        let result = Workbook::from_bytes(
            "broken.xlsx",
            "broken",
            SourceKind::Spreadsheet,
            b"not a spreadsheet".to_vec(),
        );
        assert!(matches!(result, Err(ReportError::FileRead { .. })));
    }
}
