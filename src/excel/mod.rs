//! Spreadsheet I/O
//!
//! - Import: xlsx/xls/ods/CSV document → `RawTable` per sheet
//! - Export: `Analysis` → report workbook (.xlsx)

mod exporter;
mod importer;

pub use exporter::ReportExporter;
pub use importer::{SourceKind, Workbook};
