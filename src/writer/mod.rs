//! Tabular report output
//!
//! Every derived table is first laid out as a [`ReportTable`] (header plus
//! cells), which the CSV writer here and the xlsx report both consume.

use crate::core::Analysis;
use crate::error::{ReportError, ReportResult};
use crate::types::{CellValue, CleanTable, GroupStat, RankedRow, StdDev, SubjectStat};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Column appended to every student row
pub const AVERAGE_COLUMN: &str = "StudentAverage";

/// Written first so spreadsheet programs detect UTF-8 (Persian labels)
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exportable table
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    /// Worksheet name in the xlsx report
    pub name: &'static str,
    /// File name in a CSV export directory
    pub file_name: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

fn headers(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| (*s).to_string()).collect()
}

fn std_dev_cell(std_dev: StdDev) -> CellValue {
    std_dev.value().map_or(CellValue::Empty, CellValue::Number)
}

/// Clean table: original columns plus the student average
pub fn students_table(clean: &CleanTable) -> ReportTable {
    let mut header = clean.columns.clone();
    header.push(AVERAGE_COLUMN.to_string());

    let rows = clean
        .rows
        .iter()
        .map(|row| {
            let mut cells = row.cells.clone();
            cells.push(CellValue::Number(row.average));
            cells
        })
        .collect();

    ReportTable {
        name: "Students",
        file_name: "students.csv",
        headers: header,
        rows,
    }
}

pub fn subjects_table(stats: &[SubjectStat]) -> ReportTable {
    ReportTable {
        name: "Subjects",
        file_name: "subjects.csv",
        headers: headers(&["label", "mean", "max", "min", "stdDev", "count"]),
        rows: stats
            .iter()
            .map(|s| {
                vec![
                    CellValue::Text(s.label.clone()),
                    CellValue::Number(s.mean),
                    CellValue::Number(s.max),
                    CellValue::Number(s.min),
                    std_dev_cell(s.std_dev),
                    CellValue::Number(s.count as f64),
                ]
            })
            .collect(),
    }
}

pub fn classes_table(stats: &[GroupStat]) -> ReportTable {
    ReportTable {
        name: "Classes",
        file_name: "classes.csv",
        headers: headers(&["classLabel", "count", "mean", "stdDev", "min", "median", "max"]),
        rows: stats
            .iter()
            .map(|g| {
                vec![
                    CellValue::Text(g.class_label.clone()),
                    CellValue::Number(g.count as f64),
                    CellValue::Number(g.mean),
                    std_dev_cell(g.std_dev),
                    CellValue::Number(g.min),
                    CellValue::Number(g.median),
                    CellValue::Number(g.max),
                ]
            })
            .collect(),
    }
}

/// Rank, display name and average, then the student's original columns
pub fn ranking_table(ranking: &[RankedRow], columns: &[String]) -> ReportTable {
    let mut header = headers(&["rank", "displayName", AVERAGE_COLUMN]);
    header.extend(columns.iter().cloned());

    ReportTable {
        name: "Ranking",
        file_name: "ranking.csv",
        headers: header,
        rows: ranking
            .iter()
            .map(|r| {
                let mut cells = vec![
                    CellValue::Number(r.rank as f64),
                    CellValue::Text(r.display_name.clone()),
                    CellValue::Number(r.row.average),
                ];
                cells.extend(r.row.cells.iter().cloned());
                cells
            })
            .collect(),
    }
}

/// All tables of an analysis. The class table is present only when a class
/// comparison applies to the analysed scope.
pub fn report_tables(analysis: &Analysis) -> Vec<ReportTable> {
    let mut tables = vec![
        students_table(&analysis.table),
        subjects_table(&analysis.subject_stats),
    ];
    if let Some(groups) = &analysis.group_stats {
        tables.push(classes_table(groups));
    }
    tables.push(ranking_table(&analysis.ranking, &analysis.table.columns));
    tables
}

/// Write `table` as CSV, preceded by a UTF-8 byte-order mark
pub fn write_csv<W: Write>(table: &ReportTable, mut out: W) -> ReportResult<()> {
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new().from_writer(out);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &ReportTable) -> ReportResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ReportError::Export(format!("CSV is not UTF-8: {e}")))
}

/// Write one CSV file per table into `dir`, creating it if needed
pub fn export_csv_dir(analysis: &Analysis, dir: &Path) -> ReportResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for table in report_tables(analysis) {
        let path = dir.join(table.file_name);
        let file = fs::File::create(&path)?;
        write_csv(&table, std::io::BufWriter::new(file))?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "CSV export written");
    Ok(written)
}
