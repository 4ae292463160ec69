//! Excel report writer

use crate::core::Analysis;
use crate::error::{ReportError, ReportResult};
use crate::types::CellValue;
use crate::writer::{report_tables, ReportTable};
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

/// Writes an [`Analysis`] as a workbook: an overview sheet, one worksheet per
/// derived table, and a column chart of subject means.
pub struct ReportExporter<'a> {
    analysis: &'a Analysis,
    header_format: Format,
}

fn export_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ReportError + '_ {
    move |e| ReportError::Export(format!("Failed to {what}: {e}"))
}

impl<'a> ReportExporter<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            header_format: Format::new().set_bold(),
        }
    }

    /// Export the report to an .xlsx file
    pub fn export(&self, output_path: &Path) -> ReportResult<()> {
        let mut workbook = Workbook::new();

        self.write_overview(workbook.add_worksheet())?;

        for table in report_tables(self.analysis) {
            let worksheet = workbook.add_worksheet();
            self.write_table(worksheet, &table)?;
            if table.name == "Subjects" && !table.rows.is_empty() {
                Self::insert_means_chart(worksheet, &table)?;
            }
        }

        workbook
            .save(output_path)
            .map_err(export_err("save Excel file"))?;

        info!(path = %output_path.display(), "report workbook written");
        Ok(())
    }

    fn write_overview(&self, worksheet: &mut Worksheet) -> ReportResult<()> {
        worksheet
            .set_name("Overview")
            .map_err(export_err("set worksheet name"))?;

        let overview = &self.analysis.overview;
        let number = |v: Option<f64>| v.map_or(CellValue::Empty, CellValue::Number);
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let lines: Vec<(&str, CellValue)> = vec![
            ("Sheet", CellValue::Text(self.analysis.sheet.clone())),
            ("Scope", CellValue::Text(self.analysis.scope.to_string())),
            ("Generated", CellValue::Text(generated)),
            ("Students", CellValue::Number(overview.students as f64)),
            ("Subjects", CellValue::Number(overview.subjects as f64)),
            ("Classes", CellValue::Number(overview.classes as f64)),
            ("Mean average", number(overview.mean_average)),
            ("Highest average", number(overview.highest_average)),
            ("Lowest average", number(overview.lowest_average)),
        ];

        for (row, (label, value)) in lines.iter().enumerate() {
            let row = row as u32;
            worksheet
                .write_string_with_format(row, 0, *label, &self.header_format)
                .map_err(export_err("write overview label"))?;
            Self::write_cell(worksheet, row, 1, value)?;
        }
        worksheet
            .set_column_width(0, 18)
            .map_err(export_err("set column width"))?;
        Ok(())
    }

    fn write_table(&self, worksheet: &mut Worksheet, table: &ReportTable) -> ReportResult<()> {
        worksheet
            .set_name(table.name)
            .map_err(export_err("set worksheet name"))?;

        for (col, header) in table.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, header, &self.header_format)
                .map_err(export_err("write header"))?;
        }

        for (idx, row) in table.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                Self::write_cell(worksheet, idx as u32 + 1, col as u16, cell)?;
            }
        }
        Ok(())
    }

    fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> ReportResult<()> {
        match cell {
            CellValue::Empty => {}
            CellValue::Number(n) => {
                worksheet
                    .write_number(row, col, *n)
                    .map_err(export_err("write number"))?;
            }
            CellValue::Text(s) => {
                worksheet
                    .write_string(row, col, s)
                    .map_err(export_err("write text"))?;
            }
        }
        Ok(())
    }

    /// Subject labels sit in column A and means in column B of the Subjects sheet
    fn insert_means_chart(worksheet: &mut Worksheet, table: &ReportTable) -> ReportResult<()> {
        let last = table.rows.len() as u32;
        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_name("Mean")
            .set_categories((table.name, 1, 0, last, 0))
            .set_values((table.name, 1, 1, last, 1));
        chart.title().set_name("Mean score by subject");
        chart.legend().set_hidden();

        worksheet
            .insert_chart(1, table.headers.len() as u16 + 1, &chart)
            .map_err(export_err("insert chart"))?;
        Ok(())
    }
}
