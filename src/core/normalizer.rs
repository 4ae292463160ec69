//! Score normalization: subject cells to numbers, per-student averages

use crate::types::{round2, CellValue, CleanRow, CleanTable, RawTable, RoleAssignment};
use tracing::{debug, info};

/// Coerce subject cells to numbers and derive each student's average.
///
/// Unparseable subject cells become missing and are left out of the average;
/// they never count as zero. Rows without a single numeric subject score are
/// dropped rather than given an average.
pub fn normalize(table: &RawTable, roles: &RoleAssignment) -> CleanTable {
    let subjects = roles.subjects.clone();
    let mut rows = Vec::with_capacity(table.row_count());
    let mut dropped = 0usize;
    let mut unparseable = 0usize;

    for (source_row, raw) in table.rows().iter().enumerate() {
        let mut cells = raw.clone();
        let mut scores = Vec::with_capacity(subjects.len());

        for &col in &subjects {
            let score = raw[col].as_number();
            if score.is_none() && !raw[col].is_empty() {
                unparseable += 1;
            }
            cells[col] = score.map_or(CellValue::Empty, CellValue::Number);
            scores.push(score);
        }

        match mean_of_present(&scores) {
            Some(mean) => rows.push(CleanRow {
                position: rows.len(),
                source_row,
                cells,
                scores,
                average: round2(mean),
            }),
            None => {
                debug!(row = source_row + 1, "row has no numeric subject scores, dropped");
                dropped += 1;
            }
        }
    }

    info!(
        sheet = %table.sheet,
        kept = rows.len(),
        dropped,
        unparseable,
        "scores normalized"
    );

    CleanTable {
        sheet: table.sheet.clone(),
        columns: table.columns.clone(),
        subjects,
        rows,
    }
}

fn mean_of_present(scores: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = scores.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Classifier;

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn scenario_table() -> RawTable {
        RawTable::new(
            "Grades",
            ["Class", "Name", "FamilyName", "Math", "Science", "Literature"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                vec![text("7/1"), text("Ali"), text("Rezaei"), num(18.0), num(17.0), num(19.0)],
                vec![text("7/1"), text("Sara"), text("Ahmadi"), num(15.0), num(16.0), num(14.0)],
            ],
        )
    }

    fn normalize_default(table: &RawTable) -> CleanTable {
        let roles = Classifier::default().classify_table(table).unwrap();
        normalize(table, &roles)
    }

    #[test]
    fn test_scenario_averages() {
        let clean = normalize_default(&scenario_table());
        assert_eq!(clean.len(), 2);
        assert_eq!(clean.rows[0].average, 18.0);
        assert_eq!(clean.rows[1].average, 15.0);
        assert_eq!(clean.subject_labels(), vec!["Math", "Science", "Literature"]);
    }

    #[test]
    fn test_non_numeric_cell_excluded_not_zero() {
        let table = RawTable::new(
            "Grades",
            vec!["Name".to_string(), "Math".to_string(), "Science".to_string()],
            vec![vec![text("Ali"), text("absent"), num(16.0)]],
        );
        let clean = normalize_default(&table);
        assert_eq!(clean.rows[0].average, 16.0);
        assert_eq!(clean.rows[0].scores, vec![None, Some(16.0)]);
        assert_eq!(clean.rows[0].cells[1], CellValue::Empty);
    }

    #[test]
    fn test_rows_without_scores_dropped() {
        let table = RawTable::new(
            "Grades",
            vec!["Name".to_string(), "Math".to_string(), "Science".to_string()],
            vec![
                vec![text("Ali"), num(18.0), num(20.0)],
                vec![text("Reza"), text("absent"), CellValue::Empty],
                vec![text("Sara"), num(12.0), CellValue::Empty],
            ],
        );
        let clean = normalize_default(&table);
        assert_eq!(clean.len(), 2);
        assert!(clean
            .rows
            .iter()
            .all(|r| r.scores.iter().any(Option::is_some)));
        // Positions are compacted, source rows are not
        assert_eq!(clean.rows[1].position, 1);
        assert_eq!(clean.rows[1].source_row, 2);
        assert_eq!(clean.rows[1].average, 12.0);
    }

    #[test]
    fn test_average_rounded_to_two_decimals() {
        let table = RawTable::new(
            "Grades",
            vec!["Math".to_string(), "Science".to_string(), "Art".to_string()],
            vec![vec![num(18.0), num(17.0), num(17.0)]],
        );
        let clean = normalize_default(&table);
        assert_eq!(clean.rows[0].average, 17.33);
    }

    #[test]
    fn test_text_numbers_are_coerced() {
        let table = RawTable::new(
            "Grades",
            vec!["Math".to_string(), "Physics".to_string()],
            vec![vec![text("۱۸"), text(" 17.5 ")]],
        );
        let clean = normalize_default(&table);
        assert_eq!(clean.rows[0].cells[0], CellValue::Number(18.0));
        assert_eq!(clean.rows[0].average, 17.75);
    }
}
