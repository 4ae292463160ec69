//! Descriptive statistics over a clean table
//!
//! Standard deviation is the sample deviation (n - 1 denominator) and is
//! reported as [`StdDev::NotComputable`] below two values.

use crate::types::{CellValue, CleanTable, GroupStat, RoleSlot, StdDev, SubjectStat};
use std::cmp::Ordering;
use tracing::debug;

/// Label used for rows whose class cell is blank
pub const BLANK_CLASS_LABEL: &str = "(blank)";

/// Summary of one series of values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: StdDev,
}

/// `None` for an empty series
pub fn describe(values: &[f64]) -> Option<Describe> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(Describe {
        count,
        mean,
        min,
        max,
        std_dev: sample_std_dev(values, mean),
    })
}

fn sample_std_dev(values: &[f64], mean: f64) -> StdDev {
    if values.len() < 2 {
        return StdDev::NotComputable;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    StdDev::Sample((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Median of a series; `None` when empty
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn by_mean_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Per-subject statistics, highest mean first.
///
/// Subjects with no values in the table are left out. The sort is stable, so
/// subjects with equal means keep their column order.
pub fn subject_stats(clean: &CleanTable) -> Vec<SubjectStat> {
    let mut stats: Vec<SubjectStat> = clean
        .subject_labels()
        .into_iter()
        .enumerate()
        .filter_map(|(slot, label)| {
            let values: Vec<f64> = clean.rows.iter().filter_map(|r| r.scores[slot]).collect();
            let Some(d) = describe(&values) else {
                debug!(subject = label, "no scores in scope, skipped");
                return None;
            };
            Some(SubjectStat {
                label: label.to_string(),
                mean: d.mean,
                max: d.max,
                min: d.min,
                std_dev: d.std_dev,
                count: d.count,
            })
        })
        .collect();

    stats.sort_by(|a, b| by_mean_desc(a.mean, b.mean));
    stats
}

/// Normalized class label of a cell
pub fn class_label(cell: &CellValue) -> String {
    let label = cell.as_label();
    if label.is_empty() {
        BLANK_CLASS_LABEL.to_string()
    } else {
        label
    }
}

/// Distinct class labels in order of first appearance
pub fn class_labels(clean: &CleanTable, class: RoleSlot) -> Vec<String> {
    let Some(col) = class.column() else {
        return Vec::new();
    };
    let mut labels: Vec<String> = Vec::new();
    for row in &clean.rows {
        let label = class_label(&row.cells[col]);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Per-class statistics of student averages, highest mean first.
///
/// Returns an empty sequence when the table holds fewer than two classes; a
/// single-row comparison is not shown.
pub fn group_stats(clean: &CleanTable, class: RoleSlot) -> Vec<GroupStat> {
    let Some(col) = class.column() else {
        return Vec::new();
    };

    let mut partitions: Vec<(String, Vec<f64>)> = Vec::new();
    for row in &clean.rows {
        let label = class_label(&row.cells[col]);
        match partitions.iter_mut().find(|(l, _)| *l == label) {
            Some((_, values)) => values.push(row.average),
            None => partitions.push((label, vec![row.average])),
        }
    }

    if partitions.len() < 2 {
        debug!(classes = partitions.len(), "fewer than two classes, no comparison");
        return Vec::new();
    }

    let mut stats: Vec<GroupStat> = partitions
        .into_iter()
        .filter_map(|(class_label, values)| {
            let d = describe(&values)?;
            Some(GroupStat {
                class_label,
                count: d.count,
                mean: d.mean,
                std_dev: d.std_dev,
                min: d.min,
                median: median(&values)?,
                max: d.max,
            })
        })
        .collect();

    stats.sort_by(|a, b| by_mean_desc(a.mean, b.mean));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CleanRow, Detection};

    fn table(rows: &[(&str, Option<f64>, Option<f64>)]) -> CleanTable {
        CleanTable {
            sheet: "Grades".to_string(),
            columns: vec!["Class".to_string(), "Math".to_string(), "Art".to_string()],
            subjects: vec![1, 2],
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, (class, math, art))| {
                    let present: Vec<f64> = [*math, *art].into_iter().flatten().collect();
                    CleanRow {
                        position: i,
                        source_row: i,
                        cells: vec![
                            CellValue::text(*class),
                            math.map_or(CellValue::Empty, CellValue::Number),
                            art.map_or(CellValue::Empty, CellValue::Number),
                        ],
                        scores: vec![*math, *art],
                        average: present.iter().sum::<f64>() / present.len() as f64,
                    }
                })
                .collect(),
        }
    }

    fn class_slot() -> RoleSlot {
        RoleSlot::Assigned {
            column: 0,
            detection: Detection::Label,
        }
    }

    #[test]
    fn test_describe_sample_std_dev() {
        let d = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(d.count, 8);
        assert_eq!(d.mean, 5.0);
        assert_eq!(d.min, 2.0);
        assert_eq!(d.max, 9.0);
        let sd = d.std_dev.value().unwrap();
        assert!((sd - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn test_describe_single_value_not_computable() {
        let d = describe(&[17.0]).unwrap();
        assert_eq!(d.std_dev, StdDev::NotComputable);
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_subject_stats_sorted_by_mean() {
        let clean = table(&[
            ("A", Some(10.0), Some(20.0)),
            ("A", Some(12.0), Some(18.0)),
        ]);
        let stats = subject_stats(&clean);
        assert_eq!(stats[0].label, "Art");
        assert_eq!(stats[0].mean, 19.0);
        assert_eq!(stats[1].label, "Math");
        assert_eq!(stats[1].min, 10.0);
        assert_eq!(stats[1].max, 12.0);
        assert_eq!(stats[1].count, 2);
    }

    #[test]
    fn test_subject_stats_stable_on_ties() {
        let clean = table(&[("A", Some(15.0), Some(15.0))]);
        let stats = subject_stats(&clean);
        assert_eq!(stats[0].label, "Math");
        assert_eq!(stats[1].label, "Art");
    }

    #[test]
    fn test_subject_stats_single_value_std_not_computable() {
        let clean = table(&[("A", Some(15.0), None), ("B", Some(11.0), Some(9.0))]);
        let stats = subject_stats(&clean);
        let art = stats.iter().find(|s| s.label == "Art").unwrap();
        assert_eq!(art.count, 1);
        assert_eq!(art.std_dev, StdDev::NotComputable);
        let math = stats.iter().find(|s| s.label == "Math").unwrap();
        assert!(math.std_dev.is_computable());
    }

    #[test]
    fn test_subject_stats_empty_table() {
        let clean = table(&[]);
        assert!(subject_stats(&clean).is_empty());
        assert!(group_stats(&clean, class_slot()).is_empty());
    }

    #[test]
    fn test_subject_without_values_skipped() {
        let clean = table(&[("A", Some(15.0), None)]);
        let stats = subject_stats(&clean);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].label, "Math");
    }

    #[test]
    fn test_group_stats_single_class_empty() {
        let clean = table(&[("7/1", Some(18.0), None), ("7/1", Some(15.0), None)]);
        assert!(group_stats(&clean, class_slot()).is_empty());
    }

    #[test]
    fn test_group_stats_partitions_and_order() {
        let clean = table(&[
            ("7/1", Some(12.0), None),
            (" 7/2 ", Some(18.0), None),
            ("7/1", Some(14.0), None),
            ("7/2", Some(16.0), None),
            ("7/3", Some(13.0), None),
        ]);
        let stats = group_stats(&clean, class_slot());
        let labels: Vec<&str> = stats.iter().map(|s| s.class_label.as_str()).collect();
        // 7/1 and 7/3 tie at 13.0; encounter order decides
        assert_eq!(labels, vec!["7/2", "7/1", "7/3"]);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].median, 17.0);
        assert_eq!(stats[2].std_dev, StdDev::NotComputable);
    }

    #[test]
    fn test_group_stats_unassigned_class() {
        let clean = table(&[("A", Some(1.0), None), ("B", Some(2.0), None)]);
        assert!(group_stats(&clean, RoleSlot::Unassigned).is_empty());
    }

    #[test]
    fn test_class_labels_encounter_order_and_blank() {
        let clean = table(&[
            ("B", Some(1.0), None),
            ("A", Some(2.0), None),
            ("", Some(3.0), None),
            ("B", Some(4.0), None),
        ]);
        assert_eq!(
            class_labels(&clean, class_slot()),
            vec!["B".to_string(), "A".to_string(), BLANK_CLASS_LABEL.to_string()]
        );
    }
}
