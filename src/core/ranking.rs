//! Student ranking by average score

use crate::types::{CleanRow, CleanTable, NameRoles, RankedRow};
use std::cmp::Ordering;

/// Rank every row by average, highest first.
///
/// Rank is the 1-based position after a stable sort: equal averages get
/// consecutive ranks in input order, never a shared rank.
pub fn rank(clean: &CleanTable, names: NameRoles) -> Vec<RankedRow> {
    let mut rows: Vec<&CleanRow> = clean.rows.iter().collect();
    rows.sort_by(|a, b| b.average.partial_cmp(&a.average).unwrap_or(Ordering::Equal));

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| RankedRow {
            rank: idx + 1,
            display_name: display_name(row, names),
            row: row.clone(),
        })
        .collect()
}

/// "Given Family", then "Given", then a synthetic "Student N" keyed on the
/// row's position in the unfiltered table so it does not change with scope.
pub fn display_name(row: &CleanRow, names: NameRoles) -> String {
    let cell = |col: Option<usize>| {
        col.map(|c| row.cells[c].as_label())
            .filter(|s| !s.is_empty())
    };

    match (cell(names.given.column()), cell(names.family.column())) {
        (Some(given), Some(family)) => format!("{given} {family}"),
        (Some(given), None) => given,
        _ => format!("Student {}", row.position + 1),
    }
}
