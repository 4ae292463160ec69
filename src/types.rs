use serde::{Serialize, Serializer};
use std::fmt;

/// Format a number for display, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Round to two decimal places (the precision of every reported average)
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Parse a cell's text as a number.
///
/// Accepts Persian (U+06F0..) and Arabic-Indic (U+0660..) digits and the Arabic
/// decimal separator, which are common in report cards typed on Persian keyboards.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let ascii: String = trimmed
        .chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{066B}' => '.',
            _ => c,
        })
        .collect();

    ascii.parse::<f64>().ok().filter(|v| v.is_finite())
}

//==============================================================================
// Raw Spreadsheet Data
//==============================================================================

/// A raw cell as read from the sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Build a text cell, mapping blank strings to `Empty`
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric reading of the cell; `None` for blanks and anything unparseable
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) | CellValue::Empty => None,
            CellValue::Text(s) => parse_number(s),
        }
    }

    /// Trimmed string form used for labels (class names, student names)
    pub fn as_label(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One sheet of a workbook: a header row of unique labels followed by data rows
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub sheet: String,
    pub columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Every row is padded (or truncated) to the header width.
    pub fn new(sheet: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            sheet: sheet.into(),
            columns,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Label plus the first `sample_size` values of every column
    pub fn profiles(&self, sample_size: usize) -> Vec<ColumnProfile> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col, label)| ColumnProfile {
                label: label.clone(),
                samples: self
                    .rows
                    .iter()
                    .take(sample_size)
                    .map(|row| row[col].clone())
                    .collect(),
            })
            .collect()
    }
}

/// What the classifier sees of a column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub label: String,
    pub samples: Vec<CellValue>,
}

impl ColumnProfile {
    pub fn new(label: impl Into<String>, samples: Vec<CellValue>) -> Self {
        Self {
            label: label.into(),
            samples,
        }
    }

    pub fn numeric_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|v| v.as_number().is_some())
            .count()
    }
}

//==============================================================================
// Column Roles
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnRole {
    Subject,
    Class,
    GivenName,
    FamilyName,
    Unclassified,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnRole::Subject => "Subject",
            ColumnRole::Class => "Class",
            ColumnRole::GivenName => "GivenName",
            ColumnRole::FamilyName => "FamilyName",
            ColumnRole::Unclassified => "Unclassified",
        };
        f.write_str(name)
    }
}

/// Which branch of the classifier produced an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    /// The label matched a vocabulary term
    Label,
    /// The label was unknown; the column's sample values decided
    Content,
    /// Nothing else qualified; the table's first column was taken
    FirstColumn,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Detection::Label => "label",
            Detection::Content => "content",
            Detection::FirstColumn => "first column",
        };
        f.write_str(name)
    }
}

/// A single-valued role: either one column holds it, or nobody does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoleSlot {
    Unassigned,
    Assigned { column: usize, detection: Detection },
}

impl RoleSlot {
    pub fn column(&self) -> Option<usize> {
        match self {
            RoleSlot::Unassigned => None,
            RoleSlot::Assigned { column, .. } => Some(*column),
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, RoleSlot::Assigned { .. })
    }
}

/// The name slots the ranking engine needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRoles {
    pub given: RoleSlot,
    pub family: RoleSlot,
}

/// Result of classifying one table's columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleAssignment {
    pub labels: Vec<String>,
    pub subjects: Vec<usize>,
    /// Name of the subject rule that produced `subjects`
    pub subject_rule: String,
    pub subject_detection: Detection,
    pub class: RoleSlot,
    pub given_name: RoleSlot,
    pub family_name: RoleSlot,
}

impl RoleAssignment {
    /// Primary role of a column. Subject outranks the single-valued slots, so a
    /// first-column class fallback landing on a subject still reports Subject.
    pub fn role_of(&self, column: usize) -> ColumnRole {
        if self.subjects.contains(&column) {
            ColumnRole::Subject
        } else if self.class.column() == Some(column) {
            ColumnRole::Class
        } else if self.family_name.column() == Some(column) {
            ColumnRole::FamilyName
        } else if self.given_name.column() == Some(column) {
            ColumnRole::GivenName
        } else {
            ColumnRole::Unclassified
        }
    }

    /// Label → role for every column, in column order
    pub fn roles(&self) -> Vec<(String, ColumnRole)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), self.role_of(idx)))
            .collect()
    }

    pub fn subject_labels(&self) -> Vec<&str> {
        self.subjects
            .iter()
            .map(|&idx| self.labels[idx].as_str())
            .collect()
    }

    pub fn label_of(&self, slot: RoleSlot) -> Option<&str> {
        slot.column().map(|idx| self.labels[idx].as_str())
    }

    pub fn name_roles(&self) -> NameRoles {
        NameRoles {
            given: self.given_name,
            family: self.family_name,
        }
    }
}

//==============================================================================
// Derived Tables
//==============================================================================

/// A student row after score normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRow {
    /// 0-based index in the full, unfiltered clean table
    pub position: usize,
    /// 0-based data-row index in the source sheet
    pub source_row: usize,
    /// Original cells; subject cells replaced by their numeric reading
    pub cells: Vec<CellValue>,
    /// One entry per subject column, `None` where the cell was missing or unparseable
    pub scores: Vec<Option<f64>>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanTable {
    pub sheet: String,
    pub columns: Vec<String>,
    /// Column indices of the subject columns, in column order
    pub subjects: Vec<usize>,
    pub rows: Vec<CleanRow>,
}

impl CleanTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn subject_labels(&self) -> Vec<&str> {
        self.subjects
            .iter()
            .map(|&idx| self.columns[idx].as_str())
            .collect()
    }

    /// Same columns, different rows
    pub fn with_rows(&self, rows: Vec<CleanRow>) -> Self {
        Self {
            sheet: self.sheet.clone(),
            columns: self.columns.clone(),
            subjects: self.subjects.clone(),
            rows,
        }
    }

    pub fn averages(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.average).collect()
    }
}

/// Sample standard deviation, or an explicit marker when fewer than two values exist
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StdDev {
    Sample(f64),
    NotComputable,
}

impl StdDev {
    pub fn value(&self) -> Option<f64> {
        match self {
            StdDev::Sample(v) => Some(*v),
            StdDev::NotComputable => None,
        }
    }

    pub fn is_computable(&self) -> bool {
        matches!(self, StdDev::Sample(_))
    }
}

impl fmt::Display for StdDev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StdDev::Sample(v) => write!(f, "{v:.2}"),
            StdDev::NotComputable => f.write_str("n/a"),
        }
    }
}

impl Serialize for StdDev {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StdDev::Sample(v) => serializer.serialize_some(v),
            StdDev::NotComputable => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStat {
    pub label: String,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std_dev: StdDev,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub class_label: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: StdDev,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRow {
    pub rank: usize,
    pub display_name: String,
    pub row: CleanRow,
}
