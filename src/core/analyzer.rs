//! One analysis session over a loaded sheet
//!
//! Column roles and the clean table are computed once when the session is
//! created. Every scope change recomputes the derived tables from those
//! immutable snapshots.

use crate::core::classifier::Classifier;
use crate::core::metrics::{self, describe};
use crate::core::normalizer::normalize;
use crate::core::ranking::rank;
use crate::core::scope::Scope;
use crate::error::ReportResult;
use crate::types::{CleanTable, GroupStat, RankedRow, RawTable, RoleAssignment, SubjectStat};
use serde::Serialize;
use tracing::{info, warn};

/// Non-fatal conditions the caller should surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// The selected scope has no students after normalization
    EmptyScope { scope: Scope },
    /// Rows without any numeric subject score were left out
    RowsDropped { count: usize },
}

/// Headline numbers for the active scope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub students: usize,
    pub subjects: usize,
    pub classes: usize,
    pub mean_average: Option<f64>,
    pub highest_average: Option<f64>,
    pub lowest_average: Option<f64>,
}

/// Everything derived for one scope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub sheet: String,
    pub scope: Scope,
    pub overview: Overview,
    pub table: CleanTable,
    pub subject_stats: Vec<SubjectStat>,
    /// `None` when a class comparison does not apply to this scope
    pub group_stats: Option<Vec<GroupStat>>,
    pub ranking: Vec<RankedRow>,
    pub warnings: Vec<AnalysisWarning>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

pub struct Analyzer {
    raw: RawTable,
    roles: RoleAssignment,
    clean: CleanTable,
}

impl Analyzer {
    /// Classify and normalize `raw`. Fails when no subject column exists.
    pub fn new(raw: RawTable, classifier: &Classifier) -> ReportResult<Self> {
        let roles = classifier.classify_table(&raw)?;
        let clean = normalize(&raw, &roles);
        Ok(Self { raw, roles, clean })
    }

    pub fn raw(&self) -> &RawTable {
        &self.raw
    }

    pub fn roles(&self) -> &RoleAssignment {
        &self.roles
    }

    pub fn clean(&self) -> &CleanTable {
        &self.clean
    }

    /// Distinct classes of the full table, for scope selection
    pub fn class_labels(&self) -> Vec<String> {
        metrics::class_labels(&self.clean, self.roles.class)
    }

    pub fn analyze(&self, scope: &Scope) -> Analysis {
        let table = scope.apply(&self.clean, self.roles.class);
        let mut warnings = Vec::new();

        let dropped = self.raw.row_count() - self.clean.len();
        if dropped > 0 {
            warnings.push(AnalysisWarning::RowsDropped { count: dropped });
        }
        if table.is_empty() {
            warn!(scope = %scope, "no students in scope");
            warnings.push(AnalysisWarning::EmptyScope {
                scope: scope.clone(),
            });
        }

        let subject_stats = metrics::subject_stats(&table);
        let group_stats = if scope.is_all() && self.class_labels().len() >= 2 {
            Some(metrics::group_stats(&table, self.roles.class))
        } else {
            None
        };
        let ranking = rank(&table, self.roles.name_roles());
        let overview = self.overview(&table);

        info!(
            scope = %scope,
            students = overview.students,
            subjects = subject_stats.len(),
            "analysis complete"
        );

        Analysis {
            sheet: self.raw.sheet.clone(),
            scope: scope.clone(),
            overview,
            table,
            subject_stats,
            group_stats,
            ranking,
            warnings,
        }
    }

    fn overview(&self, table: &CleanTable) -> Overview {
        let summary = describe(&table.averages());
        Overview {
            students: table.len(),
            subjects: table.subjects.len(),
            classes: metrics::class_labels(table, self.roles.class).len(),
            mean_average: summary.map(|d| d.mean),
            highest_average: summary.map(|d| d.max),
            lowest_average: summary.map(|d| d.min),
        }
    }
}
