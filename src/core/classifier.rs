//! Column role inference
//!
//! Passes run in a fixed order:
//!
//! 1. Subject rules (an ordered chain; the first rule that selects any column wins).
//!    The default chain is label vocabulary, then numeric shape.
//! 2. Class: vocabulary match on non-subject labels, else the first non-subject
//!    column with non-numeric samples, else the table's first column.
//! 3. Names: family-name and given-name labels, over every column.
//!
//! Subjects are settled before anything else so a score column can never be
//! taken as the grouping column.

use crate::core::vocabulary::{TermMatcher, Vocabulary};
use crate::error::{ReportError, ReportResult};
use crate::types::{ColumnProfile, Detection, RawTable, RoleAssignment, RoleSlot};
use tracing::{debug, info};

/// Number of leading values per column the content checks look at
pub const SAMPLE_SIZE: usize = 10;

/// A subject column must have more than this many numeric samples
pub const NUMERIC_SHAPE_THRESHOLD: usize = 5;

/// One link in the subject-detection chain
pub trait SubjectRule {
    fn name(&self) -> &'static str;

    /// How the columns selected by this rule were detected
    fn detection(&self) -> Detection;

    /// Indices of the columns this rule considers subjects
    fn select(&self, columns: &[ColumnProfile]) -> Vec<usize>;
}

/// Subject if the label contains a subject vocabulary term
pub struct LabelVocabularyRule {
    matcher: TermMatcher,
}

impl LabelVocabularyRule {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        Self {
            matcher: TermMatcher::new(terms),
        }
    }
}

impl SubjectRule for LabelVocabularyRule {
    fn name(&self) -> &'static str {
        "label-vocabulary"
    }

    fn detection(&self) -> Detection {
        Detection::Label
    }

    fn select(&self, columns: &[ColumnProfile]) -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .filter_map(|(idx, col)| {
                self.matcher.find(&col.label).map(|term| {
                    debug!(column = %col.label, term = %term, "subject by label");
                    idx
                })
            })
            .collect()
    }
}

/// Subject if more than [`NUMERIC_SHAPE_THRESHOLD`] of the profiled samples
/// are numeric
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericShapeRule;

impl SubjectRule for NumericShapeRule {
    fn name(&self) -> &'static str {
        "numeric-shape"
    }

    fn detection(&self) -> Detection {
        Detection::Content
    }

    fn select(&self, columns: &[ColumnProfile]) -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.numeric_count() > NUMERIC_SHAPE_THRESHOLD)
            .map(|(idx, col)| {
                debug!(column = %col.label, "subject by numeric shape");
                idx
            })
            .collect()
    }
}

/// Assigns a role to every column of a table
pub struct Classifier {
    subject_rules: Vec<Box<dyn SubjectRule>>,
    class_terms: TermMatcher,
    name_terms: TermMatcher,
    family_markers: TermMatcher,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&Vocabulary::default())
    }
}

impl Classifier {
    /// Default rule chain (label vocabulary, then numeric shape) over `vocabulary`
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let rules: Vec<Box<dyn SubjectRule>> = vec![
            Box::new(LabelVocabularyRule::new(&vocabulary.subjects)),
            Box::new(NumericShapeRule),
        ];
        Self::with_subject_rules(vocabulary, rules)
    }

    /// Custom subject chain; class and name passes still use `vocabulary`
    pub fn with_subject_rules(vocabulary: &Vocabulary, rules: Vec<Box<dyn SubjectRule>>) -> Self {
        Self {
            subject_rules: rules,
            class_terms: TermMatcher::new(&vocabulary.classes),
            name_terms: TermMatcher::new(&vocabulary.names),
            family_markers: TermMatcher::new(&vocabulary.family_markers),
        }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.subject_rules.iter().map(|r| r.name()).collect()
    }

    /// Classify a loaded sheet using its first [`SAMPLE_SIZE`] rows
    pub fn classify_table(&self, table: &RawTable) -> ReportResult<RoleAssignment> {
        self.classify(&table.profiles(SAMPLE_SIZE))
    }

    /// Classify pre-built profiles; each profile's samples should already be
    /// limited to the leading rows the content checks are meant to see
    pub fn classify(&self, columns: &[ColumnProfile]) -> ReportResult<RoleAssignment> {
        let (subjects, subject_rule, subject_detection) = self.detect_subjects(columns)?;
        let class = self.detect_class(columns, &subjects);
        let (given_name, family_name) = self.detect_names(columns);

        let assignment = RoleAssignment {
            labels: columns.iter().map(|c| c.label.clone()).collect(),
            subjects,
            subject_rule: subject_rule.to_string(),
            subject_detection,
            class,
            given_name,
            family_name,
        };

        info!(
            subjects = assignment.subjects.len(),
            rule = subject_rule,
            class = ?assignment.label_of(class),
            given_name = ?assignment.label_of(given_name),
            family_name = ?assignment.label_of(family_name),
            "columns classified"
        );
        Ok(assignment)
    }

    fn detect_subjects(
        &self,
        columns: &[ColumnProfile],
    ) -> ReportResult<(Vec<usize>, &'static str, Detection)> {
        for rule in &self.subject_rules {
            let selected = rule.select(columns);
            if !selected.is_empty() {
                return Ok((selected, rule.name(), rule.detection()));
            }
            debug!(rule = rule.name(), "subject rule selected nothing");
        }
        Err(ReportError::NoSubjectColumns {
            columns: columns.len(),
        })
    }

    fn detect_class(&self, columns: &[ColumnProfile], subjects: &[usize]) -> RoleSlot {
        let candidates = move || {
            columns
                .iter()
                .enumerate()
                .filter(move |(idx, _)| !subjects.contains(idx))
        };

        if let Some((column, col)) = candidates().find(|(_, col)| self.class_terms.matches(&col.label))
        {
            debug!(column = %col.label, "class by label");
            return RoleSlot::Assigned {
                column,
                detection: Detection::Label,
            };
        }

        let content_match = candidates().find(|(_, col)| {
            col.samples
                .iter()
                .take(SAMPLE_SIZE)
                .any(|v| v.as_number().is_none())
        });
        if let Some((column, col)) = content_match {
            debug!(column = %col.label, "class by non-numeric content");
            return RoleSlot::Assigned {
                column,
                detection: Detection::Content,
            };
        }

        if columns.is_empty() {
            return RoleSlot::Unassigned;
        }
        debug!(column = %columns[0].label, "class falls back to first column");
        RoleSlot::Assigned {
            column: 0,
            detection: Detection::FirstColumn,
        }
    }

    /// Scans every column, whatever role it already holds
    fn detect_names(&self, columns: &[ColumnProfile]) -> (RoleSlot, RoleSlot) {
        let mut given = RoleSlot::Unassigned;
        let mut family = RoleSlot::Unassigned;

        for (idx, col) in columns.iter().enumerate() {
            if !self.name_terms.matches(&col.label) {
                continue;
            }
            let slot = RoleSlot::Assigned {
                column: idx,
                detection: Detection::Label,
            };
            if self.family_markers.matches(&col.label) {
                if !family.is_assigned() {
                    debug!(column = %col.label, "family name by label");
                    family = slot;
                }
            } else if !given.is_assigned() {
                debug!(column = %col.label, "given name by label");
                given = slot;
            }
        }

        (given, family)
    }
}
