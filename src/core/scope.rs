//! Row scope: the whole table, or one class

use crate::core::metrics::class_label;
use crate::types::{CleanTable, RoleSlot};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum Scope {
    #[default]
    All,
    Class(String),
}

impl Scope {
    /// `None` or a blank selection means every class
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection.map(str::trim) {
            Some(label) if !label.is_empty() => Scope::Class(label.to_string()),
            _ => Scope::All,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }

    /// Rows of `clean` inside this scope. Row positions are kept, so synthetic
    /// student labels match the unfiltered table.
    pub fn apply(&self, clean: &CleanTable, class: RoleSlot) -> CleanTable {
        match (self, class.column()) {
            (Scope::All, _) => clean.clone(),
            (Scope::Class(_), None) => clean.with_rows(Vec::new()),
            (Scope::Class(selected), Some(col)) => {
                let selected = selected.trim();
                clean.with_rows(
                    clean
                        .rows
                        .iter()
                        .filter(|row| class_label(&row.cells[col]) == selected)
                        .cloned()
                        .collect(),
                )
            }
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("all classes"),
            Scope::Class(label) => write!(f, "class {label}"),
        }
    }
}
