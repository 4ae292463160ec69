//! Vocabulary overrides loaded from YAML
//!
//! ```yaml
//! mode: extend        # or replace
//! subjects: [robotics]
//! classes: [cohort]
//! names: [student]
//! family_markers: [surname]
//! ```

use crate::core::Vocabulary;
use crate::error::{ReportError, ReportResult};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Add the listed terms to the built-in vocabulary
    #[default]
    Extend,
    /// Use only the listed terms
    Replace,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VocabularyFile {
    #[serde(default)]
    pub mode: MergeMode,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub family_markers: Vec<String>,
}

impl VocabularyFile {
    pub fn from_yaml(content: &str) -> ReportResult<Self> {
        let file: VocabularyFile = serde_yaml::from_str(content)?;
        let blank = [
            &file.subjects,
            &file.classes,
            &file.names,
            &file.family_markers,
        ]
        .into_iter()
        .flatten()
        .any(|t| t.trim().is_empty());
        if blank {
            return Err(ReportError::Config(
                "vocabulary terms must not be blank".to_string(),
            ));
        }
        Ok(file)
    }

    /// Resolve against the built-in vocabulary
    pub fn into_vocabulary(self) -> Vocabulary {
        let listed = Vocabulary {
            subjects: self.subjects,
            classes: self.classes,
            names: self.names,
            family_markers: self.family_markers,
        };
        match self.mode {
            MergeMode::Replace => listed,
            MergeMode::Extend => {
                let mut vocabulary = Vocabulary::default();
                vocabulary.extend(&listed);
                vocabulary
            }
        }
    }
}

/// Built-in vocabulary, or the one described by the YAML file at `path`
pub fn load_vocabulary(path: Option<&Path>) -> ReportResult<Vocabulary> {
    let Some(path) = path else {
        return Ok(Vocabulary::default());
    };
    let content = std::fs::read_to_string(path).map_err(|e| {
        ReportError::Config(format!("cannot read '{}': {}", path.display(), e))
    })?;
    let file = VocabularyFile::from_yaml(&content)?;
    debug!(path = %path.display(), mode = ?file.mode, "vocabulary loaded");
    let vocabulary = file.into_vocabulary();
    vocabulary.validate()?;
    Ok(vocabulary)
}
