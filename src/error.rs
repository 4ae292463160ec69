use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be opened as a spreadsheet at all.
    #[error("Cannot read '{path}' as a spreadsheet: {reason}")]
    FileRead { path: String, reason: String },

    /// One sheet could not be loaded. Other sheets of the same document stay usable.
    #[error("Cannot read sheet '{sheet}': {reason}")]
    SheetRead { sheet: String, reason: String },

    /// Neither the subject vocabulary nor the numeric-content fallback found a subject column.
    #[error("No subject columns found among {columns} columns (checked labels and numeric content)")]
    NoSubjectColumns { columns: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Structural errors halt the pipeline for the current input.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ReportError::FileRead { .. }
                | ReportError::SheetRead { .. }
                | ReportError::NoSubjectColumns { .. }
        )
    }
}
