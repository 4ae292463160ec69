//! ReportCard - grade spreadsheet analysis
//!
//! This library reads a sheet of student scores, decides which columns hold
//! subject scores, class labels and student names, and derives per-subject and
//! per-class statistics plus a ranking by average.
//!
//! # Features
//!
//! - Column role detection from English and Persian headers, with a
//!   numeric-content fallback when no header is recognised
//! - Score normalization (blank and non-numeric cells never count)
//! - Subject statistics, class comparison, stable ranking
//! - Class scopes over one immutable clean table
//! - CSV (UTF-8 with BOM) and Excel report export
//!
//! # Example
//!
//! ```no_run
//! use reportcard::core::{Analyzer, Classifier, Scope};
//! use reportcard::excel::Workbook;
//!
//! let workbook = Workbook::open("grades.xlsx")?;
//! let raw = workbook.load_first_sheet()?;
//!
//! let analyzer = Analyzer::new(raw, &Classifier::default())?;
//! let analysis = analyzer.analyze(&Scope::All);
//!
//! for stat in &analysis.subject_stats {
//!     println!("{}: {:.2}", stat.label, stat.mean);
//! }
//! # Ok::<(), reportcard::error::ReportError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{ReportError, ReportResult};
pub use types::{CellValue, CleanTable, GroupStat, RankedRow, RawTable, RoleAssignment, SubjectStat};
