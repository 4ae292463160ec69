//! Grade analysis engine: column roles, score normalization, statistics, ranking

pub mod analyzer;
pub mod classifier;
pub mod metrics;
pub mod normalizer;
pub mod ranking;
pub mod scope;
pub mod vocabulary;

pub use analyzer::{Analysis, AnalysisWarning, Analyzer, Overview};
pub use classifier::{Classifier, LabelVocabularyRule, NumericShapeRule, SubjectRule};
pub use metrics::{group_stats, subject_stats};
pub use normalizer::normalize;
pub use ranking::rank;
pub use scope::Scope;
pub use vocabulary::Vocabulary;
