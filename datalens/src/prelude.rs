//! Prelude for commonly used types and traits in datalens.

pub use crate::analyzers::{
    AnalysisKind, AnalysisOutput, AnalysisRunner, ColumnClassification, ColumnClassifier,
    DatasetProfiler, OutlierDetector, OutlierReport, Summary,
};
pub use crate::config::InsightConfig;
pub use crate::dataset::{Dataset, ValueKind};
pub use crate::error::{InsightError, LoadError, Result};
pub use crate::insights::{Impact, Insight, InsightEngine, InsightRule, NumericInsightRule};
pub use crate::logging::setup::LoggingConfig;
pub use crate::profile::{profile, Profile};
pub use crate::sources::{DataLoader, FileFormat, SourceInput};
