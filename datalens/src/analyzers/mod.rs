//! Analyses over a loaded [`Dataset`](crate::dataset::Dataset).
//!
//! ## Available Analyzers
//!
//! - **Column classifier** (`classifier`): numeric / categorical / datetime /
//!   unclassified buckets
//! - **Dataset profiler** (`summary`): shape, memory, missing values,
//!   duplicates, per-column details
//! - **Outlier detector** (`outliers`): z-score over all numeric columns
//! - **Descriptive statistics** (`descriptive`): count, moments, quartiles
//! - **Correlation** (`correlation`): pairwise Pearson matrix
//! - **Runner** (`runner`): one entry point per user-selected analysis
//!
//! The classifier, profiler and outlier detector are plain synchronous
//! functions over Arrow arrays. Descriptive statistics and correlation are
//! SQL queries against the dataset registered with DataFusion as `data`, and
//! are therefore `async`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use datalens::analyzers::{DatasetProfiler, OutlierDetector};
//! use datalens::sources::{DataLoader, SourceInput};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = DataLoader::default().load(SourceInput::path("customers.csv"))?;
//!
//! let summary = DatasetProfiler::default().summarize(&dataset)?;
//! println!("{} rows, {:.1}% missing", summary.row_count, summary.missing_percentage());
//!
//! let outliers = OutlierDetector::new(3.0)?.detect(&dataset)?;
//! println!("{} outlier rows", outliers.len());
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod context;
pub mod correlation;
pub mod descriptive;
pub mod errors;
pub mod outliers;
pub mod runner;
pub(crate) mod stats;
pub mod summary;

pub use classifier::{ColumnCategory, ColumnClassification, ColumnClassifier};
pub use context::AnalysisContext;
pub use correlation::{
    correlate, CorrelationMatrix, CorrelationOutcome, CorrelationPair,
    INSUFFICIENT_COLUMNS_MESSAGE,
};
pub use descriptive::{describe, ColumnStatistics};
pub use errors::{AnalysisError, AnalysisResult};
pub use outliers::{OutlierDetector, OutlierReport};
pub use runner::{AnalysisKind, AnalysisOutput, AnalysisRunner, ProgressCallback};
pub use stats::missing_count;
pub use summary::{
    ColumnDetail, DatasetProfiler, DatasetProfilerBuilder, MissingValueEntry, MissingValueReport,
    Summary,
};
