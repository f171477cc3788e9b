//! # datalens - Tabular Data Profiling for Rust
//!
//! datalens loads a CSV, Excel or JSON file into an Arrow table, profiles its
//! structure and quality, and turns the profile into short human-readable
//! insights. Heavier analyses (descriptive statistics, correlation) run as
//! SQL through DataFusion against the same in-memory table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use datalens::prelude::*;
//!
//! # fn example() -> datalens::Result<()> {
//! let config = InsightConfig::default();
//! let profile = datalens::profile(SourceInput::path("sales.csv"), &config)?;
//!
//! println!(
//!     "{} rows, {} columns, {:.1}% missing",
//!     profile.summary.row_count,
//!     profile.summary.column_count,
//!     profile.summary.missing_percentage()
//! );
//! for insight in &profile.insights {
//!     println!("{} {} ({})", insight.icon, insight.title, insight.impact);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## On-demand analyses
//!
//! ```rust,no_run
//! use datalens::prelude::*;
//!
//! # async fn example() -> datalens::Result<()> {
//! let config = InsightConfig::default();
//! let dataset = DataLoader::new(config.clone()).load(SourceInput::path("sales.csv"))?;
//!
//! let runner = AnalysisRunner::new(&config)?;
//! match runner.run(&dataset, AnalysisKind::OutlierDetection).await? {
//!     AnalysisOutput::OutlierDetection(report) => {
//!         println!("{} outlier rows at {:?}", report.len(), report.row_indices);
//!     }
//!     other => println!("{:?}", other.kind()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`sources`]: file loading with extension dispatch and a CSV fallback
//! - [`dataset`]: the immutable in-memory table
//! - [`analyzers`]: classification, summary, outliers, statistics, correlation
//! - [`insights`]: ordered rule table producing [`insights::Insight`]s
//! - [`config`], [`error`], [`logging`], [`security`]: ambient concerns
//!
//! ## Logging
//!
//! Library code emits `tracing` events and spans only. Install a subscriber
//! with [`logging::setup::init_logging`] or bring your own.

pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod insights;
pub mod logging;
pub mod prelude;
pub mod profile;
pub mod security;
pub mod sources;

pub use error::{InsightError, Result};
pub use profile::{profile, Profile};

#[cfg(test)]
pub(crate) mod test_fixtures;
