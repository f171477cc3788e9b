//! One entry point per user-selectable analysis.
//!
//! Every run is independent: it reads the dataset, returns its own result and
//! leaves nothing behind. A failure is logged and handed back to the caller,
//! which can pick another analysis without reloading.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::classifier::ColumnClassification;
use super::context::AnalysisContext;
use super::correlation::{correlate, CorrelationOutcome, CorrelationPair};
use super::descriptive::{describe, ColumnStatistics};
use super::errors::AnalysisResult;
use super::outliers::{OutlierDetector, OutlierReport};
use super::summary::{ColumnDetail, DatasetProfiler, MissingValueReport};
use crate::config::{InsightConfig, DEFAULT_STRONG_CORRELATION_THRESHOLD};
use crate::dataset::{Dataset, ValueKind};

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// The analyses a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisKind {
    StatisticalSummary,
    OutlierDetection,
    DataTypes,
    MissingValues,
    Correlation,
}

impl AnalysisKind {
    /// All analyses in menu order.
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::StatisticalSummary,
        AnalysisKind::OutlierDetection,
        AnalysisKind::DataTypes,
        AnalysisKind::MissingValues,
        AnalysisKind::Correlation,
    ];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::StatisticalSummary => "Statistical Summary",
            AnalysisKind::OutlierDetection => "Outlier Detection",
            AnalysisKind::DataTypes => "Data Types",
            AnalysisKind::MissingValues => "Missing Values",
            AnalysisKind::Correlation => "Correlation Analysis",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a single analysis run.
#[derive(Debug, Clone)]
pub enum AnalysisOutput {
    StatisticalSummary(Vec<ColumnStatistics>),
    OutlierDetection(OutlierReport),
    DataTypes {
        classification: ColumnClassification,
        details: Vec<ColumnDetail>,
    },
    MissingValues(MissingValueReport),
    Correlation(CorrelationOutcome),
}

impl AnalysisOutput {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutput::StatisticalSummary(_) => AnalysisKind::StatisticalSummary,
            AnalysisOutput::OutlierDetection(_) => AnalysisKind::OutlierDetection,
            AnalysisOutput::DataTypes { .. } => AnalysisKind::DataTypes,
            AnalysisOutput::MissingValues(_) => AnalysisKind::MissingValues,
            AnalysisOutput::Correlation(_) => AnalysisKind::Correlation,
        }
    }
}

/// Runs analyses against a dataset on request.
///
/// # Example
///
/// ```rust,no_run
/// use datalens::analyzers::{AnalysisKind, AnalysisRunner};
/// use datalens::config::InsightConfig;
/// use datalens::sources::{DataLoader, SourceInput};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = InsightConfig::default();
/// let dataset = DataLoader::new(config.clone()).load(SourceInput::path("sales.csv"))?;
///
/// let runner = AnalysisRunner::new(&config)?
///     .on_progress(|progress| println!("{:.0}%", progress * 100.0));
/// let output = runner.run(&dataset, AnalysisKind::Correlation).await?;
/// println!("{:?}", output.kind());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AnalysisRunner {
    profiler: DatasetProfiler,
    detector: OutlierDetector,
    strong_correlation_threshold: f64,
    on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for AnalysisRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRunner")
            .field("profiler", &self.profiler)
            .field("detector", &self.detector)
            .field(
                "strong_correlation_threshold",
                &self.strong_correlation_threshold,
            )
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        Self {
            profiler: DatasetProfiler::default(),
            detector: OutlierDetector::default(),
            strong_correlation_threshold: DEFAULT_STRONG_CORRELATION_THRESHOLD,
            on_progress: None,
        }
    }
}

impl AnalysisRunner {
    /// Creates a runner with the limits of `config`.
    pub fn new(config: &InsightConfig) -> AnalysisResult<Self> {
        Ok(Self {
            profiler: DatasetProfiler::from_config(config),
            detector: OutlierDetector::from_config(config)?,
            strong_correlation_threshold: config.strong_correlation_threshold,
            on_progress: None,
        })
    }

    /// Pairs of a correlation result above the configured strength.
    pub fn strong_pairs(&self, outcome: &CorrelationOutcome) -> Vec<CorrelationPair> {
        outcome
            .matrix()
            .map(|matrix| matrix.strong_pairs(self.strong_correlation_threshold))
            .unwrap_or_default()
    }

    /// Sets a progress callback, called with values in `0.0..=1.0` while
    /// [`run_all`](Self::run_all) works through its list.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Runs one analysis.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name()))]
    pub async fn run(&self, dataset: &Dataset, kind: AnalysisKind) -> AnalysisResult<AnalysisOutput> {
        let result = self.execute(dataset, kind).await;
        match &result {
            Ok(_) => info!(analysis = %kind, "Analysis completed"),
            Err(e) => warn!(analysis = %kind, error = %e, "Analysis failed"),
        }
        result
    }

    /// Runs several analyses in order. A failing analysis does not stop the
    /// ones after it.
    pub async fn run_all(
        &self,
        dataset: &Dataset,
        kinds: &[AnalysisKind],
    ) -> Vec<(AnalysisKind, AnalysisResult<AnalysisOutput>)> {
        let mut results = Vec::with_capacity(kinds.len());
        for (index, kind) in kinds.iter().enumerate() {
            results.push((*kind, self.run(dataset, *kind).await));
            if let Some(callback) = &self.on_progress {
                callback((index + 1) as f64 / kinds.len() as f64);
            }
        }
        results
    }

    async fn execute(&self, dataset: &Dataset, kind: AnalysisKind) -> AnalysisResult<AnalysisOutput> {
        match kind {
            AnalysisKind::StatisticalSummary => {
                let numeric = dataset.columns_of_kind(ValueKind::Number);
                if numeric.is_empty() {
                    return Ok(AnalysisOutput::StatisticalSummary(Vec::new()));
                }
                let context = AnalysisContext::new(dataset)?;
                Ok(AnalysisOutput::StatisticalSummary(
                    describe(&context, &numeric).await?,
                ))
            }
            AnalysisKind::OutlierDetection => {
                Ok(AnalysisOutput::OutlierDetection(self.detector.detect(dataset)?))
            }
            AnalysisKind::DataTypes => Ok(AnalysisOutput::DataTypes {
                classification: self.profiler.classifier().classify(dataset)?,
                details: self.profiler.column_details(dataset)?,
            }),
            AnalysisKind::MissingValues => Ok(AnalysisOutput::MissingValues(
                self.profiler.missing_values(dataset),
            )),
            AnalysisKind::Correlation => {
                let numeric = dataset.columns_of_kind(ValueKind::Number);
                let context = AnalysisContext::new(dataset)?;
                Ok(AnalysisOutput::Correlation(correlate(&context, &numeric).await?))
            }
        }
    }
}
