//! Rule-based insights over a dataset summary.
//!
//! The engine holds an ordered list of rules. Summary rules see only the
//! [`Summary`]; numeric rules look at the values of the numeric columns and
//! run after every summary rule.
//!
//! ```rust
//! use datalens::analyzers::Summary;
//! use datalens::analyzers::ColumnClassification;
//! use datalens::insights::InsightEngine;
//!
//! let summary = Summary {
//!     row_count: 50,
//!     column_count: 2,
//!     memory_bytes: 800,
//!     missing_total: 0,
//!     duplicate_rows: 0,
//!     column_types: ColumnClassification {
//!         numeric: vec!["a".into(), "b".into()],
//!         ..Default::default()
//!     },
//! };
//!
//! let titles: Vec<String> = InsightEngine::default()
//!     .generate(&summary)
//!     .into_iter()
//!     .map(|insight| insight.title)
//!     .collect();
//! assert_eq!(titles[0], "Excellent Data Quality");
//! assert!(titles.contains(&"Small Dataset".to_string()));
//! ```

pub mod numeric;
pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::{AnalysisResult, Summary};
use crate::dataset::Dataset;

pub use numeric::{IqrOutlierRule, LowVarianceRule};
pub use rules::{
    ColumnMixRule, CorrelationHintRule, DataQualityRule, DatasetSizeRule, DuplicateRowsRule,
    MemoryFootprintRule, TimeSeriesHintRule,
};

/// How much an insight matters to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Impact::Low => write!(f, "low"),
            Impact::Medium => write!(f, "medium"),
            Impact::High => write!(f, "high"),
        }
    }
}

/// A short human-readable finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub icon: String,
    pub title: String,
    pub description: String,
    pub impact: Impact,
}

impl Insight {
    pub fn new(
        icon: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
    ) -> Self {
        Self {
            icon: icon.into(),
            title: title.into(),
            description: description.into(),
            impact,
        }
    }
}

/// Rule evaluated against a dataset summary.
pub trait InsightRule: Send + Sync {
    /// Apply this rule to a summary and return its insights, if any.
    fn apply(&self, summary: &Summary) -> Vec<Insight>;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;

    /// Get a description of what this rule analyzes
    fn description(&self) -> &str;
}

/// Rule evaluated against the values of a dataset's numeric columns.
pub trait NumericInsightRule: Send + Sync {
    fn apply(&self, dataset: &Dataset) -> AnalysisResult<Vec<Insight>>;

    fn name(&self) -> &str;

    fn description(&self) -> &str;
}

/// Engine that runs insight rules in registration order.
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
    numeric_rules: Vec<Box<dyn NumericInsightRule>>,
}

impl fmt::Debug for InsightEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightEngine")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field(
                "numeric_rules",
                &self.numeric_rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl InsightEngine {
    /// Create an engine with no rules.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            numeric_rules: Vec::new(),
        }
    }

    /// Add a summary rule to the engine
    pub fn add_rule(mut self, rule: Box<dyn InsightRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a numeric rule to the engine
    pub fn add_numeric_rule(mut self, rule: Box<dyn NumericInsightRule>) -> Self {
        self.numeric_rules.push(rule);
        self
    }

    /// Insights derived from the summary alone.
    #[instrument(skip(self, summary), fields(rows = summary.row_count, columns = summary.column_count))]
    pub fn generate(&self, summary: &Summary) -> Vec<Insight> {
        let mut insights = Vec::new();
        for rule in &self.rules {
            let produced = rule.apply(summary);
            debug!(rule = rule.name(), insights = produced.len(), "Applied insight rule");
            insights.extend(produced);
        }
        insights
    }

    /// Insights derived from numeric column values.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name()))]
    pub fn generate_numeric(&self, dataset: &Dataset) -> AnalysisResult<Vec<Insight>> {
        let mut insights = Vec::new();
        for rule in &self.numeric_rules {
            let produced = rule.apply(dataset)?;
            debug!(rule = rule.name(), insights = produced.len(), "Applied numeric insight rule");
            insights.extend(produced);
        }
        Ok(insights)
    }

    /// Summary insights followed by numeric insights.
    pub fn generate_all(&self, dataset: &Dataset, summary: &Summary) -> AnalysisResult<Vec<Insight>> {
        let mut insights = self.generate(summary);
        insights.extend(self.generate_numeric(dataset)?);
        Ok(insights)
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
            .add_rule(Box::new(DataQualityRule::default()))
            .add_rule(Box::new(DuplicateRowsRule))
            .add_rule(Box::new(ColumnMixRule::default()))
            .add_rule(Box::new(DatasetSizeRule::default()))
            .add_rule(Box::new(MemoryFootprintRule::default()))
            .add_rule(Box::new(CorrelationHintRule))
            .add_rule(Box::new(TimeSeriesHintRule))
            .add_numeric_rule(Box::new(LowVarianceRule::default()))
            .add_numeric_rule(Box::new(IqrOutlierRule::default()))
    }
}

/// Formats a count with comma thousands separators.
pub(crate) fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}
