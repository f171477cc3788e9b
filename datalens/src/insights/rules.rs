//! Insight rules that only need the dataset [`Summary`].

use super::{format_count, Impact, Insight, InsightRule};
use crate::analyzers::Summary;

/// Rates overall completeness. Exactly one insight is always produced.
#[derive(Debug, Clone)]
pub struct DataQualityRule {
    /// Missing percentage below which quality is still "good"
    pub good_below_percentage: f64,
}

impl Default for DataQualityRule {
    fn default() -> Self {
        Self {
            good_below_percentage: 5.0,
        }
    }
}

impl InsightRule for DataQualityRule {
    fn apply(&self, summary: &Summary) -> Vec<Insight> {
        let missing = summary.missing_percentage();
        let insight = if summary.missing_total == 0 {
            Insight::new(
                "✅",
                "Excellent Data Quality",
                "Your dataset has no missing values. This indicates high-quality data collection.",
                Impact::High,
            )
        } else if missing < self.good_below_percentage {
            Insight::new(
                "👍",
                "Good Data Quality",
                format!("Only {missing:.1}% of data is missing. Minimal cleaning required."),
                Impact::Medium,
            )
        } else {
            Insight::new(
                "⚠️",
                "Data Quality Needs Attention",
                format!("{missing:.1}% of data is missing. Consider data imputation strategies."),
                Impact::High,
            )
        };
        vec![insight]
    }

    fn name(&self) -> &str {
        "DataQualityRule"
    }

    fn description(&self) -> &str {
        "Rates the share of missing cells across the dataset"
    }
}

/// Reports fully duplicated rows.
#[derive(Debug, Clone, Default)]
pub struct DuplicateRowsRule;

impl InsightRule for DuplicateRowsRule {
    fn apply(&self, summary: &Summary) -> Vec<Insight> {
        if summary.duplicate_rows == 0 {
            return Vec::new();
        }
        vec![Insight::new(
            "🔄",
            "Duplicate Records Found",
            format!(
                "Found {} duplicate rows ({:.1}%). Consider deduplication.",
                format_count(summary.duplicate_rows),
                summary.duplicate_percentage()
            ),
            Impact::Medium,
        )]
    }

    fn name(&self) -> &str {
        "DuplicateRowsRule"
    }

    fn description(&self) -> &str {
        "Flags rows that repeat an earlier row exactly"
    }
}

/// Describes datasets dominated by numeric or categorical columns.
///
/// Both insights can fire for the same dataset.
#[derive(Debug, Clone)]
pub struct ColumnMixRule {
    pub numeric_share: f64,
    pub categorical_share: f64,
}

impl Default for ColumnMixRule {
    fn default() -> Self {
        Self {
            numeric_share: 0.7,
            categorical_share: 0.5,
        }
    }
}

impl InsightRule for ColumnMixRule {
    fn apply(&self, summary: &Summary) -> Vec<Insight> {
        let total = summary.column_count as f64;
        let numeric = summary.column_types.numeric.len();
        let categorical = summary.column_types.categorical.len();
        let mut insights = Vec::new();

        if numeric as f64 > total * self.numeric_share {
            insights.push(Insight::new(
                "🔢",
                "Numeric-Heavy Dataset",
                format!(
                    "{numeric} of {} columns are numeric. Ideal for statistical analysis and ML.",
                    summary.column_count
                ),
                Impact::High,
            ));
        }
        if categorical as f64 > total * self.categorical_share {
            insights.push(Insight::new(
                "📋",
                "Categorical-Rich Data",
                format!("{categorical} categorical columns found. Consider one-hot encoding for ML."),
                Impact::Medium,
            ));
        }
        insights
    }

    fn name(&self) -> &str {
        "ColumnMixRule"
    }

    fn description(&self) -> &str {
        "Compares numeric and categorical column counts to the total"
    }
}

/// Warns about small samples and highlights large ones.
#[derive(Debug, Clone)]
pub struct DatasetSizeRule {
    pub small_below_rows: usize,
    pub large_above_rows: usize,
}

impl Default for DatasetSizeRule {
    fn default() -> Self {
        Self {
            small_below_rows: 100,
            large_above_rows: 10_000,
        }
    }
}

impl InsightRule for DatasetSizeRule {
    fn apply(&self, summary: &Summary) -> Vec<Insight> {
        let rows = summary.row_count;
        if rows < self.small_below_rows {
            vec![Insight::new(
                "⚠️",
                "Small Dataset",
                format!(
                    "Only {} rows. Results may not be statistically significant.",
                    format_count(rows)
                ),
                Impact::High,
            )]
        } else if rows > self.large_above_rows {
            vec![Insight::new(
                "🚀",
                "Large Dataset Detected",
                format!(
                    "{} rows available. Excellent sample size for robust analysis.",
                    format_count(rows)
                ),
                Impact::High,
            )]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &str {
        "DatasetSizeRule"
    }

    fn description(&self) -> &str {
        "Checks the row count against small and large sample sizes"
    }
}

#[derive(Debug, Clone)]
pub struct MemoryFootprintRule {
    pub large_above_mb: f64,
}

impl Default for MemoryFootprintRule {
    fn default() -> Self {
        Self {
            large_above_mb: 100.0,
        }
    }
}

impl InsightRule for MemoryFootprintRule {
    fn apply(&self, summary: &Summary) -> Vec<Insight> {
        let memory_mb = summary.memory_mb();
        if memory_mb <= self.large_above_mb {
            return Vec::new();
        }
        vec![Insight::new(
            "💾",
            "Large Memory Footprint",
            format!("{memory_mb:.1} MB in memory. Consider data type optimization."),
            Impact::Low,
        )]
    }

    fn name(&self) -> &str {
        "MemoryFootprintRule"
    }

    fn description(&self) -> &str {
        "Flags datasets whose in-memory size exceeds a limit"
    }
}

/// Suggests correlation analysis once two numeric columns exist.
#[derive(Debug, Clone, Default)]
pub struct CorrelationHintRule;

impl InsightRule for CorrelationHintRule {
    fn apply(&self, summary: &Summary) -> Vec<Insight> {
        if summary.column_types.numeric.len() < 2 {
            return Vec::new();
        }
        vec![Insight::new(
            "📈",
            "Correlation Analysis Recommended",
            "Multiple numeric columns detected. Run correlation analysis to find relationships.",
            Impact::High,
        )]
    }

    fn name(&self) -> &str {
        "CorrelationHintRule"
    }

    fn description(&self) -> &str {
        "Recommends correlation analysis for multiple numeric columns"
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeSeriesHintRule;

impl InsightRule for TimeSeriesHintRule {
    fn apply(&self, summary: &Summary) -> Vec<Insight> {
        let datetime = summary.column_types.datetime.len();
        if datetime == 0 {
            return Vec::new();
        }
        vec![Insight::new(
            "📅",
            "Time Series Analysis Possible",
            format!("Found {datetime} datetime column(s). Time-based trends can be analyzed."),
            Impact::High,
        )]
    }

    fn name(&self) -> &str {
        "TimeSeriesHintRule"
    }

    fn description(&self) -> &str {
        "Points out datetime columns usable for trend analysis"
    }
}
