//! Z-score outlier detection across all numeric columns.
//!
//! Rows with a null or NaN in any numeric column are dropped before anything
//! is computed and are never reported. For the remaining rows each numeric
//! column gets its mean and population standard deviation; a row is an
//! outlier when any column's `|z|` is strictly greater than the threshold.
//!
//! A column whose standard deviation is zero, near zero (at most
//! `1e-12 * max(1, |mean|)`) or not finite has no meaningful z-score. Such a
//! column contributes no outliers and is listed in
//! [`OutlierReport::degenerate_columns`].

use arrow::array::{Array, BooleanArray, Float64Array};
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use tracing::{debug, instrument};

use super::errors::{AnalysisError, AnalysisResult};
use super::stats::{as_f64, mean, population_std_dev};
use crate::config::{InsightConfig, DEFAULT_OUTLIER_THRESHOLD};
use crate::dataset::{Dataset, ValueKind};

const RELATIVE_STD_EPSILON: f64 = 1e-12;

/// Result of an outlier pass.
#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub threshold: f64,
    /// Numeric columns considered, in schema order
    pub columns: Vec<String>,
    /// Columns skipped because their standard deviation is (near) zero
    pub degenerate_columns: Vec<String>,
    /// Rows left after dropping rows with missing numeric values
    pub rows_evaluated: usize,
    /// Positions of the outlier rows in the original dataset, ascending
    pub row_indices: Vec<usize>,
    /// The outlier rows with every original column
    #[serde(skip)]
    pub rows: RecordBatch,
}

impl OutlierReport {
    pub fn len(&self) -> usize {
        self.row_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_indices.is_empty()
    }

    fn empty(dataset: &Dataset, threshold: f64, columns: Vec<String>) -> Self {
        Self {
            threshold,
            columns,
            degenerate_columns: Vec::new(),
            rows_evaluated: 0,
            row_indices: Vec::new(),
            rows: RecordBatch::new_empty(dataset.schema()),
        }
    }
}

/// Flags rows whose numeric values deviate beyond a z-score threshold.
///
/// # Examples
///
/// ```rust
/// use datalens::analyzers::OutlierDetector;
///
/// assert!(OutlierDetector::new(3.0).is_ok());
/// assert!(OutlierDetector::new(0.0).is_err());
/// assert!(OutlierDetector::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct OutlierDetector {
    threshold: f64,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

impl OutlierDetector {
    /// Creates a detector; the threshold must be finite and positive.
    pub fn new(threshold: f64) -> AnalysisResult<Self> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(AnalysisError::invalid_config(format!(
                "outlier threshold must be finite and positive, got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    pub fn from_config(config: &InsightConfig) -> AnalysisResult<Self> {
        Self::new(config.outlier_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Runs detection over every numeric column of the dataset.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), threshold = self.threshold))]
    pub fn detect(&self, dataset: &Dataset) -> AnalysisResult<OutlierReport> {
        let mut names = Vec::new();
        let mut columns: Vec<Float64Array> = Vec::new();
        for (index, (field, column)) in dataset.columns().enumerate() {
            if dataset.value_kind(index) == ValueKind::Number {
                names.push(field.name().clone());
                columns.push(as_f64(column)?);
            }
        }

        if columns.is_empty() {
            debug!("No numeric columns, nothing to detect");
            return Ok(OutlierReport::empty(dataset, self.threshold, names));
        }

        let eligible: Vec<usize> = (0..dataset.num_rows())
            .filter(|&row| {
                columns
                    .iter()
                    .all(|column| column.is_valid(row) && !column.value(row).is_nan())
            })
            .collect();

        if eligible.is_empty() {
            debug!("No rows without missing numeric values");
            return Ok(OutlierReport::empty(dataset, self.threshold, names));
        }

        let mut scorers = Vec::with_capacity(columns.len());
        let mut degenerate_columns = Vec::new();
        for (name, column) in names.iter().zip(&columns) {
            let values: Vec<f64> = eligible.iter().map(|&row| column.value(row)).collect();
            match ColumnScorer::fit(&values) {
                Some(scorer) => scorers.push((column, scorer)),
                None => {
                    debug!(column = %name, "Standard deviation is degenerate, column skipped");
                    degenerate_columns.push(name.clone());
                }
            }
        }

        let row_indices: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&row| {
                scorers
                    .iter()
                    .any(|(column, scorer)| scorer.z(column.value(row)).abs() > self.threshold)
            })
            .collect();

        let mut mask = vec![false; dataset.num_rows()];
        for &row in &row_indices {
            mask[row] = true;
        }
        let rows = filter_record_batch(dataset.batch(), &BooleanArray::from(mask))?;

        debug!(
            rows_evaluated = eligible.len(),
            outliers = row_indices.len(),
            "Outlier detection finished"
        );
        Ok(OutlierReport {
            threshold: self.threshold,
            columns: names,
            degenerate_columns,
            rows_evaluated: eligible.len(),
            row_indices,
            rows,
        })
    }
}

/// Mean and population standard deviation of one column.
#[derive(Debug, Clone, Copy)]
struct ColumnScorer {
    mean: f64,
    std_dev: f64,
}

impl ColumnScorer {
    /// `None` when the standard deviation cannot be used as a divisor.
    fn fit(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let std_dev = population_std_dev(values)?;
        let floor = RELATIVE_STD_EPSILON * mean.abs().max(1.0);
        if !std_dev.is_finite() || std_dev <= floor {
            return None;
        }
        Some(Self { mean, std_dev })
    }

    fn z(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{create_customer_dataset, create_dataset, create_spike_dataset};
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use std::sync::Arc;

    #[test]
    fn test_spike_rows_detected() {
        let dataset = create_spike_dataset(100, 5);
        let report = OutlierDetector::default().detect(&dataset).unwrap();
        assert_eq!(report.row_indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(report.rows.num_rows(), 5);
        assert_eq!(report.rows.num_columns(), 2);
        assert_eq!(report.rows_evaluated, 100);
        assert!(report.degenerate_columns.is_empty());
    }

    #[test]
    fn test_constant_column_contributes_nothing() {
        let dataset = create_dataset(vec![(
            "flat",
            Arc::new(Int64Array::from(vec![7; 20])) as ArrayRef,
        )]);
        let report = OutlierDetector::default().detect(&dataset).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.degenerate_columns, vec!["flat"]);
    }

    #[test]
    fn test_no_numeric_columns() {
        let dataset = create_dataset(vec![(
            "name",
            Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef,
        )]);
        let report = OutlierDetector::default().detect(&dataset).unwrap();
        assert!(report.is_empty());
        assert!(report.columns.is_empty());
        assert_eq!(report.rows.num_rows(), 0);
        assert_eq!(report.rows.schema(), dataset.schema());
    }

    #[test]
    fn test_all_rows_have_missing_values() {
        let dataset = create_dataset(vec![(
            "v",
            Arc::new(Float64Array::from(vec![None, Some(f64::NAN)])) as ArrayRef,
        )]);
        let report = OutlierDetector::default().detect(&dataset).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.rows_evaluated, 0);
    }

    #[test]
    fn test_lower_threshold_finds_more() {
        let dataset = create_customer_dataset();
        let strict = OutlierDetector::default().detect(&dataset).unwrap();
        let loose = OutlierDetector::new(1.0).unwrap().detect(&dataset).unwrap();
        assert!(strict.is_empty());
        assert!(loose.len() > strict.len());
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(
            OutlierDetector::new(-1.0),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }
}
