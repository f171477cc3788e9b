//! Dataset-level profiling: shape, memory, missing values, duplicates and
//! column classification in one [`Summary`].
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use datalens::analyzers::DatasetProfiler;
//! use datalens::dataset::Dataset;
//!
//! let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, true)]));
//! let column: ArrayRef = Arc::new(Int64Array::from(vec![Some(1), None, Some(1)]));
//! let dataset = Dataset::new("demo", RecordBatch::try_new(schema, vec![column]).unwrap());
//!
//! let summary = DatasetProfiler::default().summarize(&dataset).unwrap();
//! assert_eq!(summary.row_count, 3);
//! assert_eq!(summary.missing_total, 1);
//! assert_eq!(summary.duplicate_rows, 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::classifier::{ColumnClassification, ColumnClassifier};
use super::errors::AnalysisResult;
use super::stats::{distinct_count, duplicate_row_count, missing_count};
use crate::config::{InsightConfig, DEFAULT_MAX_CATEGORIES};
use crate::dataset::{Dataset, ValueKind};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Shape and quality figures for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub row_count: usize,
    pub column_count: usize,
    /// Arrow buffer footprint in bytes
    pub memory_bytes: usize,
    /// Null, empty or NaN cells across all columns
    pub missing_total: usize,
    /// Rows identical to an earlier row
    pub duplicate_rows: usize,
    pub column_types: ColumnClassification,
}

impl Summary {
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / BYTES_PER_MB
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.row_count * self.column_count
    }

    /// Share of missing cells in percent, 0 for a table without cells.
    pub fn missing_percentage(&self) -> f64 {
        match self.cell_count() {
            0 => 0.0,
            cells => self.missing_total as f64 / cells as f64 * 100.0,
        }
    }

    /// Share of duplicate rows in percent, 0 for a table without rows.
    pub fn duplicate_percentage(&self) -> f64 {
        match self.row_count {
            0 => 0.0,
            rows => self.duplicate_rows as f64 / rows as f64 * 100.0,
        }
    }
}

/// Per-column overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDetail {
    pub name: String,
    /// Arrow type name, e.g. `Int64` or `Utf8`
    pub data_type: String,
    pub kind: ValueKind,
    pub non_null_count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    /// Distinct non-null values
    pub unique_count: usize,
}

/// A column with at least one missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueEntry {
    pub column: String,
    pub missing_count: usize,
    /// Percentage of rows
    pub percentage: f64,
    pub data_type: String,
}

/// Columns with missing values, most affected first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub entries: Vec<MissingValueEntry>,
}

impl MissingValueReport {
    /// True when no column has a missing value.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Produces summaries, column details and missing-value reports.
#[derive(Debug, Clone, Default)]
pub struct DatasetProfiler {
    classifier: ColumnClassifier,
}

/// Builder for [`DatasetProfiler`].
#[derive(Debug, Clone)]
pub struct DatasetProfilerBuilder {
    max_categories: usize,
}

impl Default for DatasetProfilerBuilder {
    fn default() -> Self {
        Self {
            max_categories: DEFAULT_MAX_CATEGORIES,
        }
    }
}

impl DatasetProfilerBuilder {
    /// Sets the cardinality limit for categorical columns.
    pub fn max_categories(mut self, max_categories: usize) -> Self {
        self.max_categories = max_categories;
        self
    }

    pub fn build(self) -> DatasetProfiler {
        DatasetProfiler {
            classifier: ColumnClassifier::new(self.max_categories),
        }
    }
}

impl DatasetProfiler {
    pub fn builder() -> DatasetProfilerBuilder {
        DatasetProfilerBuilder::default()
    }

    /// Creates a profiler using the limits of `config`.
    pub fn from_config(config: &InsightConfig) -> Self {
        Self::builder().max_categories(config.max_categories).build()
    }

    pub fn classifier(&self) -> &ColumnClassifier {
        &self.classifier
    }

    /// Computes the dataset summary.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name()))]
    pub fn summarize(&self, dataset: &Dataset) -> AnalysisResult<Summary> {
        let missing_total = dataset
            .batch()
            .columns()
            .iter()
            .map(|column| missing_count(column.as_ref()))
            .sum();
        let duplicate_rows = duplicate_row_count(dataset.batch())?;
        let column_types = self.classifier.classify(dataset)?;

        let summary = Summary {
            row_count: dataset.num_rows(),
            column_count: dataset.num_columns(),
            memory_bytes: dataset.memory_bytes(),
            missing_total,
            duplicate_rows,
            column_types,
        };
        debug!(
            rows = summary.row_count,
            columns = summary.column_count,
            missing = summary.missing_total,
            duplicates = summary.duplicate_rows,
            "Summarized dataset"
        );
        Ok(summary)
    }

    /// Type, completeness and cardinality of every column.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name()))]
    pub fn column_details(&self, dataset: &Dataset) -> AnalysisResult<Vec<ColumnDetail>> {
        let rows = dataset.num_rows();
        dataset
            .columns()
            .map(|(field, column)| {
                let null_count = missing_count(column.as_ref());
                Ok(ColumnDetail {
                    name: field.name().clone(),
                    data_type: field.data_type().to_string(),
                    kind: ValueKind::from_data_type(field.data_type()),
                    non_null_count: rows - null_count,
                    null_count,
                    null_percentage: percentage(null_count, rows),
                    unique_count: distinct_count(column, None)?,
                })
            })
            .collect()
    }

    /// Columns with missing values, sorted by missing count descending.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name()))]
    pub fn missing_values(&self, dataset: &Dataset) -> MissingValueReport {
        let rows = dataset.num_rows();
        let mut entries: Vec<MissingValueEntry> = dataset
            .columns()
            .filter_map(|(field, column)| {
                let missing = missing_count(column.as_ref());
                (missing > 0).then(|| MissingValueEntry {
                    column: field.name().clone(),
                    missing_count: missing,
                    percentage: percentage(missing, rows),
                    data_type: field.data_type().to_string(),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));
        MissingValueReport { entries }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{create_customer_dataset, create_dataset};
    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use std::sync::Arc;

    #[test]
    fn test_customer_summary() {
        let summary = DatasetProfiler::default()
            .summarize(&create_customer_dataset())
            .unwrap();
        assert_eq!(summary.row_count, 10);
        assert_eq!(summary.column_count, 3);
        assert_eq!(summary.missing_total, 0);
        assert_eq!(summary.duplicate_rows, 0);
        assert!(summary.memory_bytes > 0);
        assert_eq!(summary.column_types.numeric, vec!["age"]);
    }

    #[test]
    fn test_percentages() {
        let dataset = create_dataset(vec![
            (
                "a",
                Arc::new(Int64Array::from(vec![Some(1), Some(1), None, Some(2)])) as ArrayRef,
            ),
            (
                "b",
                Arc::new(StringArray::from(vec![Some("x"), Some("x"), None, Some("y")]))
                    as ArrayRef,
            ),
        ]);
        let summary = DatasetProfiler::default().summarize(&dataset).unwrap();
        assert_eq!(summary.missing_total, 2);
        assert_eq!(summary.missing_percentage(), 25.0);
        assert_eq!(summary.duplicate_rows, 1);
        assert_eq!(summary.duplicate_percentage(), 25.0);
    }

    #[test]
    fn test_zero_row_summary() {
        let dataset = create_dataset(vec![(
            "a",
            Arc::new(Int64Array::from(Vec::<i64>::new())) as ArrayRef,
        )]);
        let summary = DatasetProfiler::default().summarize(&dataset).unwrap();
        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.missing_percentage(), 0.0);
        assert_eq!(summary.duplicate_percentage(), 0.0);
    }

    #[test]
    fn test_column_details() {
        let dataset = create_dataset(vec![(
            "score",
            Arc::new(Float64Array::from(vec![
                Some(1.0),
                Some(1.0),
                None,
                Some(f64::NAN),
                Some(2.0),
            ])) as ArrayRef,
        )]);
        let details = DatasetProfiler::default().column_details(&dataset).unwrap();
        assert_eq!(details.len(), 1);
        let detail = &details[0];
        assert_eq!(detail.data_type, "Float64");
        assert_eq!(detail.kind, ValueKind::Number);
        assert_eq!(detail.null_count, 2);
        assert_eq!(detail.non_null_count, 3);
        assert_eq!(detail.null_percentage, 40.0);
        assert_eq!(detail.unique_count, 2);
    }

    #[test]
    fn test_missing_values_sorted_desc() {
        let dataset = create_dataset(vec![
            (
                "few",
                Arc::new(Int64Array::from(vec![None, Some(1), Some(2), Some(3)])) as ArrayRef,
            ),
            (
                "none",
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])) as ArrayRef,
            ),
            (
                "many",
                Arc::new(StringArray::from(vec![None, None, None, Some("x")])) as ArrayRef,
            ),
        ]);
        let report = DatasetProfiler::default().missing_values(&dataset);
        let columns: Vec<&str> = report.entries.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["many", "few"]);
        assert_eq!(report.entries[0].percentage, 75.0);

        let clean = DatasetProfiler::default().missing_values(&create_customer_dataset());
        assert!(clean.is_empty());
    }

    #[test]
    fn test_builder_sets_threshold() {
        let profiler = DatasetProfiler::builder().max_categories(2).build();
        assert_eq!(profiler.classifier().max_categories(), 2);

        let summary = profiler.summarize(&create_customer_dataset()).unwrap();
        assert_eq!(summary.column_types.unclassified, vec!["city"]);
    }
}
