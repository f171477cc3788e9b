//! Partitioning of columns into numeric, categorical, datetime and
//! unclassified buckets.
//!
//! Classification is decided by the declared Arrow type first and by
//! cardinality second:
//!
//! 1. number types are **numeric**
//! 2. date and timestamp types are **datetime**
//! 3. any other column with at most `max_categories` distinct non-null values
//!    is **categorical** (booleans always end up here)
//! 4. everything left is **unclassified**, typically free text or identifiers
//!
//! Every column lands in exactly one bucket, in schema order.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::errors::AnalysisResult;
use super::stats::distinct_count;
use crate::config::DEFAULT_MAX_CATEGORIES;
use crate::dataset::{Dataset, ValueKind};

/// Bucket a column is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCategory {
    Numeric,
    Categorical,
    Datetime,
    Unclassified,
}

/// Disjoint, ordered lists of column names per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub datetime: Vec<String>,
    pub unclassified: Vec<String>,
}

impl ColumnClassification {
    /// Bucket of a column, if the column was classified at all.
    pub fn category_of(&self, column: &str) -> Option<ColumnCategory> {
        let contains = |names: &[String]| names.iter().any(|name| name == column);
        if contains(&self.numeric) {
            Some(ColumnCategory::Numeric)
        } else if contains(&self.categorical) {
            Some(ColumnCategory::Categorical)
        } else if contains(&self.datetime) {
            Some(ColumnCategory::Datetime)
        } else if contains(&self.unclassified) {
            Some(ColumnCategory::Unclassified)
        } else {
            None
        }
    }

    /// Total number of classified columns.
    pub fn total(&self) -> usize {
        self.numeric.len() + self.categorical.len() + self.datetime.len() + self.unclassified.len()
    }

    fn push(&mut self, category: ColumnCategory, column: String) {
        match category {
            ColumnCategory::Numeric => self.numeric.push(column),
            ColumnCategory::Categorical => self.categorical.push(column),
            ColumnCategory::Datetime => self.datetime.push(column),
            ColumnCategory::Unclassified => self.unclassified.push(column),
        }
    }
}

/// Classifies dataset columns.
///
/// # Examples
///
/// ```rust
/// use datalens::analyzers::ColumnClassifier;
///
/// let classifier = ColumnClassifier::new(20);
/// assert_eq!(classifier.max_categories(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    max_categories: usize,
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CATEGORIES)
    }
}

impl ColumnClassifier {
    pub fn new(max_categories: usize) -> Self {
        Self { max_categories }
    }

    pub fn max_categories(&self) -> usize {
        self.max_categories
    }

    /// Partitions every column of the dataset.
    ///
    /// Fails when the distinct values of a non-numeric, non-temporal column
    /// cannot be counted (e.g. map columns).
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), max_categories = self.max_categories))]
    pub fn classify(&self, dataset: &Dataset) -> AnalysisResult<ColumnClassification> {
        let mut classification = ColumnClassification::default();
        for (field, column) in dataset.columns() {
            let category = match ValueKind::from_data_type(field.data_type()) {
                ValueKind::Number => ColumnCategory::Numeric,
                ValueKind::Timestamp => ColumnCategory::Datetime,
                _ if distinct_count(column, Some(self.max_categories))? <= self.max_categories => {
                    ColumnCategory::Categorical
                }
                _ => ColumnCategory::Unclassified,
            };
            classification.push(category, field.name().clone());
        }
        debug!(
            numeric = classification.numeric.len(),
            categorical = classification.categorical.len(),
            datetime = classification.datetime.len(),
            unclassified = classification.unclassified.len(),
            "Classified columns"
        );
        Ok(classification)
    }
}
