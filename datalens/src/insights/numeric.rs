//! Insight rules over the values of numeric columns.

use tracing::debug;

use super::{format_count, Impact, Insight, NumericInsightRule};
use crate::analyzers::stats::{present_values, quantile, sample_variance};
use crate::analyzers::{AnalysisError, AnalysisResult};
use crate::dataset::{Dataset, ValueKind};

/// Flags numeric columns whose sample variance is close to zero.
#[derive(Debug, Clone)]
pub struct LowVarianceRule {
    pub variance_below: f64,
    /// Column names listed in the description
    pub max_listed: usize,
}

impl Default for LowVarianceRule {
    fn default() -> Self {
        Self {
            variance_below: 0.01,
            max_listed: 3,
        }
    }
}

impl NumericInsightRule for LowVarianceRule {
    fn apply(&self, dataset: &Dataset) -> AnalysisResult<Vec<Insight>> {
        let mut low_variance = Vec::new();
        for name in dataset.columns_of_kind(ValueKind::Number) {
            let array = dataset
                .column(&name)
                .ok_or_else(|| AnalysisError::column_not_found(&name))?;
            let values = present_values(array)?;
            // fewer than two values has no variance to judge
            if let Some(variance) = sample_variance(&values) {
                if variance < self.variance_below {
                    debug!(column = %name, variance, "Low variance column");
                    low_variance.push(name);
                }
            }
        }

        if low_variance.is_empty() {
            return Ok(Vec::new());
        }
        low_variance.truncate(self.max_listed);
        Ok(vec![Insight::new(
            "📊",
            "Low Variance Columns Detected",
            format!(
                "Columns {} have very low variance. May not be useful for analysis.",
                low_variance.join(", ")
            ),
            Impact::Medium,
        )])
    }

    fn name(&self) -> &str {
        "LowVarianceRule"
    }

    fn description(&self) -> &str {
        "Finds numeric columns with near-zero sample variance"
    }
}

/// Counts values outside the 1.5 IQR fences of the first few numeric columns.
///
/// A column is reported when its outlier count exceeds `min_share` of all
/// rows, missing rows included.
#[derive(Debug, Clone)]
pub struct IqrOutlierRule {
    pub columns_checked: usize,
    pub fence_multiplier: f64,
    pub min_share: f64,
}

impl Default for IqrOutlierRule {
    fn default() -> Self {
        Self {
            columns_checked: 3,
            fence_multiplier: 1.5,
            min_share: 0.05,
        }
    }
}

impl IqrOutlierRule {
    fn outlier_count(&self, values: &mut [f64]) -> usize {
        values.sort_by(f64::total_cmp);
        let (Some(q1), Some(q3)) = (quantile(values, 0.25), quantile(values, 0.75)) else {
            return 0;
        };
        let iqr = q3 - q1;
        let lower = q1 - self.fence_multiplier * iqr;
        let upper = q3 + self.fence_multiplier * iqr;
        values.iter().filter(|v| **v < lower || **v > upper).count()
    }
}

impl NumericInsightRule for IqrOutlierRule {
    fn apply(&self, dataset: &Dataset) -> AnalysisResult<Vec<Insight>> {
        let total_rows = dataset.num_rows();
        let mut insights = Vec::new();
        for name in dataset
            .columns_of_kind(ValueKind::Number)
            .into_iter()
            .take(self.columns_checked)
        {
            let array = dataset
                .column(&name)
                .ok_or_else(|| AnalysisError::column_not_found(&name))?;
            let mut values = present_values(array)?;
            let count = self.outlier_count(&mut values);
            if count as f64 > total_rows as f64 * self.min_share {
                let share = count as f64 / total_rows as f64 * 100.0;
                insights.push(Insight::new(
                    "🎯",
                    format!("Outliers in {name}"),
                    format!(
                        "{} potential outliers detected ({share:.1}%).",
                        format_count(count)
                    ),
                    Impact::Medium,
                ));
            }
        }
        Ok(insights)
    }

    fn name(&self) -> &str {
        "IqrOutlierRule"
    }

    fn description(&self) -> &str {
        "Counts values beyond the interquartile fences"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{create_customer_dataset, create_dataset, create_spike_dataset};
    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use std::sync::Arc;

    fn constant(name: &str, value: f64, len: usize) -> (&str, ArrayRef) {
        (name, Arc::new(Float64Array::from(vec![value; len])) as ArrayRef)
    }

    #[test]
    fn test_low_variance_lists_at_most_three() {
        let dataset = create_dataset(vec![
            constant("a", 1.0, 5),
            constant("b", 2.0, 5),
            ("wide", Arc::new(Int64Array::from(vec![1, 50, 100, 150, 200])) as ArrayRef),
            constant("c", 3.0, 5),
            constant("d", 4.0, 5),
        ]);
        let insights = LowVarianceRule::default().apply(&dataset).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Low Variance Columns Detected");
        assert_eq!(
            insights[0].description,
            "Columns a, b, c have very low variance. May not be useful for analysis."
        );
    }

    #[test]
    fn test_single_value_is_not_low_variance() {
        let dataset = create_dataset(vec![
            constant("only", 7.0, 1),
            ("text", Arc::new(StringArray::from(vec!["x"])) as ArrayRef),
        ]);
        assert!(LowVarianceRule::default().apply(&dataset).unwrap().is_empty());
    }

    #[test]
    fn test_no_numeric_columns() {
        let dataset = create_dataset(vec![(
            "text",
            Arc::new(StringArray::from(vec!["x", "y"])) as ArrayRef,
        )]);
        assert!(LowVarianceRule::default().apply(&dataset).unwrap().is_empty());
        assert!(IqrOutlierRule::default().apply(&dataset).unwrap().is_empty());
    }

    #[test]
    fn test_iqr_outliers_above_five_percent() {
        // 10 of 100 rows at 1000, fences collapse to [0, 0]
        let insights = IqrOutlierRule::default()
            .apply(&create_spike_dataset(100, 10))
            .unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Outliers in value");
        assert_eq!(insights[0].description, "10 potential outliers detected (10.0%).");
    }

    #[test]
    fn test_iqr_outliers_at_five_percent_not_reported() {
        let insights = IqrOutlierRule::default()
            .apply(&create_spike_dataset(100, 5))
            .unwrap();
        assert!(insights.is_empty());
    }

    #[test]
    fn test_iqr_only_first_three_numeric_columns() {
        let spikes: Vec<f64> = (0..20).map(|i| if i < 4 { 500.0 } else { 1.0 }).collect();
        let spike = || Arc::new(Float64Array::from(spikes.clone())) as ArrayRef;
        let dataset = create_dataset(vec![
            ("a", spike()),
            ("b", spike()),
            ("c", spike()),
            ("d", spike()),
        ]);
        let titles: Vec<String> = IqrOutlierRule::default()
            .apply(&dataset)
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, ["Outliers in a", "Outliers in b", "Outliers in c"]);
    }

    #[test]
    fn test_customer_ages_have_no_outliers() {
        let dataset = create_customer_dataset();
        assert!(IqrOutlierRule::default().apply(&dataset).unwrap().is_empty());
        assert!(LowVarianceRule::default().apply(&dataset).unwrap().is_empty());
    }
}
