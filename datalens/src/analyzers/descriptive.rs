//! Descriptive statistics for numeric columns, computed in SQL.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::context::{f64_at, quoted, AnalysisContext, TABLE_NAME};
use super::errors::AnalysisResult;

/// `count`, moments, extremes and quartiles of one column.
///
/// Standard deviation and variance are sample statistics (n - 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: u64,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
    pub variance: Option<f64>,
}

impl ColumnStatistics {
    fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            count: 0,
            mean: None,
            std_dev: None,
            min: None,
            q1: None,
            median: None,
            q3: None,
            max: None,
            variance: None,
        }
    }
}

/// Computes statistics for each of `columns`, in the given order.
#[instrument(skip(context, columns), fields(dataset = %context.dataset_name(), columns = columns.len()))]
pub async fn describe(
    context: &AnalysisContext,
    columns: &[String],
) -> AnalysisResult<Vec<ColumnStatistics>> {
    let mut statistics = Vec::with_capacity(columns.len());
    for column in columns {
        statistics.push(describe_column(context, column).await?);
    }
    Ok(statistics)
}

async fn describe_column(context: &AnalysisContext, column: &str) -> AnalysisResult<ColumnStatistics> {
    let value = format!("CAST({} AS DOUBLE)", quoted(column)?);
    let present = format!("{value} IS NOT NULL AND NOT isnan({value})");

    let sql = format!(
        "SELECT
            COUNT({value}) as count,
            AVG({value}) as mean,
            STDDEV({value}) as std_dev,
            MIN({value}) as min,
            MAX({value}) as max,
            VAR_SAMP({value}) as variance
         FROM {TABLE_NAME}
         WHERE {present}"
    );
    let batches = context.query(&sql).await?;

    let count = f64_at(&batches, 0, 0)?.unwrap_or(0.0) as u64;
    if count == 0 {
        debug!(column = %column, "No values to describe");
        return Ok(ColumnStatistics::empty(column));
    }

    let mut stats = ColumnStatistics {
        column: column.to_string(),
        count,
        mean: f64_at(&batches, 1, 0)?,
        std_dev: f64_at(&batches, 2, 0)?,
        min: f64_at(&batches, 3, 0)?,
        q1: None,
        median: None,
        q3: None,
        max: f64_at(&batches, 4, 0)?,
        variance: f64_at(&batches, 5, 0)?,
    };

    stats.q1 = percentile(context, &value, &present, count, 0.25).await?;
    stats.median = percentile(context, &value, &present, count, 0.5).await?;
    stats.q3 = percentile(context, &value, &present, count, 0.75).await?;

    debug!(column = %column, count, "Described column");
    Ok(stats)
}

/// Percentile by linear interpolation between the two closest ranks.
async fn percentile(
    context: &AnalysisContext,
    value: &str,
    present: &str,
    count: u64,
    percentile: f64,
) -> AnalysisResult<Option<f64>> {
    let position = percentile * (count - 1) as f64;
    let lower_index = position.floor() as u64;
    let fraction = position - position.floor();

    let sql = format!(
        "SELECT {value} as value
         FROM {TABLE_NAME}
         WHERE {present}
         ORDER BY {value}
         LIMIT 2 OFFSET {lower_index}"
    );
    let batches = context.query(&sql).await?;

    let lower = f64_at(&batches, 0, 0)?;
    let upper = f64_at(&batches, 0, 1)?;
    Ok(match (lower, upper) {
        (Some(lower), Some(upper)) => Some(lower + fraction * (upper - lower)),
        (Some(lower), None) => Some(lower),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{create_customer_dataset, create_dataset};
    use arrow::array::{ArrayRef, Float64Array};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_describe_integers() {
        let context = AnalysisContext::new(&create_customer_dataset()).unwrap();
        let stats = describe(&context, &["age".to_string()]).await.unwrap();
        let age = &stats[0];

        assert_eq!(age.column, "age");
        assert_eq!(age.count, 10);
        assert!((age.mean.unwrap() - 38.3).abs() < 1e-9);
        assert_eq!(age.min, Some(23.0));
        assert_eq!(age.max, Some(60.0));
        // sorted: 23 27 29 33 35 38 41 45 52 60
        assert!((age.q1.unwrap() - 30.0).abs() < 1e-9);
        assert!((age.median.unwrap() - 36.5).abs() < 1e-9);
        assert!((age.q3.unwrap() - 44.0).abs() < 1e-9);
        assert!((age.variance.unwrap() - 1198.1 / 9.0).abs() < 1e-9);
        assert!((age.std_dev.unwrap() - (1198.1f64 / 9.0).sqrt()).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_nulls_and_nan_are_ignored() {
        let dataset = create_dataset(vec![(
            "v",
            Arc::new(Float64Array::from(vec![
                Some(1.0),
                None,
                Some(f64::NAN),
                Some(3.0),
            ])) as ArrayRef,
        )]);
        let context = AnalysisContext::new(&dataset).unwrap();
        let stats = describe(&context, &["v".to_string()]).await.unwrap();
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].mean, Some(2.0));
        assert_eq!(stats[0].median, Some(2.0));
    }

    #[tokio::test]
    async fn test_all_null_column() {
        let dataset = create_dataset(vec![(
            "v",
            Arc::new(Float64Array::from(vec![None, None])) as ArrayRef,
        )]);
        let context = AnalysisContext::new(&dataset).unwrap();
        let stats = describe(&context, &["v".to_string()]).await.unwrap();
        assert_eq!(stats[0], ColumnStatistics::empty("v"));
    }

    #[tokio::test]
    async fn test_single_value_has_no_spread() {
        let dataset = create_dataset(vec![(
            "v",
            Arc::new(Float64Array::from(vec![4.0])) as ArrayRef,
        )]);
        let context = AnalysisContext::new(&dataset).unwrap();
        let stats = describe(&context, &["v".to_string()]).await.unwrap();
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].median, Some(4.0));
        assert_eq!(stats[0].std_dev, None);
    }
}
