//! DataFusion session over a loaded dataset.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

use super::errors::{AnalysisError, AnalysisResult};
use crate::dataset::Dataset;
use crate::security::SqlSecurity;

/// Name the dataset is registered under.
pub const TABLE_NAME: &str = "data";

/// A session context with the dataset registered as table `data`.
///
/// Building one is cheap: the batch is shared, not copied.
pub struct AnalysisContext {
    ctx: SessionContext,
    dataset_name: String,
}

impl std::fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("dataset_name", &self.dataset_name)
            .field("table", &TABLE_NAME)
            .finish()
    }
}

impl AnalysisContext {
    /// Registers the dataset with a fresh session.
    #[instrument(skip(dataset), fields(dataset = %dataset.name()))]
    pub fn new(dataset: &Dataset) -> AnalysisResult<Self> {
        let ctx = SessionContext::new();
        let provider = MemTable::try_new(dataset.schema(), vec![vec![dataset.batch().clone()]])?;
        ctx.register_table(TABLE_NAME, Arc::new(provider))?;
        debug!(rows = dataset.num_rows(), "Registered dataset");
        Ok(Self {
            ctx,
            dataset_name: dataset.name().to_string(),
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// Runs a query and collects every result batch.
    pub async fn query(&self, sql: &str) -> AnalysisResult<Vec<RecordBatch>> {
        debug!(sql = %sql, "Executing analysis query");
        let df = self.ctx.sql(sql).await?;
        Ok(df.collect().await?)
    }
}

/// Quotes a column name for use in SQL text.
pub(crate) fn quoted(column: &str) -> AnalysisResult<String> {
    SqlSecurity::escape_identifier(column)
        .map_err(|e| AnalysisError::invalid_data(format!("Invalid column name '{column}': {e}")))
}

/// Reads row `row` of column `column` across result batches as `f64`.
///
/// Nulls, NaN and infinities come back as `None`.
pub(crate) fn f64_at(batches: &[RecordBatch], column: usize, row: usize) -> AnalysisResult<Option<f64>> {
    let mut offset = row;
    for batch in batches {
        if offset < batch.num_rows() {
            let values = to_f64(batch.column(column))?;
            if values.is_null(offset) {
                return Ok(None);
            }
            let value = values.value(offset);
            return Ok(value.is_finite().then_some(value));
        }
        offset -= batch.num_rows();
    }
    Ok(None)
}

fn to_f64(array: &ArrayRef) -> AnalysisResult<Float64Array> {
    let casted = cast(array, &DataType::Float64)?;
    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| AnalysisError::invalid_data("query result is not numeric"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_customer_dataset;

    #[tokio::test]
    async fn test_dataset_is_queryable() {
        let context = AnalysisContext::new(&create_customer_dataset()).unwrap();
        let batches = context
            .query("SELECT COUNT(*), MAX(age) FROM data")
            .await
            .unwrap();
        assert_eq!(f64_at(&batches, 0, 0).unwrap(), Some(10.0));
        assert_eq!(f64_at(&batches, 1, 0).unwrap(), Some(60.0));
        assert_eq!(f64_at(&batches, 1, 5).unwrap(), None);
    }

    #[tokio::test]
    async fn test_quoted_names_with_spaces() {
        let context = AnalysisContext::new(&create_customer_dataset()).unwrap();
        let sql = format!("SELECT MIN({}) FROM data", quoted("age").unwrap());
        let batches = context.query(&sql).await.unwrap();
        assert_eq!(f64_at(&batches, 0, 0).unwrap(), Some(23.0));
        assert!(quoted("").is_err());
    }
}
