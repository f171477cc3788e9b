//! Column-level numeric helpers shared by the synchronous analyzers.

use std::collections::HashSet;

use arrow::array::{Array, ArrayRef, Float16Array, Float32Array, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};

use super::errors::{AnalysisError, AnalysisResult};

/// Per-row missing flags: logical nulls plus NaN in floating point columns.
pub(crate) fn missing_flags(array: &dyn Array) -> Vec<bool> {
    let mut flags: Vec<bool> = match array.logical_nulls() {
        Some(nulls) => nulls.iter().map(|valid| !valid).collect(),
        None => vec![false; array.len()],
    };

    macro_rules! mark_nan {
        ($array_type:ty) => {
            if let Some(values) = array.as_any().downcast_ref::<$array_type>() {
                for (flag, value) in flags.iter_mut().zip(values.values().iter()) {
                    if value.is_nan() {
                        *flag = true;
                    }
                }
            }
        };
    }

    match array.data_type() {
        DataType::Float16 => mark_nan!(Float16Array),
        DataType::Float32 => mark_nan!(Float32Array),
        DataType::Float64 => mark_nan!(Float64Array),
        _ => {}
    }
    flags
}

/// Number of missing cells in a column.
pub fn missing_count(array: &dyn Array) -> usize {
    missing_flags(array).into_iter().filter(|missing| *missing).count()
}

/// Casts a numeric column to `Float64`.
pub(crate) fn as_f64(array: &ArrayRef) -> AnalysisResult<Float64Array> {
    let casted = cast(array, &DataType::Float64)?;
    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| AnalysisError::invalid_data("cast to Float64 produced another type"))
}

/// Non-null, non-NaN values of a numeric column, in row order.
pub(crate) fn present_values(array: &ArrayRef) -> AnalysisResult<Vec<f64>> {
    let values = as_f64(array)?;
    Ok(values.iter().flatten().filter(|v| !v.is_nan()).collect())
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by n).
pub(crate) fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / values.len() as f64).sqrt())
}

/// Sample variance (divides by n - 1). Undefined below two values.
pub(crate) fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Quantile of sorted values using linear interpolation between the two
/// closest ranks.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - position.floor();
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Counts distinct non-missing values, stopping once `limit` is exceeded.
///
/// With a limit the result is capped at `limit + 1`, which is enough to tell
/// whether a column stays under a cardinality threshold.
pub(crate) fn distinct_count(array: &ArrayRef, limit: Option<usize>) -> AnalysisResult<usize> {
    let converter = RowConverter::new(vec![SortField::new(array.data_type().clone())])?;
    let rows = converter.convert_columns(&[array.clone()])?;
    let missing = missing_flags(array.as_ref());

    let mut seen = HashSet::new();
    for (index, is_missing) in missing.iter().enumerate() {
        if *is_missing {
            continue;
        }
        seen.insert(rows.row(index));
        if let Some(limit) = limit {
            if seen.len() > limit {
                break;
            }
        }
    }
    Ok(seen.len())
}

/// Counts rows equal to an earlier row across all columns.
///
/// Nulls compare equal to nulls. First occurrences are not counted.
pub(crate) fn duplicate_row_count(batch: &RecordBatch) -> AnalysisResult<usize> {
    if batch.num_columns() == 0 || batch.num_rows() < 2 {
        return Ok(0);
    }

    let fields = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|field| SortField::new(field.data_type().clone()))
        .collect();
    let converter = RowConverter::new(fields)?;
    let rows = converter.convert_columns(batch.columns())?;

    let mut seen = HashSet::with_capacity(rows.num_rows());
    let duplicates = rows.iter().filter(|row| !seen.insert(*row)).count();
    Ok(duplicates)
}
