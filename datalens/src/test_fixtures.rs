//! Common in-memory datasets for unit tests.

use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::dataset::Dataset;

/// Builds a dataset from named columns. All fields are nullable.
pub fn create_dataset(columns: Vec<(&str, ArrayRef)>) -> Dataset {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .expect("fixture columns must have equal length");
    Dataset::new("fixture", batch)
}

/// `[age: Int64, city: Utf8, signup: Date32]`, 10 rows, 3 cities, no nulls,
/// no duplicate rows.
pub fn create_customer_dataset() -> Dataset {
    let ages: Vec<i64> = vec![23, 35, 41, 29, 52, 38, 27, 45, 33, 60];
    let cities = vec![
        "Paris", "Lyon", "Nice", "Paris", "Lyon", "Nice", "Paris", "Lyon", "Nice", "Paris",
    ];
    // 2024-01-01 onwards, one day apart
    let signups: Vec<i32> = (0..10).map(|day| 19723 + day).collect();

    create_dataset(vec![
        ("age", Arc::new(Int64Array::from(ages)) as ArrayRef),
        ("city", Arc::new(StringArray::from(cities)) as ArrayRef),
        ("signup", Arc::new(Date32Array::from(signups)) as ArrayRef),
    ])
}

/// One numeric column of `len` rows where the first `spikes` rows are 1000.0
/// and the rest are 0.0, plus a text label per row.
pub fn create_spike_dataset(len: usize, spikes: usize) -> Dataset {
    let values: Vec<f64> = (0..len)
        .map(|i| if i < spikes { 1000.0 } else { 0.0 })
        .collect();
    let labels: Vec<String> = (0..len).map(|i| format!("row-{i}")).collect();
    create_dataset(vec![
        ("value", Arc::new(Float64Array::from(values)) as ArrayRef),
        ("label", Arc::new(StringArray::from(labels)) as ArrayRef),
    ])
}
