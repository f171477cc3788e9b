//! JSON records reader.
//!
//! Accepted shapes:
//! - an array of records: `[{"a": 1}, {"a": 2}]`
//! - an object of equal-length column arrays: `{"a": [1, 2], "b": [3, 4]}`
//! - newline-delimited records, one object per line

use std::io::Read;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::json::reader::infer_json_schema_from_iterator;
use arrow::json::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::temporal::convert_string_column;
use super::FileFormat;
use crate::dataset::Dataset;
use crate::error::LoadError;

/// Options for configuring JSON reading.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Convert string columns holding only ISO dates to temporal columns
    pub parse_dates: bool,
    /// Records decoded per batch
    pub batch_size: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            parse_dates: true,
            batch_size: 8192,
        }
    }
}

/// Reads JSON content into a dataset.
#[instrument(skip(reader, options), fields(name = %name))]
pub fn read_json<R: Read>(
    mut reader: R,
    name: &str,
    options: &JsonOptions,
) -> Result<Dataset, LoadError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| LoadError::parse_with_source(FileFormat::Json, e))?;

    let records = parse_records(&text)?;
    debug!(records = records.len(), "Parsed JSON records");

    let schema = infer_json_schema_from_iterator(records.iter().map(Ok))
        .map_err(|e| LoadError::parse_with_source(FileFormat::Json, e))?;
    let schema = Arc::new(schema);

    let mut decoder = ReaderBuilder::new(schema.clone())
        .with_batch_size(options.batch_size.max(1))
        .with_coerce_primitive(true)
        .build_decoder()
        .map_err(|e| LoadError::parse_with_source(FileFormat::Json, e))?;

    let mut batches = Vec::new();
    for chunk in records.chunks(options.batch_size.max(1)) {
        decoder
            .serialize(chunk)
            .map_err(|e| LoadError::parse_with_source(FileFormat::Json, e))?;
        if let Some(batch) = decoder
            .flush()
            .map_err(|e| LoadError::parse_with_source(FileFormat::Json, e))?
        {
            batches.push(batch);
        }
    }

    let dataset = Dataset::from_batches(name, schema, &batches)
        .map_err(|e| LoadError::parse_with_source(FileFormat::Json, e))?;

    if options.parse_dates {
        convert_date_columns(dataset)
    } else {
        Ok(dataset)
    }
}

/// Flattens any accepted shape into a list of record objects.
fn parse_records(text: &str) -> Result<Vec<Value>, LoadError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => {
            if let Some(position) = items.iter().position(|item| !item.is_object()) {
                return Err(LoadError::UnsupportedShape(format!(
                    "array element {position} is not an object"
                )));
            }
            Ok(items)
        }
        Ok(Value::Object(columns)) => records_from_columns(columns),
        Ok(other) => Err(LoadError::UnsupportedShape(format!(
            "expected an array of records, found {}",
            json_type_name(&other)
        ))),
        Err(document_error) => {
            let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
            if lines.len() < 2 {
                return Err(LoadError::parse_with_source(FileFormat::Json, document_error));
            }
            lines
                .into_iter()
                .map(|line| match serde_json::from_str::<Value>(line) {
                    Ok(value @ Value::Object(_)) => Ok(value),
                    Ok(other) => Err(LoadError::UnsupportedShape(format!(
                        "line holds {}, expected an object",
                        json_type_name(&other)
                    ))),
                    Err(e) => Err(LoadError::parse_with_source(FileFormat::Json, e)),
                })
                .collect()
        }
    }
}

/// `{"a": [1, 2], "b": [3, 4]}` -> `[{"a": 1, "b": 3}, {"a": 2, "b": 4}]`
fn records_from_columns(columns: Map<String, Value>) -> Result<Vec<Value>, LoadError> {
    let mut arrays = Vec::with_capacity(columns.len());
    for (key, value) in columns {
        match value {
            Value::Array(values) => arrays.push((key, values)),
            other => {
                return Err(LoadError::UnsupportedShape(format!(
                    "column '{key}' holds {}, expected an array",
                    json_type_name(&other)
                )))
            }
        }
    }

    let len = arrays.first().map(|(_, values)| values.len()).unwrap_or(0);
    if let Some((key, values)) = arrays.iter().find(|(_, values)| values.len() != len) {
        return Err(LoadError::UnsupportedShape(format!(
            "column '{key}' has {} values, expected {len}",
            values.len()
        )));
    }

    let mut records: Vec<Map<String, Value>> = (0..len).map(|_| Map::new()).collect();
    for (key, values) in arrays {
        for (record, value) in records.iter_mut().zip(values) {
            record.insert(key.clone(), value);
        }
    }
    Ok(records.into_iter().map(Value::Object).collect())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn convert_date_columns(dataset: Dataset) -> Result<Dataset, LoadError> {
    let batch = dataset.batch();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    let mut converted_any = false;

    for (field, column) in dataset.columns() {
        let converted = match column.data_type() {
            DataType::Utf8 => column
                .as_any()
                .downcast_ref::<StringArray>()
                .and_then(convert_string_column),
            _ => None,
        };
        match converted {
            Some(array) => {
                debug!(column = %field.name(), data_type = %array.data_type(), "Converted ISO strings");
                fields.push(Field::new(field.name(), array.data_type().clone(), true));
                columns.push(array);
                converted_any = true;
            }
            None => {
                fields.push(field.clone());
                columns.push(column.clone());
            }
        }
    }

    if !converted_any {
        return Ok(dataset);
    }

    let options =
        arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .map_err(|e| LoadError::parse_with_source(FileFormat::Json, e))?;
    Ok(Dataset::new(dataset.name(), batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use std::io::Cursor;

    fn read(text: &str) -> Result<Dataset, LoadError> {
        read_json(Cursor::new(text.as_bytes().to_vec()), "test", &JsonOptions::default())
    }

    #[test]
    fn test_array_of_records() {
        let dataset = read(r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#).unwrap();
        assert_eq!(dataset.num_rows(), 2);
        assert_eq!(dataset.column_names(), vec!["id", "name"]);
        let ids = dataset
            .column("id")
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.values().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_missing_keys_and_nulls_are_null() {
        let dataset = read(r#"[{"a": 1, "b": "x"}, {"a": null}, {"b": "z"}]"#).unwrap();
        assert_eq!(dataset.num_rows(), 3);
        assert_eq!(dataset.column("a").unwrap().null_count(), 2);
        assert_eq!(dataset.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_object_of_columns() {
        let dataset = read(r#"{"a": [1, 2, 3], "b": ["x", "y", "z"]}"#).unwrap();
        assert_eq!(dataset.num_rows(), 3);
        assert_eq!(dataset.num_columns(), 2);
    }

    #[test]
    fn test_uneven_columns_rejected() {
        let result = read(r#"{"a": [1, 2, 3], "b": ["x"]}"#);
        assert!(matches!(result, Err(LoadError::UnsupportedShape(_))));
    }

    #[test]
    fn test_newline_delimited_records() {
        let dataset = read("{\"a\": 1}\n{\"a\": 2}\n\n{\"a\": 3}\n").unwrap();
        assert_eq!(dataset.num_rows(), 3);
    }

    #[test]
    fn test_scalar_and_nested_arrays_rejected() {
        assert!(matches!(read("42"), Err(LoadError::UnsupportedShape(_))));
        assert!(matches!(read("[1, 2, 3]"), Err(LoadError::UnsupportedShape(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = read(r#"[{"a": 1"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                format: FileFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_iso_strings_become_dates() {
        let dataset = read(r#"[{"d": "2024-01-01", "t": "x"}, {"d": "2024-02-01", "t": "y"}]"#)
            .unwrap();
        assert_eq!(dataset.schema().field(0).data_type(), &DataType::Date32);
        assert_eq!(dataset.schema().field(1).data_type(), &DataType::Utf8);

        let options = JsonOptions {
            parse_dates: false,
            ..Default::default()
        };
        let raw = read_json(
            Cursor::new(br#"[{"d": "2024-01-01"}]"#.to_vec()),
            "raw",
            &options,
        )
        .unwrap();
        assert_eq!(raw.schema().field(0).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_mixed_scalars_are_coerced_to_text() {
        let dataset = read(r#"[{"v": 1}, {"v": "two"}]"#).unwrap();
        assert_eq!(dataset.schema().field(0).data_type(), &DataType::Utf8);
        assert_eq!(dataset.column("v").unwrap().null_count(), 0);
    }

    #[test]
    fn test_empty_array_has_no_rows() {
        let dataset = read("[]").unwrap();
        assert_eq!(dataset.num_rows(), 0);
        assert_eq!(dataset.num_columns(), 0);
    }
}
