//! The in-memory table every analysis runs against.
//!
//! A [`Dataset`] is a name plus a single Arrow [`RecordBatch`]. It is built
//! once by the loader and then only read; analyses take it by reference.

use std::io::Write;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

/// Coarse value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Integer, floating point and decimal values
    Number,
    /// UTF-8 strings
    Text,
    /// Dates and timestamps
    Timestamp,
    /// true/false
    Boolean,
    /// Anything else (all-null, nested, binary, durations, ...)
    Other,
}

impl ValueKind {
    /// Maps an Arrow data type to its value kind.
    pub fn from_data_type(data_type: &DataType) -> Self {
        match data_type {
            dt if dt.is_numeric() => ValueKind::Number,
            DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
                ValueKind::Timestamp
            }
            DataType::Boolean => ValueKind::Boolean,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ValueKind::Text,
            DataType::Dictionary(_, value_type) => Self::from_data_type(value_type),
            _ => ValueKind::Other,
        }
    }
}

/// An immutable, named table.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    batch: RecordBatch,
}

impl Dataset {
    /// Wraps a record batch.
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Concatenates reader output into one dataset.
    pub fn from_batches(
        name: impl Into<String>,
        schema: SchemaRef,
        batches: &[RecordBatch],
    ) -> Result<Self, ArrowError> {
        let batch = concat_batches(&schema, batches)?;
        Ok(Self::new(name, batch))
    }

    /// Name of the dataset, usually the file stem it was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// The underlying Arrow data.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Iterates over `(field, column)` pairs in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (&Field, &ArrayRef)> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|field| field.as_ref())
            .zip(self.batch.columns())
    }

    /// Value kind of the column at `index`.
    pub fn value_kind(&self, index: usize) -> ValueKind {
        ValueKind::from_data_type(self.batch.schema_ref().field(index).data_type())
    }

    /// Names of all columns of the given kind, in schema order.
    pub fn columns_of_kind(&self, kind: ValueKind) -> Vec<String> {
        self.columns()
            .filter(|(field, _)| ValueKind::from_data_type(field.data_type()) == kind)
            .map(|(field, _)| field.name().clone())
            .collect()
    }

    /// The first `max_rows` rows.
    pub fn preview(&self, max_rows: usize) -> RecordBatch {
        self.batch.slice(0, max_rows.min(self.num_rows()))
    }

    /// Approximate in-memory size of the Arrow buffers, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.batch.get_array_memory_size()
    }

    /// Writes the dataset as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ArrowError> {
        let mut csv_writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(writer);
        csv_writer.write(&self.batch)
    }

    /// Replaces the field names, keeping columns and types.
    pub(crate) fn with_column_names(self, names: &[String]) -> Result<Self, ArrowError> {
        let schema = self.batch.schema();
        if names.len() != schema.fields().len() {
            return Err(ArrowError::SchemaError(format!(
                "expected {} column names, got {}",
                schema.fields().len(),
                names.len()
            )));
        }
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .zip(names)
            .map(|(field, name)| field.as_ref().clone().with_name(name.clone()))
            .collect();
        let renamed = Arc::new(arrow::datatypes::Schema::new_with_metadata(
            fields,
            schema.metadata().clone(),
        ));
        let options =
            arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(self.num_rows()));
        let batch =
            RecordBatch::try_new_with_options(renamed, self.batch.columns().to_vec(), &options)?;
        Ok(Self::new(self.name, batch))
    }
}
