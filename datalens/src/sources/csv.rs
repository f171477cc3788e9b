//! Delimited-text reader.

use std::io::{Read, Seek};
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::Schema;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use tracing::{debug, instrument, warn};

use super::FileFormat;
use crate::dataset::Dataset;
use crate::error::LoadError;

/// Options for configuring CSV reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Escape character (default: None)
    pub escape: Option<u8>,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
    /// Maximum records to read for schema inference (`None`: all of them)
    pub schema_infer_max_records: Option<usize>,
    /// Rows per decoded batch
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            schema_infer_max_records: None,
            batch_size: 8192,
        }
    }
}

impl CsvOptions {
    fn format(&self) -> Format {
        let mut format = Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
            .with_quote(self.quote);
        if let Some(escape) = self.escape {
            format = format.with_escape(escape);
        }
        if let Some(comment) = self.comment {
            format = format.with_comment(comment);
        }
        format
    }
}

/// Reads CSV content into a dataset.
///
/// The schema is inferred from the first `schema_infer_max_records` rows, or
/// from every row when no limit is set; empty fields become nulls. When a
/// bounded inference picked a type that a later row does not fit, the schema
/// is inferred again over the whole input.
#[instrument(skip(reader, options), fields(name = %name))]
pub fn read_csv<R: Read + Seek>(
    mut reader: R,
    name: &str,
    options: &CsvOptions,
) -> Result<Dataset, LoadError> {
    let format = options.format();
    let schema = infer_schema(&mut reader, &format, options.schema_infer_max_records)?;

    let batches = match decode(&mut reader, name, &format, schema.clone(), options)? {
        Ok(batches) => batches,
        Err(e) if options.schema_infer_max_records.is_some() => {
            warn!(error = %e, "CSV rows beyond the inference window do not fit the schema, re-inferring over the whole file");
            let schema = infer_schema(&mut reader, &format, None)?;
            let batches = decode(&mut reader, name, &format, schema.clone(), options)?
                .map_err(|e| LoadError::parse_with_source(FileFormat::Csv, e))?;
            return Dataset::from_batches(name, schema, &batches)
                .map_err(|e| LoadError::parse_with_source(FileFormat::Csv, e));
        }
        Err(e) => return Err(LoadError::parse_with_source(FileFormat::Csv, e)),
    };

    Dataset::from_batches(name, schema, &batches)
        .map_err(|e| LoadError::parse_with_source(FileFormat::Csv, e))
}

fn infer_schema<R: Read + Seek>(
    reader: &mut R,
    format: &Format,
    max_records: Option<usize>,
) -> Result<Arc<Schema>, LoadError> {
    let (schema, records_read) = format
        .infer_schema(&mut *reader, max_records)
        .map_err(|e| LoadError::parse_with_source(FileFormat::Csv, e))?;

    if schema.fields().is_empty() {
        return Err(LoadError::parse(
            FileFormat::Csv,
            "no columns to parse from file",
        ));
    }
    debug!(
        columns = schema.fields().len(),
        records_read, "Inferred CSV schema"
    );
    Ok(Arc::new(schema))
}

/// Decodes the whole input against `schema`. The outer error is an I/O or
/// setup failure; the inner one is a row that does not fit the schema.
fn decode<R: Read + Seek>(
    reader: &mut R,
    name: &str,
    format: &Format,
    schema: Arc<Schema>,
    options: &CsvOptions,
) -> Result<Result<Vec<RecordBatch>, ArrowError>, LoadError> {
    reader.rewind().map_err(|source| LoadError::Io {
        name: name.to_string(),
        source,
    })?;

    let csv_reader = ReaderBuilder::new(schema)
        .with_format(format.clone())
        .with_batch_size(options.batch_size)
        .build(&mut *reader)
        .map_err(|e| LoadError::parse_with_source(FileFormat::Csv, e))?;

    Ok(csv_reader.collect::<Result<Vec<_>, _>>())
}
