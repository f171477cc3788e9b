//! Spreadsheet reader for `.xlsx` / `.xls` workbooks.
//!
//! Only the first worksheet is read and its first row is the header. Column
//! types come from the cell kinds below the header.

use std::io::{Read, Seek};
use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use calamine::{open_workbook_auto_from_rs, Data, DataType as _, Reader};
use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use super::temporal::{parse_iso, temporal_array, TemporalValue};
use super::FileFormat;
use crate::dataset::Dataset;
use crate::error::LoadError;

/// Arrow type chosen for a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellColumnType {
    Int64,
    Float64,
    Boolean,
    Temporal,
    Utf8,
}

/// Reads the first worksheet of a workbook into a dataset.
#[instrument(skip(reader), fields(name = %name))]
pub fn read_excel<RS>(reader: RS, name: &str) -> Result<Dataset, LoadError>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(reader)
        .map_err(|e| LoadError::parse(FileFormat::Excel, e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)?
        .map_err(|e| LoadError::parse(FileFormat::Excel, e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        debug!("First worksheet is empty");
        let batch = RecordBatch::new_empty(Arc::new(Schema::empty()));
        return Ok(Dataset::new(name, batch));
    };

    let headers: Vec<String> = header_row.iter().map(header_text).collect();
    let body: Vec<&[Data]> = rows.collect();
    debug!(
        columns = headers.len(),
        rows = body.len(),
        "Read worksheet cells"
    );

    let mut fields = Vec::with_capacity(headers.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(headers.len());
    for (index, header) in headers.iter().enumerate() {
        let cells: Vec<&Data> = body
            .iter()
            .map(|row| row.get(index).unwrap_or(&Data::Empty))
            .collect();
        let column = build_column(&cells);
        fields.push(Field::new(header, column.data_type().clone(), true));
        columns.push(column);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(body.len()));
    let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .map_err(|e| LoadError::parse_with_source(FileFormat::Excel, e))?;
    Ok(Dataset::new(name, batch))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

/// True for cells that hold no value.
fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    if let Some(datetime) = cell.as_datetime() {
        return Some(datetime);
    }
    let text = cell.get_datetime_iso().or_else(|| cell.get_string())?;
    parse_iso(text).map(|value| match value {
        TemporalValue::Date(date) => date.and_time(chrono::NaiveTime::default()),
        TemporalValue::DateTime(datetime) => datetime,
    })
}

fn infer_column_type(cells: &[&Data]) -> CellColumnType {
    let values: Vec<&Data> = cells.iter().copied().filter(|c| !is_blank(c)).collect();
    if values.is_empty() {
        return CellColumnType::Utf8;
    }

    let all_numbers = values
        .iter()
        .all(|c| matches!(c, Data::Int(_) | Data::Float(_)));
    if all_numbers {
        let all_whole = values.iter().all(|c| match c {
            Data::Float(f) => f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15,
            _ => true,
        });
        return if all_whole {
            CellColumnType::Int64
        } else {
            CellColumnType::Float64
        };
    }

    if values.iter().all(|c| matches!(c, Data::Bool(_))) {
        return CellColumnType::Boolean;
    }

    let temporal_candidates = values.iter().all(|c| {
        matches!(
            c,
            Data::DateTime(_) | Data::DateTimeIso(_) | Data::String(_)
        )
    });
    if temporal_candidates && values.iter().all(|c| cell_datetime(c).is_some()) {
        return CellColumnType::Temporal;
    }

    CellColumnType::Utf8
}

fn cell_text(cell: &Data) -> Option<String> {
    if is_blank(cell) {
        return None;
    }
    match cell {
        Data::String(text) => Some(text.clone()),
        Data::DateTime(_) => cell_datetime(cell).map(|dt| dt.to_string()),
        other => Some(other.to_string()),
    }
}

fn build_column(cells: &[&Data]) -> ArrayRef {
    match infer_column_type(cells) {
        CellColumnType::Int64 => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(i) => Some(*i),
                    Data::Float(f) => Some(*f as i64),
                    _ => None,
                })
                .collect();
            Arc::new(Int64Array::from(values))
        }
        CellColumnType::Float64 => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(i) => Some(*i as f64),
                    Data::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Arc::new(Float64Array::from(values))
        }
        CellColumnType::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Arc::new(BooleanArray::from(values))
        }
        CellColumnType::Temporal => {
            let values: Vec<Option<NaiveDateTime>> = cells
                .iter()
                .map(|c| if is_blank(c) { None } else { cell_datetime(c) })
                .collect();
            temporal_array(&values)
        }
        CellColumnType::Utf8 => {
            if cells.iter().all(|c| is_blank(c)) {
                return new_null_array(&DataType::Utf8, cells.len());
            }
            let values: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
            Arc::new(StringArray::from(values))
        }
    }
}
