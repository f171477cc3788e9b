//! Recognition of ISO-8601 date and datetime strings.
//!
//! JSON has no date type and spreadsheets often store dates as text, so both
//! readers run string columns through here. A column is converted only when
//! every non-null value parses.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Date32Array, StringArray, TimestampMicrosecondArray};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static ISO_DATE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}(:\d{2}(\.\d{1,9})?)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .expect("Hard-coded regex pattern should be valid")
});

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// A parsed value and whether it carried a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemporalValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl TemporalValue {
    fn datetime(self) -> NaiveDateTime {
        match self {
            TemporalValue::Date(date) => date.and_time(chrono::NaiveTime::default()),
            TemporalValue::DateTime(datetime) => datetime,
        }
    }
}

/// Parses an ISO-8601 date or datetime. Offsets are normalised to UTC.
pub(crate) fn parse_iso(value: &str) -> Option<TemporalValue> {
    let value = value.trim();
    if !ISO_DATE_LIKE.is_match(value) {
        return None;
    }
    if value.len() == 10 {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(TemporalValue::Date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(TemporalValue::DateTime(datetime.naive_utc()));
    }
    for format in OFFSET_FORMATS {
        if let Ok(datetime) = DateTime::parse_from_str(value, format) {
            return Some(TemporalValue::DateTime(datetime.naive_utc()));
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(TemporalValue::DateTime)
}

/// Days since the Unix epoch, as stored in `Date32`.
pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

/// Builds a temporal array from parsed values.
///
/// All-midnight values become `Date32`; anything with a time of day becomes
/// `Timestamp(Microsecond)`.
pub(crate) fn temporal_array(values: &[Option<NaiveDateTime>]) -> ArrayRef {
    let date_only = values
        .iter()
        .flatten()
        .all(|value| value.time() == chrono::NaiveTime::default());

    if date_only {
        let days: Vec<Option<i32>> = values
            .iter()
            .map(|value| value.map(|v| days_since_epoch(v.date())))
            .collect();
        Arc::new(Date32Array::from(days))
    } else {
        let micros: Vec<Option<i64>> = values
            .iter()
            .map(|value| value.map(|v| v.and_utc().timestamp_micros()))
            .collect();
        Arc::new(TimestampMicrosecondArray::from(micros))
    }
}

/// Converts a string column to a temporal one when every non-null value is an
/// ISO date or datetime. Returns `None` when the column should stay text.
pub(crate) fn convert_string_column(values: &StringArray) -> Option<ArrayRef> {
    if values.null_count() == values.len() {
        return None;
    }

    let mut parsed = Vec::with_capacity(values.len());
    let mut any_time = false;
    for value in values.iter() {
        match value {
            None => parsed.push(None),
            Some(text) => match parse_iso(text)? {
                TemporalValue::Date(date) => parsed.push(Some(TemporalValue::Date(date))),
                TemporalValue::DateTime(datetime) => {
                    any_time = true;
                    parsed.push(Some(TemporalValue::DateTime(datetime)));
                }
            },
        }
    }

    let datetimes: Vec<Option<NaiveDateTime>> = parsed
        .into_iter()
        .map(|value| value.map(TemporalValue::datetime))
        .collect();

    if any_time {
        let micros: Vec<Option<i64>> = datetimes
            .iter()
            .map(|value| value.map(|v| v.and_utc().timestamp_micros()))
            .collect();
        Some(Arc::new(TimestampMicrosecondArray::from(micros)))
    } else {
        Some(temporal_array(&datetimes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{DataType, TimeUnit};

    #[test]
    fn test_parse_iso_variants() {
        assert!(matches!(parse_iso("2024-03-01"), Some(TemporalValue::Date(_))));
        assert!(matches!(
            parse_iso("2024-03-01T10:30:00"),
            Some(TemporalValue::DateTime(_))
        ));
        assert!(matches!(
            parse_iso("2024-03-01 10:30"),
            Some(TemporalValue::DateTime(_))
        ));
        assert!(matches!(
            parse_iso("2024-03-01T10:30:00.250Z"),
            Some(TemporalValue::DateTime(_))
        ));
        assert!(matches!(
            parse_iso("2024-03-01T10:30:00+02:00"),
            Some(TemporalValue::DateTime(_))
        ));
    }

    #[test]
    fn test_parse_iso_rejects_non_dates() {
        assert_eq!(parse_iso("hello"), None);
        assert_eq!(parse_iso("12345"), None);
        assert_eq!(parse_iso("2024-13-01"), None);
        assert_eq!(parse_iso("01/03/2024"), None);
    }

    #[test]
    fn test_offsets_are_normalised_to_utc() {
        let Some(TemporalValue::DateTime(value)) = parse_iso("2024-03-01T02:00:00+02:00") else {
            panic!("expected a datetime");
        };
        assert_eq!(value.to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn test_days_since_epoch() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        assert_eq!(days_since_epoch(date), 10);
    }

    #[test]
    fn test_convert_date_column() {
        let values = StringArray::from(vec![Some("2024-01-01"), None, Some("2024-01-03")]);
        let converted = convert_string_column(&values).unwrap();
        assert_eq!(converted.data_type(), &DataType::Date32);
        assert_eq!(converted.null_count(), 1);
    }

    #[test]
    fn test_convert_datetime_column() {
        let values = StringArray::from(vec!["2024-01-01", "2024-01-01T12:00:00"]);
        let converted = convert_string_column(&values).unwrap();
        assert_eq!(
            converted.data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, None)
        );
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let values = StringArray::from(vec!["2024-01-01", "tomorrow"]);
        assert!(convert_string_column(&values).is_none());

        let values = StringArray::from(vec![None::<&str>, None]);
        assert!(convert_string_column(&values).is_none());
    }
}
