//! Static configuration for loading and analysing datasets.
//!
//! All values are load-time constants for a session. Defaults mirror the
//! limits the upload widget advertises (200 MB, CSV/Excel/JSON).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};
use crate::security::InputValidator;

/// Default upper bound on the size of an input file (200 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 200 * 1024 * 1024;

/// Default cardinality limit for categorical columns.
pub const DEFAULT_MAX_CATEGORIES: usize = 50;

/// Default absolute z-score above which a value is an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Default number of rows shown in a preview.
pub const DEFAULT_MAX_PREVIEW_ROWS: usize = 1000;

/// Default |r| above which a correlation pair is reported as strong.
pub const DEFAULT_STRONG_CORRELATION_THRESHOLD: f64 = 0.7;

/// Configuration shared by the loader and the analyzers.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use datalens::config::InsightConfig;
///
/// let config = InsightConfig::from_json_str(r#"{ "max_categories": 20 }"#).unwrap();
/// assert_eq!(config.max_categories, 20);
/// assert_eq!(config.outlier_threshold, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Extensions the upload widget accepts (lowercase, without dot)
    pub allowed_extensions: Vec<String>,
    /// Maximum input size in bytes
    pub max_file_size_bytes: u64,
    /// Maximum distinct values for a categorical column
    pub max_categories: usize,
    /// Absolute z-score threshold for outlier detection
    pub outlier_threshold: f64,
    /// Maximum rows returned by a preview
    pub max_preview_rows: usize,
    /// Absolute Pearson coefficient above which a pair is "strong"
    pub strong_correlation_threshold: f64,
    /// Rows read to infer a CSV schema; `None` reads the whole file
    pub csv_schema_infer_max_records: Option<usize>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["csv", "xlsx", "xls", "json"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            max_categories: DEFAULT_MAX_CATEGORIES,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            max_preview_rows: DEFAULT_MAX_PREVIEW_ROWS,
            strong_correlation_threshold: DEFAULT_STRONG_CORRELATION_THRESHOLD,
            csv_schema_infer_max_records: None,
        }
    }
}

impl InsightConfig {
    /// Parses a configuration from a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file in JSON format.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Sets the maximum input size in bytes.
    pub fn with_max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    /// Sets the categorical cardinality limit.
    pub fn with_max_categories(mut self, max_categories: usize) -> Self {
        self.max_categories = max_categories;
        self
    }

    /// Sets the z-score threshold used by outlier detection.
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Sets the number of preview rows.
    pub fn with_max_preview_rows(mut self, rows: usize) -> Self {
        self.max_preview_rows = rows;
        self
    }

    /// Sets the strong-correlation threshold.
    pub fn with_strong_correlation_threshold(mut self, threshold: f64) -> Self {
        self.strong_correlation_threshold = threshold;
        self
    }

    /// Bounds how many CSV records are read for schema inference.
    pub fn with_csv_schema_infer_max_records(mut self, records: usize) -> Self {
        self.csv_schema_infer_max_records = Some(records);
        self
    }

    /// Returns true when the file name carries one of the allowed extensions.
    ///
    /// The loader does not enforce this list; unknown extensions are parsed as
    /// CSV. It exists for upload widgets that filter what users can pick.
    pub fn is_allowed_extension(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    /// Checks that every limit and threshold is usable.
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_threshold(self.outlier_threshold, "outlier_threshold")?;
        if self.outlier_threshold <= 0.0 {
            return Err(InsightError::Configuration(format!(
                "outlier_threshold must be positive, got {}",
                self.outlier_threshold
            )));
        }
        InputValidator::validate_percentage(
            self.strong_correlation_threshold,
            "strong_correlation_threshold",
        )?;
        if self.max_file_size_bytes == 0 {
            return Err(InsightError::Configuration(
                "max_file_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_preview_rows == 0 {
            return Err(InsightError::Configuration(
                "max_preview_rows must be greater than zero".to_string(),
            ));
        }
        if self.csv_schema_infer_max_records == Some(0) {
            return Err(InsightError::Configuration(
                "csv_schema_infer_max_records must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
