//! Error types for the datalens profiling library.
//!
//! Loading and analysing are separate failure domains: [`LoadError`] covers
//! everything that can go wrong turning a file into a [`Dataset`](crate::dataset::Dataset),
//! while [`AnalysisError`](crate::analyzers::AnalysisError) covers a single
//! analysis run. [`InsightError`] wraps both for callers that want one type.

use thiserror::Error;

use crate::analyzers::AnalysisError;
use crate::sources::FileFormat;

/// Failure while reading or parsing an input file.
///
/// Every parse failure is surfaced as one of these variants; no partially
/// loaded table is ever returned.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be read.
    #[error("Failed to read '{name}': {source}")]
    Io {
        /// Path or upload name of the source
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The source exceeds the configured size limit.
    #[error("File '{name}' is {size} bytes, exceeding the limit of {limit} bytes")]
    FileTooLarge {
        /// Path or upload name of the source
        name: String,
        /// Size of the source in bytes
        size: u64,
        /// Configured maximum in bytes
        limit: u64,
    },

    /// The parser for the dispatched format rejected the content.
    #[error("Failed to load file: {format} parse error: {message}")]
    Parse {
        /// Format the content was parsed as
        format: FileFormat,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON content parsed, but is not a table.
    #[error("Failed to load file: unsupported JSON shape: {0}")]
    UnsupportedShape(String),

    /// The spreadsheet has no worksheet to read.
    #[error("Failed to load file: workbook contains no worksheets")]
    EmptyWorkbook,
}

impl LoadError {
    /// Creates a parse error without an underlying source.
    pub fn parse(format: FileFormat, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a parse error that keeps the underlying cause.
    pub fn parse_with_source<E>(format: FileFormat, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            format,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// The umbrella error type for datalens.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Loading a dataset failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// An analysis run failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from I/O operations outside of loading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A user-supplied identifier cannot be used safely.
    #[error("Security error: {0}")]
    Security(String),
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A type alias for `Result<T, InsightError>`.
pub type Result<T> = std::result::Result<T, InsightError>;
