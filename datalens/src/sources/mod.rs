//! Loading uploaded files into a [`Dataset`].
//!
//! Dispatch is purely extension based: `.csv` goes to the delimited-text
//! reader, `.xlsx`/`.xls` to the spreadsheet reader and `.json` to the JSON
//! reader. Any other extension is read as CSV. Both paths and in-memory
//! uploads are first turned into a seekable in-memory cursor.
//!
//! # Examples
//!
//! ```rust,no_run
//! use datalens::config::InsightConfig;
//! use datalens::sources::{DataLoader, SourceInput};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = DataLoader::new(InsightConfig::default());
//! let dataset = loader.load(SourceInput::path("data/customers.csv"))?;
//! println!("{} rows", dataset.num_rows());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::InsightConfig;
use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::logging::{truncate_field, MAX_LOGGED_FIELD_LENGTH};
use crate::security::MAX_IDENTIFIER_LENGTH;

mod csv;
mod excel;
mod json;
pub(crate) mod temporal;

pub use csv::{read_csv, CsvOptions};
pub use excel::read_excel;
pub use json::{read_json, JsonOptions};

/// Parser a source is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Excel,
    Json,
}

impl FileFormat {
    /// Picks the parser from the lowercase extension of `name`.
    ///
    /// ```rust
    /// use datalens::sources::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_name("sales.XLSX"), FileFormat::Excel);
    /// assert_eq!(FileFormat::from_name("records.json"), FileFormat::Json);
    /// assert_eq!(FileFormat::from_name("export.txt"), FileFormat::Csv);
    /// assert_eq!(FileFormat::from_name("no_extension"), FileFormat::Csv);
    /// ```
    pub fn from_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xls") => FileFormat::Excel,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Csv,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Excel => "Excel",
            FileFormat::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// Where the data comes from.
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// A file on the local filesystem
    Path(PathBuf),
    /// An upload that is already in memory, with its original file name
    Bytes { name: String, bytes: Vec<u8> },
}

impl SourceInput {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        SourceInput::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        SourceInput::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// File name used for extension dispatch and error messages.
    pub fn name(&self) -> String {
        match self {
            SourceInput::Path(path) => path.display().to_string(),
            SourceInput::Bytes { name, .. } => name.clone(),
        }
    }

    /// File stem used as the dataset name.
    fn dataset_name(&self) -> String {
        let name = self.name();
        Path::new(&name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .unwrap_or(name)
    }
}

/// Turns sources into datasets according to an [`InsightConfig`].
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    config: InsightConfig,
    csv_options: Option<CsvOptions>,
    json_options: JsonOptions,
}

impl DataLoader {
    pub fn new(config: InsightConfig) -> Self {
        Self {
            config,
            csv_options: None,
            json_options: JsonOptions::default(),
        }
    }

    /// Overrides the CSV dialect. Without this, defaults plus the configured
    /// inference depth are used.
    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv_options = Some(options);
        self
    }

    pub fn with_json_options(mut self, options: JsonOptions) -> Self {
        self.json_options = options;
        self
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Loads a path or an upload into a dataset.
    #[instrument(skip(self, input), fields(source = %truncate_field(&input.name(), MAX_LOGGED_FIELD_LENGTH)))]
    pub fn load(&self, input: SourceInput) -> Result<Dataset, LoadError> {
        let name = input.name();
        let dataset_name = input.dataset_name();
        let format = FileFormat::from_name(&name);

        info!(format = %format, "Loading dataset");
        let cursor = self.read_source(input)?;

        let dataset = match format {
            FileFormat::Csv => {
                let options = self.csv_options.clone().unwrap_or_else(|| CsvOptions {
                    schema_infer_max_records: self.config.csv_schema_infer_max_records,
                    ..CsvOptions::default()
                });
                read_csv(cursor, &dataset_name, &options)?
            }
            FileFormat::Excel => read_excel(cursor, &dataset_name)?,
            FileFormat::Json => read_json(cursor, &dataset_name, &self.json_options)?,
        };

        let dataset = normalize_dataset(dataset, format)?;
        info!(
            format = %format,
            rows = dataset.num_rows(),
            columns = dataset.num_columns(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Convenience wrapper for [`SourceInput::Path`].
    pub fn load_path(&self, path: impl Into<PathBuf>) -> Result<Dataset, LoadError> {
        self.load(SourceInput::path(path))
    }

    /// Convenience wrapper for [`SourceInput::Bytes`].
    pub fn load_bytes(
        &self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<Dataset, LoadError> {
        self.load(SourceInput::bytes(name, bytes))
    }

    /// Reads the source into memory, enforcing the size limit first.
    fn read_source(&self, input: SourceInput) -> Result<Cursor<Vec<u8>>, LoadError> {
        let limit = self.config.max_file_size_bytes;
        let bytes = match input {
            SourceInput::Path(path) => {
                let name = path.display().to_string();
                let size = std::fs::metadata(&path)
                    .map_err(|source| LoadError::Io {
                        name: name.clone(),
                        source,
                    })?
                    .len();
                check_size(&name, size, limit)?;
                std::fs::read(&path).map_err(|source| LoadError::Io { name, source })?
            }
            SourceInput::Bytes { name, bytes } => {
                check_size(&name, bytes.len() as u64, limit)?;
                bytes
            }
        };
        debug!(bytes = bytes.len(), "Source read into memory");
        Ok(Cursor::new(bytes))
    }
}

fn check_size(name: &str, size: u64, limit: u64) -> Result<(), LoadError> {
    if size > limit {
        return Err(LoadError::FileTooLarge {
            name: name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Longest header kept as is; leaves room for a de-duplication suffix below
/// the SQL identifier limit.
const MAX_HEADER_LENGTH: usize = MAX_IDENTIFIER_LENGTH - 24;

/// Makes header names non-empty, unique and usable as SQL identifiers.
///
/// NUL characters are dropped and headers longer than 1000 bytes are cut at
/// a character boundary. An empty header becomes `column_<n>` (1-based
/// position). A repeated header gets the first free `.1`, `.2`, ... suffix.
///
/// ```rust
/// use datalens::sources::normalize_headers;
///
/// let names = normalize_headers(["id", "", "id", "id"].map(String::from));
/// assert_eq!(names, vec!["id", "column_2", "id.1", "id.2"]);
/// ```
pub fn normalize_headers(headers: impl IntoIterator<Item = String>) -> Vec<String> {
    let headers: Vec<String> = headers
        .into_iter()
        .enumerate()
        .map(|(index, header)| {
            let header = shorten_header(header.replace('\0', ""));
            if header.trim().is_empty() {
                format!("column_{}", index + 1)
            } else {
                header
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut names = Vec::with_capacity(headers.len());
    for header in headers {
        let mut candidate = header.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{header}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

fn shorten_header(mut header: String) -> String {
    if header.len() > MAX_HEADER_LENGTH {
        let mut end = MAX_HEADER_LENGTH;
        while !header.is_char_boundary(end) {
            end -= 1;
        }
        header.truncate(end);
    }
    header
}

fn normalize_dataset(dataset: Dataset, format: FileFormat) -> Result<Dataset, LoadError> {
    let current = dataset.column_names();
    let normalized = normalize_headers(current.iter().cloned());
    if normalized == current {
        return Ok(dataset);
    }
    debug!(columns = ?normalized, "Normalized column headers");
    dataset
        .with_column_names(&normalized)
        .map_err(|e| LoadError::parse_with_source(format, e))
}
