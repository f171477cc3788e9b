//! Load, summarize and generate insights in one call.

use arrow::record_batch::RecordBatch;
use serde::Serialize;
use tracing::{info, instrument};

use crate::analyzers::{DatasetProfiler, Summary};
use crate::config::InsightConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::insights::{Insight, InsightEngine};
use crate::logging::{truncate_field, MAX_LOGGED_FIELD_LENGTH};
use crate::sources::{DataLoader, SourceInput};

/// Everything shown right after an upload.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    #[serde(skip)]
    pub dataset: Dataset,
    /// First `max_preview_rows` rows of the dataset
    #[serde(skip)]
    pub preview: RecordBatch,
    pub summary: Summary,
    pub insights: Vec<Insight>,
}

/// Loads `input` and profiles it with the default insight rules.
///
/// The configuration is validated first; an invalid one is reported as
/// [`InsightError::Configuration`](crate::error::InsightError::Configuration)
/// before any file is read.
#[instrument(skip(input, config), fields(source = %truncate_field(&input.name(), MAX_LOGGED_FIELD_LENGTH)))]
pub fn profile(input: SourceInput, config: &InsightConfig) -> Result<Profile> {
    config.validate()?;

    let dataset = DataLoader::new(config.clone()).load(input)?;
    let summary = DatasetProfiler::from_config(config).summarize(&dataset)?;
    let insights = InsightEngine::default().generate_all(&dataset, &summary)?;

    info!(
        rows = summary.row_count,
        columns = summary.column_count,
        insights = insights.len(),
        "Profiled dataset"
    );
    Ok(Profile {
        preview: dataset.preview(config.max_preview_rows),
        dataset,
        summary,
        insights,
    })
}
