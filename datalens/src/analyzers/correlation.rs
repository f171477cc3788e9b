//! Pairwise Pearson correlation between numeric columns.
//!
//! Each pair is computed over the rows where both values are present, so a
//! missing value in one column does not drop the row from unrelated pairs.
//! Deviations are taken from the pair means before they are multiplied, which
//! keeps large offsets (timestamps, identifiers) from cancelling out.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::context::{f64_at, quoted, AnalysisContext, TABLE_NAME};
use super::errors::AnalysisResult;

/// Message reported when fewer than two numeric columns exist.
pub const INSUFFICIENT_COLUMNS_MESSAGE: &str =
    "Need at least 2 numeric columns for correlation analysis.";

/// Square matrix of Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` is the coefficient of `columns[i]` and `columns[j]`;
    /// `None` when undefined (no spread or fewer than two shared rows)
    pub values: Vec<Vec<Option<f64>>>,
}

/// A pair of columns and their coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub coefficient: f64,
}

impl CorrelationPair {
    /// Coefficient rounded to three decimals for display.
    pub fn rounded(&self) -> f64 {
        (self.coefficient * 1000.0).round() / 1000.0
    }
}

impl CorrelationMatrix {
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == left)?;
        let j = self.columns.iter().position(|c| c == right)?;
        self.values[i][j]
    }

    /// Upper-triangle pairs with `|r|` strictly above `threshold`, in
    /// column order.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                if let Some(coefficient) = self.values[i][j] {
                    if coefficient.abs() > threshold {
                        pairs.push(CorrelationPair {
                            left: self.columns[i].clone(),
                            right: self.columns[j].clone(),
                            coefficient,
                        });
                    }
                }
            }
        }
        pairs
    }
}

/// Outcome of a correlation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CorrelationOutcome {
    Matrix(CorrelationMatrix),
    /// Fewer than two numeric columns; carries a user-facing message
    InsufficientColumns { message: String },
}

impl CorrelationOutcome {
    pub fn matrix(&self) -> Option<&CorrelationMatrix> {
        match self {
            CorrelationOutcome::Matrix(matrix) => Some(matrix),
            CorrelationOutcome::InsufficientColumns { .. } => None,
        }
    }
}

/// Computes the correlation matrix of `columns`.
#[instrument(skip(context, columns), fields(dataset = %context.dataset_name(), columns = columns.len()))]
pub async fn correlate(
    context: &AnalysisContext,
    columns: &[String],
) -> AnalysisResult<CorrelationOutcome> {
    if columns.len() < 2 {
        debug!("Not enough numeric columns for correlation");
        return Ok(CorrelationOutcome::InsufficientColumns {
            message: INSUFFICIENT_COLUMNS_MESSAGE.to_string(),
        });
    }

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let coefficient = pearson(context, &columns[i], &columns[j]).await?;
            values[i][j] = coefficient;
            values[j][i] = coefficient;
        }
    }

    Ok(CorrelationOutcome::Matrix(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }))
}

async fn pearson(context: &AnalysisContext, left: &str, right: &str) -> AnalysisResult<Option<f64>> {
    let x = format!("CAST({} AS DOUBLE)", quoted(left)?);
    let y = format!("CAST({} AS DOUBLE)", quoted(right)?);

    let sql = format!(
        "WITH pairs AS (
            SELECT {x} as x, {y} as y
            FROM {TABLE_NAME}
            WHERE {x} IS NOT NULL AND {y} IS NOT NULL
              AND NOT isnan({x}) AND NOT isnan({y})
         ),
         means AS (
            SELECT COUNT(*) as n, AVG(x) as mean_x, AVG(y) as mean_y FROM pairs
         )
         SELECT
            n,
            mean_x,
            mean_y,
            SUM((x - mean_x) * (y - mean_y)) as co_moment,
            SUM((x - mean_x) * (x - mean_x)) as moment_x,
            SUM((y - mean_y) * (y - mean_y)) as moment_y
         FROM pairs CROSS JOIN means
         GROUP BY n, mean_x, mean_y"
    );
    let batches = context.query(&sql).await?;

    let n = f64_at(&batches, 0, 0)?.unwrap_or(0.0);
    if n < 2.0 {
        return Ok(None);
    }
    let moments = (
        f64_at(&batches, 1, 0)?,
        f64_at(&batches, 2, 0)?,
        f64_at(&batches, 3, 0)?,
        f64_at(&batches, 4, 0)?,
        f64_at(&batches, 5, 0)?,
    );
    let (Some(mean_x), Some(mean_y), Some(co_moment), Some(moment_x), Some(moment_y)) = moments
    else {
        return Ok(None);
    };

    let coefficient = PairMoments {
        n,
        mean_x,
        mean_y,
        co_moment,
        moment_x,
        moment_y,
    }
    .coefficient();
    debug!(left = %left, right = %right, coefficient = ?coefficient, "Computed correlation");
    Ok(coefficient)
}

/// Central moments of one column pair.
#[derive(Debug, Clone, Copy)]
struct PairMoments {
    n: f64,
    mean_x: f64,
    mean_y: f64,
    /// Σ (x - x̄)(y - ȳ)
    co_moment: f64,
    /// Σ (x - x̄)²
    moment_x: f64,
    /// Σ (y - ȳ)²
    moment_y: f64,
}

impl PairMoments {
    /// `None` when either column has no spread.
    ///
    /// A column counts as spread-free when its population standard deviation
    /// is at most `1e-12 * max(1, |mean|)`, the same floor outlier detection
    /// uses.
    fn coefficient(&self) -> Option<f64> {
        let floor = |mean: f64| self.n * (1e-12 * mean.abs().max(1.0)).powi(2);
        if self.moment_x <= floor(self.mean_x) || self.moment_y <= floor(self.mean_y) {
            return None;
        }
        let r = self.co_moment / (self.moment_x.sqrt() * self.moment_y.sqrt());
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    }
}
