//! Top-N selection by a metric column

use polars::prelude::*;

use super::error::{PipelineError, PipelineResult};
use super::schema::COUNTRY;

/// Default number of records kept in a ranked subset
pub const DEFAULT_TOP_N: usize = 10;

/// An ordered top-N view of the dataset, highest metric first.
#[derive(Debug, Clone)]
pub struct RankedSubset {
    metric: String,
    frame: DataFrame,
}

impl RankedSubset {
    /// Column the subset is ranked by
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}

/// Sort by `metric` descending and keep the first `n` records.
///
/// Ties on the metric are broken by `country` ascending so the output order is
/// reproducible. Null metric values sort last. The result holds
/// `min(n, df.height())` records.
///
/// # Errors
/// `PipelineError::BuildReference` when `metric` is not a column of `df`.
pub fn rank_by(df: &DataFrame, metric: &str, n: usize) -> PipelineResult<RankedSubset> {
    if df.get_column_index(metric).is_none() {
        return Err(PipelineError::BuildReference {
            output: format!("top{}_{}", n, metric),
            reason: format!("metric column '{}' was never built", metric),
        });
    }

    let sort_options = SortMultipleOptions::default()
        .with_order_descending_multi([true, false])
        .with_nulls_last(true)
        .with_maintain_order(true);

    let frame = df.sort([metric, COUNTRY], sort_options)?.head(Some(n));

    Ok(RankedSubset {
        metric: metric.to_string(),
        frame,
    })
}
