//! Natural key standardization and deduplication

use std::collections::HashSet;

use polars::prelude::*;

use super::error::PipelineResult;
use super::schema::COUNTRY;

/// Outcome of the cleaning stage
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub frame: DataFrame,
    /// Rows discarded because their normalized key was already seen
    pub duplicates_dropped: usize,
}

/// Normalize a single country key: surrounding whitespace removed, upper-cased.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Standardize `country` and keep one record per normalized key.
///
/// The first occurrence in input row order wins; the relative order of the
/// surviving rows is preserved. Null keys are treated as one key of their own.
/// An empty input yields an empty output.
pub fn clean_records(df: &DataFrame) -> PipelineResult<CleanedDataset> {
    let keys: StringChunked = df
        .column(COUNTRY)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|opt| opt.map(normalize_key))
        .collect();
    let keys = keys.with_name(COUNTRY.into());

    let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(keys.len());
    let keep: Vec<bool> = (&keys).into_iter().map(|key| seen.insert(key)).collect();
    let mask = BooleanChunked::new("keep".into(), keep.as_slice());

    let mut normalized = df.clone();
    normalized.with_column(keys.clone().into_series())?;
    let frame = normalized.filter(&mask)?;

    Ok(CleanedDataset {
        duplicates_dropped: df.height() - frame.height(),
        frame,
    })
}
