//! Null imputation for the canonical numeric columns

use polars::prelude::*;

use super::error::PipelineResult;
use super::schema::NUMERIC_COLUMNS;

/// Literal used in place of a missing numeric value
pub const NUMERIC_DEFAULT: f64 = 0.0;

/// Outcome of the imputation stage
#[derive(Debug, Clone)]
pub struct ImputedDataset {
    pub frame: DataFrame,
    /// (column, number of nulls and NaNs replaced), one entry per canonical numeric column present
    pub filled: Vec<(String, usize)>,
}

impl ImputedDataset {
    pub fn total_filled(&self) -> usize {
        self.filled.iter().map(|(_, n)| n).sum()
    }
}

/// Replace missing values in `population_millions`, `area_km2` and
/// `gdp_billions` with 0.
///
/// Both nulls and, for float columns, NaNs count as missing. Any other column
/// is passed through as is, nulls included. Canonical columns absent from the
/// frame are skipped.
pub fn impute_nulls(df: &DataFrame) -> PipelineResult<ImputedDataset> {
    let mut filled = Vec::with_capacity(NUMERIC_COLUMNS.len());
    let mut fills: Vec<Expr> = Vec::with_capacity(NUMERIC_COLUMNS.len());

    for name in NUMERIC_COLUMNS {
        let Some(column) = df.column(name).ok() else {
            continue;
        };

        let series = column.as_materialized_series();
        let (nan_count, expr) = if series.dtype().is_float() {
            let nans = series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .filter(|v| v.is_some_and(f64::is_nan))
                .count();
            (nans, col(name).fill_nan(lit(NUMERIC_DEFAULT)))
        } else {
            (0, col(name))
        };

        filled.push((name.to_string(), series.null_count() + nan_count));
        fills.push(expr.fill_null(lit(NUMERIC_DEFAULT)));
    }

    let frame = df.clone().lazy().with_columns(fills).collect()?;

    Ok(ImputedDataset { frame, filled })
}
