//! Schema normalization: source column names to canonical names

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};

/// Canonical natural key column
pub const COUNTRY: &str = "country";
pub const POPULATION_MILLIONS: &str = "population_millions";
pub const AREA_KM2: &str = "area_km2";
pub const GDP_BILLIONS: &str = "gdp_billions";
/// Derived column, never present on input
pub const POPULATION_DENSITY: &str = "population_density";

/// Numeric canonical columns, in the order the imputer fills them
pub const NUMERIC_COLUMNS: [&str; 3] = [POPULATION_MILLIONS, AREA_KM2, GDP_BILLIONS];

/// Source column names as they appear in the upstream table.
///
/// Country, population and area are required. GDP is optional: when the
/// source has no such column an all-null `gdp_billions` is added instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub country: String,
    pub population_millions: String,
    pub area_km2: String,
    pub gdp_billions: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            country: "Country".to_string(),
            population_millions: "Population(in millions)".to_string(),
            area_km2: "Area (km2)".to_string(),
            gdp_billions: GDP_BILLIONS.to_string(),
        }
    }
}

impl ColumnMapping {
    /// (source, canonical) pairs that must be present in the input
    fn required(&self) -> [(&str, &'static str); 3] {
        [
            (self.country.as_str(), COUNTRY),
            (self.population_millions.as_str(), POPULATION_MILLIONS),
            (self.area_km2.as_str(), AREA_KM2),
        ]
    }
}

/// Rename source columns to their canonical names.
///
/// Other columns are left untouched and keep their position. The numeric
/// canonical columns are cast to Float64 and `country` to String so later
/// stages see one schema regardless of how the source was typed.
///
/// # Errors
/// `PipelineError::Schema` listing every required source column that is absent.
pub fn normalize_schema(df: &DataFrame, mapping: &ColumnMapping) -> PipelineResult<DataFrame> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let has = |name: &str| available.iter().any(|c| c == name);

    let missing: Vec<String> = mapping
        .required()
        .iter()
        .filter(|(source, _)| !has(source))
        .map(|(source, _)| source.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema { missing, available });
    }

    let mut out = df.clone();
    for (source, canonical) in mapping.required() {
        if source != canonical {
            out.rename(source, canonical.into())?;
        }
    }

    if has(&mapping.gdp_billions) {
        if mapping.gdp_billions != GDP_BILLIONS {
            out.rename(&mapping.gdp_billions, GDP_BILLIONS.into())?;
        }
    } else if !has(GDP_BILLIONS) {
        out.with_column(Series::full_null(
            GDP_BILLIONS.into(),
            out.height(),
            &DataType::Float64,
        ))?;
    }

    let typed = out
        .lazy()
        .with_columns([
            col(COUNTRY).cast(DataType::String),
            col(POPULATION_MILLIONS).cast(DataType::Float64),
            col(AREA_KM2).cast(DataType::Float64),
            col(GDP_BILLIONS).cast(DataType::Float64),
        ])
        .collect()?;

    Ok(typed)
}
