//! Derived metrics: population density
//!
//! Density is `population_millions * 1_000_000 / area_km2`, stored as Float64.
//! A zero area yields an IEEE-754 infinity (or NaN when the population is also
//! zero). Those values are kept in the frame and reported as
//! [`NumericDegeneracy`] warnings instead of being filtered or corrected.

use polars::prelude::*;
use serde::Serialize;

use super::error::PipelineResult;
use super::schema::{AREA_KM2, COUNTRY, POPULATION_DENSITY, POPULATION_MILLIONS};

/// People per million, used to scale `population_millions` to a head count
pub const PEOPLE_PER_MILLION: f64 = 1_000_000.0;

/// A record whose derived density is not a finite number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericDegeneracy {
    pub country: Option<String>,
    pub population_millions: f64,
    pub area_km2: f64,
    pub population_density: f64,
}

/// Outcome of the derivation stage
#[derive(Debug, Clone)]
pub struct DerivedDataset {
    pub frame: DataFrame,
    pub degeneracies: Vec<NumericDegeneracy>,
}

/// Expression computing the density column
pub fn population_density_expr() -> Expr {
    (col(POPULATION_MILLIONS) * lit(PEOPLE_PER_MILLION) / col(AREA_KM2))
        .cast(DataType::Float64)
        .alias(POPULATION_DENSITY)
}

/// Add `population_density` to every record of an imputed frame.
pub fn derive_density(df: &DataFrame) -> PipelineResult<DerivedDataset> {
    let frame = df
        .clone()
        .lazy()
        .with_column(population_density_expr())
        .collect()?;

    let degeneracies = find_degeneracies(&frame)?;
    Ok(DerivedDataset {
        frame,
        degeneracies,
    })
}

/// Collect every record whose density is infinite or NaN.
pub fn find_degeneracies(frame: &DataFrame) -> PipelineResult<Vec<NumericDegeneracy>> {
    let country = frame.column(COUNTRY)?.as_materialized_series().str()?;
    let population = frame.column(POPULATION_MILLIONS)?.as_materialized_series().f64()?;
    let area = frame.column(AREA_KM2)?.as_materialized_series().f64()?;
    let density = frame.column(POPULATION_DENSITY)?.as_materialized_series().f64()?;

    let degeneracies = country
        .into_iter()
        .zip(population)
        .zip(area)
        .zip(density)
        .filter_map(|(((country, population), area), density)| {
            let density = density?;
            if density.is_finite() {
                return None;
            }
            Some(NumericDegeneracy {
                country: country.map(str::to_string),
                population_millions: population.unwrap_or(f64::NAN),
                area_km2: area.unwrap_or(f64::NAN),
                population_density: density,
            })
        })
        .collect();

    Ok(degeneracies)
}
