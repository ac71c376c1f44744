//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use popstat::pipeline::{load_dataset, PipelineConfig};

/// (country, population in millions, area in km2, gdp in billions) using source column names
pub type RawRow<'a> = (&'a str, Option<f64>, Option<f64>, Option<f64>);

pub const SRC_COUNTRY: &str = "Country";
pub const SRC_POPULATION: &str = "Population(in millions)";
pub const SRC_AREA: &str = "Area (km2)";
pub const SRC_GDP: &str = "gdp_billions";

/// Build a raw frame with the upstream column names
pub fn raw_frame(rows: &[RawRow]) -> DataFrame {
    let country: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let population: Vec<Option<f64>> = rows.iter().map(|r| r.1).collect();
    let area: Vec<Option<f64>> = rows.iter().map(|r| r.2).collect();
    let gdp: Vec<Option<f64>> = rows.iter().map(|r| r.3).collect();

    DataFrame::new(vec![
        Column::new(SRC_COUNTRY.into(), country),
        Column::new(SRC_POPULATION.into(), population),
        Column::new(SRC_AREA.into(), area),
        Column::new(SRC_GDP.into(), gdp),
    ])
    .unwrap()
}

/// Fifteen distinct countries with known, distinct populations and GDPs
pub fn fifteen_countries() -> Vec<RawRow<'static>> {
    vec![
        ("India", Some(1428.6), Some(3287263.0), Some(3730.0)),
        ("China", Some(1425.7), Some(9596961.0), Some(17790.0)),
        ("United States", Some(339.9), Some(9833520.0), Some(27360.0)),
        ("Indonesia", Some(277.5), Some(1904569.0), Some(1370.0)),
        ("Pakistan", Some(240.5), Some(881913.0), Some(338.0)),
        ("Nigeria", Some(223.8), Some(923768.0), Some(363.0)),
        ("Brazil", Some(216.4), Some(8515767.0), Some(2170.0)),
        ("Bangladesh", Some(173.0), Some(147570.0), Some(437.0)),
        ("Russia", Some(144.4), Some(17098246.0), Some(2020.0)),
        ("Mexico", Some(128.5), Some(1964375.0), Some(1790.0)),
        ("Ethiopia", Some(126.5), Some(1104300.0), Some(163.0)),
        ("Japan", Some(123.3), Some(377975.0), Some(4210.0)),
        ("Philippines", Some(117.3), Some(300000.0), Some(437.1)),
        ("Egypt", Some(112.7), Some(1002450.0), Some(396.0)),
        ("Germany", Some(83.3), Some(357022.0), Some(4460.0)),
    ]
}

/// Default configuration writing below `root` and reading nothing
pub fn config_for(root: &Path) -> PipelineConfig {
    PipelineConfig {
        output_root: root.to_path_buf(),
        ..Default::default()
    }
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Read back a written destination directory
pub fn read_destination(path: &Path) -> DataFrame {
    load_dataset(path).unwrap().collect().unwrap()
}

pub fn str_values(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

pub fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Countries of a frame, nulls rendered as "<null>"
pub fn countries(df: &DataFrame) -> Vec<String> {
    str_values(df, "country")
        .into_iter()
        .map(|c| c.unwrap_or_else(|| "<null>".to_string()))
        .collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// File names inside a directory, sorted
pub fn dir_entries(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
