//! Dataset loader for CSV, Parquet and Parquet directories, plus table lookup

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};

use super::writer::part_files;

/// Default upstream table
pub const DEFAULT_SOURCE_TABLE: &str = "workspace.default.global_population_stats";

/// Load a dataset from a file (CSV or Parquet based on extension) or from a
/// directory of Parquet part files such as the ones this pipeline writes.
pub fn load_dataset(path: &Path) -> Result<LazyFrame> {
    if path.is_dir() {
        let parts = part_files(path)
            .with_context(|| format!("Failed to list dataset directory: {}", path.display()))?;
        if parts.is_empty() {
            anyhow::bail!("No Parquet part files found in {}", path.display());
        }
        let frames = parts
            .iter()
            .map(|part| {
                LazyFrame::scan_parquet(part, Default::default())
                    .with_context(|| format!("Failed to load Parquet file: {}", part.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        return concat(frames, UnionArgs::default())
            .with_context(|| format!("Failed to combine parts of {}", path.display()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Candidate locations for a dotted table name below a warehouse root,
/// in lookup order: `<name>.parquet`, `<name>.csv`, `<name>/`.
pub fn table_candidates(warehouse: &Path, table: &str) -> Vec<PathBuf> {
    let mut base = warehouse.to_path_buf();
    let segments: Vec<&str> = table.split('.').filter(|s| !s.is_empty()).collect();
    let Some((name, namespace)) = segments.split_last() else {
        return Vec::new();
    };
    for segment in namespace {
        base.push(segment);
    }

    vec![
        base.join(format!("{}.parquet", name)),
        base.join(format!("{}.csv", name)),
        base.join(name),
    ]
}

/// Resolve a dotted table name (e.g. `workspace.default.global_population_stats`)
/// to the first existing candidate below `warehouse`.
pub fn resolve_table(warehouse: &Path, table: &str) -> Result<PathBuf> {
    let candidates = table_candidates(warehouse, table);
    if candidates.is_empty() {
        anyhow::bail!("Invalid table name: '{}'", table);
    }

    candidates
        .iter()
        .find(|candidate| candidate.exists())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates.iter().map(|c| c.display().to_string()).collect();
            anyhow::anyhow!("Table '{}' not found. Tried: {}", table, tried.join(", "))
        })
}

/// Collect a dataset and return it with (rows, columns, estimated MB)
pub fn collect_with_stats(lf: LazyFrame) -> Result<(DataFrame, usize, usize, f64)> {
    let df = lf.collect().context("Failed to read dataset")?;
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    Ok((df, rows, cols, memory_mb))
}
