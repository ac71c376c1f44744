//! JSON run report export

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{NumericDegeneracy, PipelineOutputs, WrittenTable};

/// Metadata about the run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    pub popstat_version: String,
    /// Resolved input location
    pub input: String,
    pub output_root: String,
    pub dry_run: bool,
}

/// Row counts per stage
#[derive(Debug, Serialize)]
pub struct RowCounts {
    pub input_rows: usize,
    pub duplicates_dropped: usize,
    pub silver_rows: usize,
}

/// A gold table as reported
#[derive(Debug, Serialize)]
pub struct GoldEntry {
    pub name: String,
    pub metric: String,
    pub rows: usize,
    /// Natural keys in rank order
    pub countries: Vec<Option<String>>,
}

/// Complete run report
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub rows: RowCounts,
    pub nulls_imputed: Vec<(String, usize)>,
    /// Records with an infinite or NaN density; non-finite values serialize as null
    pub degeneracies: Vec<NumericDegeneracy>,
    pub gold: Vec<GoldEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<WrittenTable>,
    pub elapsed_ms: u128,
}

impl RunReport {
    pub fn new(
        input: &Path,
        output_root: &Path,
        outputs: &PipelineOutputs,
        written: &[WrittenTable],
        dry_run: bool,
        elapsed: Duration,
    ) -> Result<Self> {
        let gold = outputs
            .gold
            .iter()
            .map(|table| -> Result<GoldEntry> {
                let countries = table
                    .subset
                    .frame()
                    .column(crate::pipeline::COUNTRY)?
                    .as_materialized_series()
                    .str()?
                    .into_iter()
                    .map(|c| c.map(str::to_string))
                    .collect();
                Ok(GoldEntry {
                    name: table.name.clone(),
                    metric: table.subset.metric().to_string(),
                    rows: table.subset.len(),
                    countries,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                popstat_version: env!("CARGO_PKG_VERSION").to_string(),
                input: input.display().to_string(),
                output_root: output_root.display().to_string(),
                dry_run,
            },
            rows: RowCounts {
                input_rows: outputs.stats.input_rows,
                duplicates_dropped: outputs.stats.duplicates_dropped,
                silver_rows: outputs.silver.height(),
            },
            nulls_imputed: outputs.stats.nulls_filled.clone(),
            degeneracies: outputs.stats.degeneracies.clone(),
            gold,
            written: written.to_vec(),
            elapsed_ms: elapsed.as_millis(),
        })
    }

    /// Write the report as pretty-printed JSON
    pub fn export(&self, output_path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize run report to JSON")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

        Ok(())
    }
}
