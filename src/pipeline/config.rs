//! Pipeline configuration, loaded from a JSON file with defaults for every field

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::loader::{resolve_table, DEFAULT_SOURCE_TABLE};
use super::rank::DEFAULT_TOP_N;
use super::schema::{ColumnMapping, GDP_BILLIONS, POPULATION_MILLIONS};

pub const DEFAULT_WAREHOUSE: &str = "/mnt/warehouse";
pub const DEFAULT_OUTPUT_ROOT: &str = "/mnt/data";
pub const DEFAULT_SILVER_NAME: &str = "global_cleaned";

/// Where the input dataset comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Dotted table name resolved below `warehouse`
    pub table: String,
    pub warehouse: PathBuf,
    /// Explicit file or directory; takes precedence over `table`
    pub path: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_SOURCE_TABLE.to_string(),
            warehouse: PathBuf::from(DEFAULT_WAREHOUSE),
            path: None,
        }
    }
}

impl SourceConfig {
    /// Path to read the input from
    pub fn resolve(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => resolve_table(&self.warehouse, &self.table),
        }
    }
}

/// One gold output: a ranked subset by `metric`, written under `gold/<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldTableConfig {
    pub name: String,
    pub metric: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl GoldTableConfig {
    pub fn new(name: impl Into<String>, metric: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            metric: metric.into(),
            limit,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_TOP_N
}

/// Full configuration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub columns: ColumnMapping,
    pub output_root: PathBuf,
    pub silver_name: String,
    pub gold: Vec<GoldTableConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            columns: ColumnMapping::default(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            silver_name: DEFAULT_SILVER_NAME.to_string(),
            gold: vec![
                GoldTableConfig::new("top10_population", POPULATION_MILLIONS, DEFAULT_TOP_N),
                GoldTableConfig::new("top10_gdp", GDP_BILLIONS, DEFAULT_TOP_N),
            ],
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file. Fields missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce any meaningful output
    pub fn validate(&self) -> Result<()> {
        if self.silver_name.trim().is_empty() {
            anyhow::bail!("silver_name must not be empty");
        }
        for gold in &self.gold {
            if gold.limit == 0 {
                anyhow::bail!("Gold table '{}' has a limit of 0", gold.name);
            }
        }
        Ok(())
    }

    /// Apply the same row limit to every gold table
    pub fn set_top_n(&mut self, n: usize) {
        for gold in &mut self.gold {
            gold.limit = n;
        }
    }
}
