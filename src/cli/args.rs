//! Command-line argument definitions using clap

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::PipelineConfig;

/// popstat - clean country statistics into silver and rank them into gold
#[derive(Parser, Debug)]
#[command(name = "popstat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON configuration file. Flags below override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input file or Parquet directory. Takes precedence over --table.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Dotted source table name, resolved below the warehouse directory
    #[arg(long)]
    pub table: Option<String>,

    /// Warehouse directory used to resolve --table
    #[arg(long)]
    pub warehouse: Option<PathBuf>,

    /// Storage root holding the silver/ and gold/ tiers
    #[arg(short, long)]
    pub output_root: Option<PathBuf>,

    /// Number of records kept in every gold table
    #[arg(long, value_parser = validate_top_n)]
    pub top_n: Option<usize>,

    /// Run every stage but write nothing
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the contents of a dataset (file or output directory)
    Show {
        /// File or directory to read
        path: PathBuf,

        /// Number of rows to print
        #[arg(long, default_value = "10")]
        rows: usize,
    },
}

impl Cli {
    /// Build the run configuration: config file (or defaults), then flag overrides.
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = &self.input {
            config.source.path = Some(input.clone());
        }
        if let Some(table) = &self.table {
            config.source.table = table.clone();
        }
        if let Some(warehouse) = &self.warehouse {
            config.source.warehouse = warehouse.clone();
        }
        if let Some(root) = &self.output_root {
            config.output_root = root.clone();
        }
        if let Some(n) = self.top_n {
            config.set_top_n(n);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Validator for top_n parameter
fn validate_top_n(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("top_n must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
