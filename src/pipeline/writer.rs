//! Tiered Parquet writer with all-or-nothing overwrite semantics
//!
//! Every destination is a directory `<root>/<tier>/<name>` holding a single
//! part file. A write first stages every table under a hidden directory in the
//! root, then swaps each destination in. If staging fails nothing is touched;
//! if a swap fails the destinations already swapped are restored.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};

/// File name of the single part written into each destination directory
pub const PART_FILE: &str = "part-00000.parquet";

const STAGING_PREFIX: &str = ".staging-";
const PREVIOUS_DIR: &str = "previous";

/// Storage tier of an output table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Cleaned, deduplicated, schema-normalized data
    Silver,
    /// Curated, ranked data ready for consumption
    Gold,
}

impl Tier {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.dir_name())
    }
}

/// A table ready to be persisted
#[derive(Debug, Clone, Copy)]
pub struct TableOutput<'a> {
    pub tier: Tier,
    pub name: &'a str,
    pub frame: &'a DataFrame,
}

/// A table that has been committed to its destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrittenTable {
    pub tier: Tier,
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes output tables below a storage root.
#[derive(Debug, Clone)]
pub struct TierWriter {
    root: PathBuf,
}

struct Committed {
    destination: PathBuf,
    backup: Option<PathBuf>,
}

impl TierWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a table of `tier` named `name` is written to
    pub fn destination(&self, tier: Tier, name: &str) -> PathBuf {
        self.root.join(tier.dir_name()).join(name)
    }

    /// Check that every table maps to its own, well-formed destination.
    pub fn validate(&self, tables: &[TableOutput<'_>]) -> PipelineResult<()> {
        let mut seen = HashSet::with_capacity(tables.len());
        for table in tables {
            let well_formed = !table.name.is_empty()
                && table.name != "."
                && table.name != ".."
                && !table.name.starts_with(STAGING_PREFIX)
                && !table.name.contains(|c: char| c == '/' || c == '\\');
            if !well_formed {
                return Err(PipelineError::BuildReference {
                    output: table.name.to_string(),
                    reason: "destination name must be a single path segment".to_string(),
                });
            }
            if !seen.insert((table.tier, table.name)) {
                return Err(PipelineError::BuildReference {
                    output: table.name.to_string(),
                    reason: format!(
                        "more than one output targets {}",
                        self.destination(table.tier, table.name).display()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Persist every table, replacing each destination's previous contents.
    ///
    /// Either all destinations end up holding the new tables or none of them
    /// is changed.
    pub fn write(&self, tables: &[TableOutput<'_>]) -> PipelineResult<Vec<WrittenTable>> {
        self.validate(tables)?;
        fs::create_dir_all(&self.root).map_err(|e| PipelineError::io(&self.root, e))?;

        let staging = self.root.join(format!(
            "{}{}-{}",
            STAGING_PREFIX,
            Utc::now().format("%Y%m%dT%H%M%S%.6f"),
            std::process::id()
        ));

        let result = self
            .stage_all(&staging, tables)
            .and_then(|()| self.commit_all(&staging, tables));

        discard_staging(&staging, &result);

        result
    }

    fn stage_all(&self, staging: &Path, tables: &[TableOutput<'_>]) -> PipelineResult<()> {
        for table in tables {
            let dir = staging.join(table.tier.dir_name()).join(table.name);
            fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;

            let part = dir.join(PART_FILE);
            let file = fs::File::create(&part).map_err(|e| PipelineError::io(&part, e))?;
            let mut frame = table.frame.clone();
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut frame)?;
        }
        Ok(())
    }

    fn commit_all(
        &self,
        staging: &Path,
        tables: &[TableOutput<'_>],
    ) -> PipelineResult<Vec<WrittenTable>> {
        let mut committed: Vec<Committed> = Vec::with_capacity(tables.len());
        let mut written = Vec::with_capacity(tables.len());

        for table in tables {
            match self.commit_one(staging, table) {
                Ok(entry) => {
                    written.push(WrittenTable {
                        tier: table.tier,
                        name: table.name.to_string(),
                        path: entry.destination.clone(),
                        rows: table.frame.height(),
                    });
                    committed.push(entry);
                }
                Err(err) => {
                    rollback(&committed, &err)?;
                    return Err(err);
                }
            }
        }

        Ok(written)
    }

    fn commit_one(&self, staging: &Path, table: &TableOutput<'_>) -> PipelineResult<Committed> {
        let staged = staging.join(table.tier.dir_name()).join(table.name);
        let destination = self.destination(table.tier, table.name);
        let tier_dir = self.root.join(table.tier.dir_name());
        fs::create_dir_all(&tier_dir).map_err(|e| PipelineError::io(&tier_dir, e))?;

        let backup = if destination.exists() {
            let backup_dir = staging.join(PREVIOUS_DIR).join(table.tier.dir_name());
            fs::create_dir_all(&backup_dir).map_err(|e| PipelineError::io(&backup_dir, e))?;
            let backup = backup_dir.join(table.name);
            fs::rename(&destination, &backup).map_err(|e| PipelineError::io(&destination, e))?;
            Some(backup)
        } else {
            None
        };

        if let Err(e) = fs::rename(&staged, &destination) {
            let err = PipelineError::io(&destination, e);
            if let Some(backup) = &backup {
                fs::rename(backup, &destination).map_err(|source| {
                    PipelineError::RollbackIncomplete {
                        destination: destination.clone(),
                        backup: backup.clone(),
                        cause: err.to_string(),
                        source,
                    }
                })?;
            }
            return Err(err);
        }

        Ok(Committed {
            destination,
            backup,
        })
    }
}

/// Undo committed swaps, newest first.
///
/// Every entry is attempted. The first destination whose previous contents
/// could not be put back is reported; its backup stays where it is.
fn rollback(committed: &[Committed], cause: &PipelineError) -> PipelineResult<()> {
    let mut unrestored = None;
    for entry in committed.iter().rev() {
        match &entry.backup {
            Some(backup) => {
                if let Err(source) = restore(backup, &entry.destination) {
                    unrestored.get_or_insert(PipelineError::RollbackIncomplete {
                        destination: entry.destination.clone(),
                        backup: backup.clone(),
                        cause: cause.to_string(),
                        source,
                    });
                }
            }
            // Destination did not exist before this write
            None => {
                let _ = fs::remove_dir_all(&entry.destination);
            }
        }
    }
    unrestored.map_or(Ok(()), Err)
}

fn restore(backup: &Path, destination: &Path) -> std::io::Result<()> {
    if destination.exists() {
        fs::remove_dir_all(destination)?;
    }
    fs::rename(backup, destination)
}

/// Remove the staging directory unless it still holds a backup that could not
/// be restored.
fn discard_staging<T>(staging: &Path, result: &PipelineResult<T>) {
    if !matches!(result, Err(PipelineError::RollbackIncomplete { .. })) {
        let _ = fs::remove_dir_all(staging);
    }
}

/// Paths of every part file below a destination directory, sorted.
pub fn part_files(destination: &Path) -> PipelineResult<Vec<PathBuf>> {
    let entries = fs::read_dir(destination).map_err(|e| PipelineError::io(destination, e))?;
    let mut parts = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PipelineError::io(destination, e))?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("parquet") {
            parts.push(path);
        }
    }
    parts.sort();
    Ok(parts)
}
