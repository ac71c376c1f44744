//! Stage composition: raw frame in, silver and gold tables out
//!
//! [`execute`] is the one place the stages are chained. Callers that want to
//! report progress pass a [`StageObserver`]; it sees every intermediate result
//! and the time each stage took, without being able to change them.

use std::time::{Duration, Instant};

use polars::prelude::*;

use super::cleaner::{clean_records, CleanedDataset};
use super::config::{GoldTableConfig, PipelineConfig};
use super::error::{PipelineError, PipelineResult};
use super::imputer::{impute_nulls, ImputedDataset};
use super::metrics::{derive_density, DerivedDataset, NumericDegeneracy};
use super::rank::{rank_by, RankedSubset};
use super::schema::normalize_schema;
use super::writer::{TableOutput, Tier, TierWriter, WrittenTable};

/// A gold destination together with the subset that fills it
#[derive(Debug, Clone)]
pub struct GoldTable {
    pub name: String,
    pub subset: RankedSubset,
}

/// Counters collected while the stages run
#[derive(Debug, Clone, Default)]
pub struct StageStats {
    pub input_rows: usize,
    pub duplicates_dropped: usize,
    pub nulls_filled: Vec<(String, usize)>,
    pub degeneracies: Vec<NumericDegeneracy>,
}

/// Everything a run produces before it is persisted
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub silver_name: String,
    pub silver: DataFrame,
    pub gold: Vec<GoldTable>,
    pub stats: StageStats,
}

impl PipelineOutputs {
    /// Silver table first, then gold tables in configuration order
    pub fn tables(&self) -> Vec<TableOutput<'_>> {
        let mut tables = Vec::with_capacity(self.gold.len() + 1);
        tables.push(TableOutput {
            tier: Tier::Silver,
            name: &self.silver_name,
            frame: &self.silver,
        });
        tables.extend(self.gold.iter().map(|gold| TableOutput {
            tier: Tier::Gold,
            name: &gold.name,
            frame: gold.subset.frame(),
        }));
        tables
    }

    pub fn gold_table(&self, name: &str) -> Option<&GoldTable> {
        self.gold.iter().find(|gold| gold.name == name)
    }
}

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Clean,
    Impute,
    Derive,
    Rank,
    Write,
}

impl Stage {
    /// Short lowercase name used in timing tables
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Clean => "clean",
            Stage::Impute => "impute",
            Stage::Derive => "derive",
            Stage::Rank => "rank",
            Stage::Write => "write",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Normalize => "Normalize Schema",
            Stage::Clean => "Clean Records",
            Stage::Impute => "Impute Missing Values",
            Stage::Derive => "Derive Population Density",
            Stage::Rank => "Rank Gold Tables",
            Stage::Write => "Write Tiers",
        }
    }
}

/// Receives stage boundaries and intermediate results during [`execute`].
///
/// Every method defaults to doing nothing.
pub trait StageObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_finished(&mut self, _stage: Stage, _elapsed: Duration) {}
    fn normalized(&mut self, _frame: &DataFrame) {}
    fn cleaned(&mut self, _cleaned: &CleanedDataset) {}
    fn imputed(&mut self, _imputed: &ImputedDataset) {}
    fn derived(&mut self, _derived: &DerivedDataset) {}
    fn ranked(&mut self, _gold: &[GoldTable]) {}
    /// Called instead of `written` on a dry run
    fn write_skipped(&mut self) {}
    fn written(&mut self, _written: &[WrittenTable]) {}
    fn write_failed(&mut self, _err: &PipelineError) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct SilentObserver;

impl StageObserver for SilentObserver {}

/// Build one ranked subset per configured gold table.
///
/// Every gold output is an explicit `rank_by` call. A metric that is not a
/// column of `derived` fails the whole build with `BuildReference`, naming the
/// gold table that asked for it.
pub fn build_gold_tables(
    derived: &DataFrame,
    gold: &[GoldTableConfig],
) -> PipelineResult<Vec<GoldTable>> {
    gold.iter()
        .map(|table| {
            let subset = rank_by(derived, &table.metric, table.limit).map_err(|err| match err {
                PipelineError::BuildReference { reason, .. } => PipelineError::BuildReference {
                    output: table.name.clone(),
                    reason,
                },
                other => other,
            })?;
            Ok(GoldTable {
                name: table.name.clone(),
                subset,
            })
        })
        .collect()
}

/// Run `stage` between the observer's start and finish notifications.
fn timed<T>(
    observer: &mut dyn StageObserver,
    stage: Stage,
    run: impl FnOnce() -> PipelineResult<T>,
) -> PipelineResult<T> {
    observer.stage_started(stage);
    let start = Instant::now();
    let value = run()?;
    observer.stage_finished(stage, start.elapsed());
    Ok(value)
}

/// Run every transformation stage, reporting to `observer`.
pub fn transform_observed(
    raw: &DataFrame,
    config: &PipelineConfig,
    observer: &mut dyn StageObserver,
) -> PipelineResult<PipelineOutputs> {
    let normalized = timed(observer, Stage::Normalize, || {
        normalize_schema(raw, &config.columns)
    })?;
    observer.normalized(&normalized);

    let cleaned = timed(observer, Stage::Clean, || clean_records(&normalized))?;
    observer.cleaned(&cleaned);

    let imputed = timed(observer, Stage::Impute, || impute_nulls(&cleaned.frame))?;
    observer.imputed(&imputed);

    let derived = timed(observer, Stage::Derive, || derive_density(&imputed.frame))?;
    observer.derived(&derived);

    let gold = timed(observer, Stage::Rank, || {
        build_gold_tables(&derived.frame, &config.gold)
    })?;
    observer.ranked(&gold);

    Ok(PipelineOutputs {
        silver_name: config.silver_name.clone(),
        silver: derived.frame,
        gold,
        stats: StageStats {
            input_rows: raw.height(),
            duplicates_dropped: cleaned.duplicates_dropped,
            nulls_filled: imputed.filled,
            degeneracies: derived.degeneracies,
        },
    })
}

/// Run every transformation stage on a raw input frame.
pub fn transform(raw: &DataFrame, config: &PipelineConfig) -> PipelineResult<PipelineOutputs> {
    transform_observed(raw, config, &mut SilentObserver)
}

/// Transform `raw` and, unless `dry_run`, persist every output below
/// `config.output_root`.
///
/// Nothing is written unless every stage succeeds. A dry run returns no
/// written tables.
pub fn execute(
    raw: &DataFrame,
    config: &PipelineConfig,
    dry_run: bool,
    observer: &mut dyn StageObserver,
) -> PipelineResult<(PipelineOutputs, Vec<WrittenTable>)> {
    let outputs = transform_observed(raw, config, observer)?;

    if dry_run {
        observer.write_skipped();
        return Ok((outputs, Vec::new()));
    }

    let writer = TierWriter::new(&config.output_root);
    let written = timed(observer, Stage::Write, || {
        writer.write(&outputs.tables())
    })
    .inspect_err(|err| observer.write_failed(err))?;
    observer.written(&written);

    Ok((outputs, written))
}

/// Transform `raw` and persist every output below `config.output_root`.
pub fn run_pipeline(
    raw: &DataFrame,
    config: &PipelineConfig,
) -> PipelineResult<(PipelineOutputs, Vec<WrittenTable>)> {
    execute(raw, config, false, &mut SilentObserver)
}
