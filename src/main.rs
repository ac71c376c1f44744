//! popstat: silver/gold batch stage CLI
//!
//! Loads the source table, runs the transformation pipeline with progress
//! output and persists the results to the storage tiers.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use polars::prelude::IdxSize;

use popstat::cli::{Cli, Commands};
use popstat::pipeline::{collect_with_stats, execute, load_dataset};
use popstat::report::{ConsoleObserver, RunReport, RunSummary};
use popstat::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_info, print_step_header, print_step_time,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        return match command {
            Commands::Show { path, rows } => run_show(path, *rows),
        };
    }

    let config = cli.resolve_config()?;
    let input = config.source.resolve()?;
    let run_start = Instant::now();

    print_banner(env!("CARGO_PKG_VERSION"));
    let gold_plan: Vec<(String, String, usize)> = config
        .gold
        .iter()
        .map(|g| (g.name.clone(), g.metric.clone(), g.limit))
        .collect();
    print_config(&input, &config.output_root, &gold_plan, cli.dry_run);

    // Step 1: Load
    print_step_header(1, "Load Source");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading source dataset...");
    let (raw, rows, cols, memory_mb) = collect_with_stats(load_dataset(&input)?)?;
    finish_with_success(&spinner, "Dataset loaded");
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    // Steps 2-7: transform and persist
    let mut observer = ConsoleObserver::new(&config.output_root, 2);
    let (outputs, written) = execute(&raw, &config, cli.dry_run, &mut observer)?;

    let mut summary = RunSummary::from_outputs(&outputs);
    summary.add_step_time("load", load_elapsed);
    for (step, elapsed) in observer.step_times() {
        summary.add_step_time(step, *elapsed);
    }
    summary.set_written(written.clone());
    summary.display();

    if let Some(report_path) = &cli.report {
        RunReport::new(
            &input,
            &config.output_root,
            &outputs,
            &written,
            cli.dry_run,
            run_start.elapsed(),
        )?
        .export(report_path)?;
        print_info(&format!("Run report written to {}", report_path.display()));
    }

    print_completion(cli.dry_run);

    Ok(())
}

/// Print the first rows of a dataset
fn run_show(path: &Path, rows: usize) -> Result<()> {
    let df = load_dataset(path)?
        .limit(rows as IdxSize)
        .collect()
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{}", df);
    Ok(())
}
