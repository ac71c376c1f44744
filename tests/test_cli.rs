//! Tests for CLI argument parsing and the popstat binary

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use popstat::cli::{Cli, Commands};
use popstat::pipeline::{DEFAULT_OUTPUT_ROOT, DEFAULT_SOURCE_TABLE, PART_FILE};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_source_csv(dir: &Path) -> PathBuf {
    let csv_path = dir.join("global_population_stats.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "Country,Population(in millions),Area (km2),gdp_billions").unwrap();
    writeln!(file, "brazil ,214.3,8515767,1920").unwrap();
    writeln!(file, " BRAZIL,1.0,1,1").unwrap();
    writeln!(file, "Japan,125,,4200").unwrap();
    writeln!(file, "Peru,34.4,1285216,268").unwrap();
    csv_path
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from(["popstat"]);
    let config = cli.resolve_config().unwrap();

    assert!(!cli.dry_run);
    assert!(cli.report.is_none());
    assert_eq!(config.source.table, DEFAULT_SOURCE_TABLE);
    assert_eq!(config.output_root, PathBuf::from(DEFAULT_OUTPUT_ROOT));
    assert_eq!(config.gold.len(), 2);
    assert!(config.gold.iter().all(|g| g.limit == 10));
}

#[test]
fn test_cli_overrides() {
    let cli = Cli::parse_from([
        "popstat",
        "-i",
        "data.csv",
        "-o",
        "/tmp/lake",
        "--top-n",
        "5",
        "--dry-run",
    ]);
    let config = cli.resolve_config().unwrap();

    assert!(cli.dry_run);
    assert_eq!(config.source.path, Some(PathBuf::from("data.csv")));
    assert_eq!(config.output_root, PathBuf::from("/tmp/lake"));
    assert!(config.gold.iter().all(|g| g.limit == 5));
}

#[test]
fn test_cli_rejects_zero_top_n() {
    let result = Cli::try_parse_from(["popstat", "--top-n", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_show_subcommand() {
    let cli = Cli::parse_from(["popstat", "show", "/mnt/data/gold/top10_gdp", "--rows", "3"]);

    match cli.command {
        Some(Commands::Show { path, rows }) => {
            assert_eq!(path, PathBuf::from("/mnt/data/gold/top10_gdp"));
            assert_eq!(rows, 3);
        }
        other => panic!("expected show command, got {other:?}"),
    }
}

#[test]
fn test_config_file_then_flags() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("popstat.json");
    std::fs::write(
        &config_path,
        r#"{
            "output_root": "/from/file",
            "silver_name": "countries",
            "columns": { "country": "nation" },
            "gold": [{ "name": "top5_density", "metric": "population_density", "limit": 5 }]
        }"#,
    )
    .unwrap();

    let cli = Cli::parse_from([
        "popstat",
        "--config",
        config_path.to_str().unwrap(),
        "--table",
        "lake.raw.stats",
    ]);
    let config = cli.resolve_config().unwrap();

    assert_eq!(config.output_root, PathBuf::from("/from/file"));
    assert_eq!(config.silver_name, "countries");
    assert_eq!(config.columns.country, "nation");
    assert_eq!(config.columns.area_km2, "Area (km2)");
    assert_eq!(config.source.table, "lake.raw.stats");
    assert_eq!(config.gold.len(), 1);
}

#[test]
fn test_binary_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = write_source_csv(temp_dir.path());
    let root = temp_dir.path().join("lake");
    let report = temp_dir.path().join("report.json");

    Command::cargo_bin("popstat")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&root)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("popstat run complete"));

    for destination in ["silver/global_cleaned", "gold/top10_population", "gold/top10_gdp"] {
        assert!(root.join(destination).join(PART_FILE).exists(), "{}", destination);
    }

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["metadata"]["dry_run"], false);
    assert_eq!(report["rows"]["input_rows"], 4);
    assert_eq!(report["rows"]["duplicates_dropped"], 1);
    assert_eq!(report["rows"]["silver_rows"], 3);
    assert_eq!(report["degeneracies"][0]["country"], "JAPAN");
    assert_eq!(report["gold"][0]["countries"][0], "BRAZIL");
}

#[test]
fn test_binary_resolves_table_from_warehouse() {
    let temp_dir = TempDir::new().unwrap();
    let namespace = temp_dir.path().join("warehouse/workspace/default");
    std::fs::create_dir_all(&namespace).unwrap();
    write_source_csv(&namespace);
    let root = temp_dir.path().join("lake");

    Command::cargo_bin("popstat")
        .unwrap()
        .arg("--warehouse")
        .arg(temp_dir.path().join("warehouse"))
        .arg("-o")
        .arg(&root)
        .assert()
        .success();

    assert!(root.join("gold/top10_gdp").join(PART_FILE).exists());
}

#[test]
fn test_binary_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = write_source_csv(temp_dir.path());
    let root = temp_dir.path().join("lake");
    let report = temp_dir.path().join("report.json");

    Command::cargo_bin("popstat")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&root)
        .arg("--dry-run")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run complete"));

    assert!(!root.exists());
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["metadata"]["dry_run"], true);
    assert!(report.get("written").is_none());
}

#[test]
fn test_binary_reports_missing_columns() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("bad.csv");
    std::fs::write(&csv_path, "Country,Population(in millions)\nPeru,34.4\n").unwrap();
    let root = temp_dir.path().join("lake");

    Command::cargo_bin("popstat")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing expected column"));

    assert!(!root.exists());
}

#[test]
fn test_binary_show_prints_rows() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = write_source_csv(temp_dir.path());
    let root = temp_dir.path().join("lake");

    Command::cargo_bin("popstat")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&root)
        .assert()
        .success();

    Command::cargo_bin("popstat")
        .unwrap()
        .arg("show")
        .arg(root.join("gold/top10_population"))
        .assert()
        .success()
        .stdout(predicate::str::contains("BRAZIL"));
}
