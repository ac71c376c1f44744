//! Run summary table

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{PipelineOutputs, WrittenTable};

/// Summary of one pipeline run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub input_rows: usize,
    pub duplicates_dropped: usize,
    pub nulls_imputed: usize,
    pub degenerate_densities: usize,
    pub silver_rows: usize,
    /// (name, metric, rows)
    pub gold: Vec<(String, String, usize)>,
    pub written: Vec<WrittenTable>,
    pub step_times: Vec<(String, Duration)>,
}

impl RunSummary {
    pub fn from_outputs(outputs: &PipelineOutputs) -> Self {
        Self {
            input_rows: outputs.stats.input_rows,
            duplicates_dropped: outputs.stats.duplicates_dropped,
            nulls_imputed: outputs.stats.nulls_filled.iter().map(|(_, n)| n).sum(),
            degenerate_densities: outputs.stats.degeneracies.len(),
            silver_rows: outputs.silver.height(),
            gold: outputs
                .gold
                .iter()
                .map(|g| (g.name.clone(), g.subset.metric().to_string(), g.subset.len()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn set_written(&mut self, written: Vec<WrittenTable>) {
        self.written = written;
    }

    pub fn add_step_time(&mut self, step: &str, elapsed: Duration) {
        self.step_times.push((step.to_string(), elapsed));
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Input Rows"), Cell::new(self.input_rows)]);
        table.add_row(vec![
            Cell::new("🗑️  Duplicates Dropped"),
            Cell::new(self.duplicates_dropped).fg(if self.duplicates_dropped == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("🩹 Nulls Imputed"),
            Cell::new(self.nulls_imputed),
        ]);
        table.add_row(vec![
            Cell::new("⚠️  Non-finite Densities"),
            Cell::new(self.degenerate_densities).fg(if self.degenerate_densities == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("✅ Silver Rows"),
            Cell::new(self.silver_rows)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        for (name, metric, rows) in &self.gold {
            table.add_row(vec![
                Cell::new(format!("🏅 {} ({})", name, metric)),
                Cell::new(rows).fg(Color::Cyan),
            ]);
        }

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.written.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("💾").cyan(),
                style("OUTPUTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for table in &self.written {
                println!(
                    "      {} {:<6} {} {}",
                    style("•").dim(),
                    table.tier,
                    table.path.display(),
                    style(format!("({} rows)", table.rows)).dim()
                );
            }
        }

        if !self.step_times.is_empty() {
            let total: Duration = self.step_times.iter().map(|(_, d)| *d).sum();
            println!();
            println!(
                "    {} {}",
                style("⏱").cyan(),
                style(format!("Total time: {:.2?}", total)).dim()
            );
        }
    }
}
