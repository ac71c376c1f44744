//! Console reporting of a pipeline run

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::ProgressBar;
use polars::prelude::DataFrame;

use crate::pipeline::{
    CleanedDataset, DerivedDataset, GoldTable, ImputedDataset, PipelineError, Stage,
    StageObserver, WrittenTable,
};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_count, print_info,
    print_step_header, print_step_time, print_success, print_warning,
};

/// Degenerate densities listed individually before the output is abbreviated
const MAX_LISTED_DEGENERACIES: usize = 5;

/// Prints step headers, results and timings as the stages run.
///
/// Step numbers continue from `first_step`, so a load step printed by the
/// caller can come first.
pub struct ConsoleObserver {
    output_root: PathBuf,
    first_step: usize,
    spinner: Option<ProgressBar>,
    step_times: Vec<(&'static str, Duration)>,
}

impl ConsoleObserver {
    pub fn new(output_root: &Path, first_step: usize) -> Self {
        Self {
            output_root: output_root.to_path_buf(),
            first_step,
            spinner: None,
            step_times: Vec::new(),
        }
    }

    /// Elapsed time of every finished stage, in run order
    pub fn step_times(&self) -> &[(&'static str, Duration)] {
        &self.step_times
    }

    fn step_number(&self, stage: Stage) -> usize {
        let index = match stage {
            Stage::Normalize => 0,
            Stage::Clean => 1,
            Stage::Impute => 2,
            Stage::Derive => 3,
            Stage::Rank => 4,
            Stage::Write => 5,
        };
        self.first_step + index
    }
}

impl StageObserver for ConsoleObserver {
    fn stage_started(&mut self, stage: Stage) {
        print_step_header(self.step_number(stage) as u8, stage.title());
        if stage == Stage::Write {
            self.spinner = Some(create_spinner("Writing silver and gold tables..."));
        }
    }

    fn stage_finished(&mut self, stage: Stage, elapsed: Duration) {
        self.step_times.push((stage.key(), elapsed));
        if stage != Stage::Write {
            print_step_time(elapsed);
        }
    }

    fn normalized(&mut self, _frame: &DataFrame) {
        print_success("Columns renamed to canonical names");
    }

    fn cleaned(&mut self, cleaned: &CleanedDataset) {
        if cleaned.duplicates_dropped == 0 {
            print_info("No duplicate countries found");
        } else {
            print_count(
                "duplicate country record(s)",
                cleaned.duplicates_dropped,
                Some("(first occurrence kept)"),
            );
            print_success("Dropped duplicate records");
        }
    }

    fn imputed(&mut self, imputed: &ImputedDataset) {
        if imputed.total_filled() == 0 {
            print_info("No missing numeric values");
            return;
        }
        for (column, filled) in imputed.filled.iter().filter(|(_, n)| *n > 0) {
            print_count(
                "missing value(s)",
                *filled,
                Some(&format!("in {} (set to 0)", column)),
            );
        }
    }

    fn derived(&mut self, derived: &DerivedDataset) {
        if derived.degeneracies.is_empty() {
            print_success("Density derived for every record");
            return;
        }
        print_count(
            "record(s) with non-finite density",
            derived.degeneracies.len(),
            Some("(area_km2 is 0; kept as is)"),
        );
        for degeneracy in derived.degeneracies.iter().take(MAX_LISTED_DEGENERACIES) {
            print_warning(&format!(
                "{}: population_density = {}",
                degeneracy.country.as_deref().unwrap_or("<null>"),
                degeneracy.population_density
            ));
        }
        if derived.degeneracies.len() > MAX_LISTED_DEGENERACIES {
            print_warning(&format!(
                "... and {} more",
                derived.degeneracies.len() - MAX_LISTED_DEGENERACIES
            ));
        }
    }

    fn ranked(&mut self, gold: &[GoldTable]) {
        for table in gold {
            print_success(&format!(
                "{}: {} record(s) by {}",
                table.name,
                table.subset.len(),
                table.subset.metric()
            ));
        }
    }

    fn write_skipped(&mut self) {
        print_step_header(self.step_number(Stage::Write) as u8, Stage::Write.title());
        print_info("Dry run: skipping writes");
    }

    fn written(&mut self, written: &[WrittenTable]) {
        if let Some(spinner) = self.spinner.take() {
            finish_with_success(
                &spinner,
                &format!(
                    "Wrote {} table(s) to {}",
                    written.len(),
                    self.output_root.display()
                ),
            );
        }
        if let Some((_, elapsed)) = self.step_times.last() {
            print_step_time(*elapsed);
        }
    }

    fn write_failed(&mut self, err: &PipelineError) {
        let message = match err {
            PipelineError::RollbackIncomplete {
                destination,
                backup,
                ..
            } => format!(
                "Write aborted; {} could not be restored, previous contents are at {}",
                destination.display(),
                backup.display()
            ),
            _ => "Write aborted; no destination was changed".to_string(),
        };
        match self.spinner.take() {
            Some(spinner) => finish_with_warning(&spinner, &message),
            None => print_warning(&message),
        }
    }
}
