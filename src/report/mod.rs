//! Report module - console progress, run summary and JSON run report

pub mod run_report;
pub mod stage_log;
pub mod summary;

pub use run_report::*;
pub use stage_log::*;
pub use summary::*;
