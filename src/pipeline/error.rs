//! Error types for the transformation pipeline.
//!
//! Fatal conditions are variants of [`PipelineError`]. Every variant that can
//! be detected before the writer runs is raised before any destination is
//! touched, so a failed run leaves the storage tiers as they were.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// One or more expected source columns are absent from the input.
    #[error("missing expected column(s) {missing:?}; available columns: {available:?}")]
    Schema {
        /// Source column names that were expected but not found
        missing: Vec<String>,
        /// Column names actually present in the input
        available: Vec<String>,
    },

    /// An output references a dataset or column that was never built.
    #[error("output '{output}' cannot be built: {reason}")]
    BuildReference {
        /// Name of the offending output
        output: String,
        /// What the output referenced that does not exist
        reason: String,
    },

    /// Filesystem failure while staging or committing outputs.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A failed write could not put a replaced destination back.
    ///
    /// The previous contents are still at `backup`; the staging directory
    /// holding it is left in place.
    #[error(
        "could not restore {} after a failed write ({cause}): {source}; previous contents kept at {}",
        .destination.display(),
        .backup.display()
    )]
    RollbackIncomplete {
        destination: PathBuf,
        backup: PathBuf,
        /// Failure that triggered the rollback
        cause: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
