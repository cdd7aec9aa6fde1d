//! Pipeline error types.

use crate::report::PipelineReport;

/// Terminal errors surfaced to the caller of a pipeline run.
///
/// Per-file failures are never surfaced individually; they are captured in
/// the report and rolled up into one aggregate error here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{failed} of {total} files failed to upload")]
    PartialFailure {
        failed: usize,
        total: usize,
        report: Box<PipelineReport>,
    },

    #[error("all {failed} attempted uploads failed")]
    TotalFailure {
        failed: usize,
        report: Box<PipelineReport>,
    },
}

impl PipelineError {
    /// The full report behind a partial/total failure, when present.
    pub fn report(&self) -> Option<&PipelineReport> {
        match self {
            PipelineError::InvalidConfig(_) => None,
            PipelineError::PartialFailure { report, .. }
            | PipelineError::TotalFailure { report, .. } => Some(report),
        }
    }
}
