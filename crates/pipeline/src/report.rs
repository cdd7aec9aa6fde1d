//! Per-run result aggregation.
//!
//! Every outcome is appended to a [`PipelineReport`] owned by the run and
//! returned by value: no cross-run state, nothing to reset between runs.

use assetlift_store::StoreErrorKind;

use crate::error::PipelineError;
use crate::types::FileTask;

/// A file that failed to upload, with the store's error classification.
#[derive(Debug, Clone)]
pub struct UploadFailure {
    pub task: FileTask,
    pub kind: StoreErrorKind,
    pub message: String,
}

/// Overall outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// No file failed.
    Success,
    /// Some files failed, others completed.
    PartialFailure,
    /// Every attempted file failed.
    TotalFailure,
}

/// Aggregated outcome of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Files stored remotely.
    pub uploaded: Vec<FileTask>,
    /// Files skipped because the object already existed.
    pub ignored: Vec<FileTask>,
    /// Files whose upload failed.
    pub failed: Vec<UploadFailure>,
    /// Files never attempted because a fail-fast abort stopped scheduling.
    pub skipped: Vec<FileTask>,
    /// Dry run: files that would have been uploaded.
    pub planned: Vec<FileTask>,
}

impl PipelineReport {
    /// Total number of files the run was asked to handle.
    pub fn total(&self) -> usize {
        self.uploaded.len()
            + self.ignored.len()
            + self.failed.len()
            + self.skipped.len()
            + self.planned.len()
    }

    /// Derives the overall status. Ignored files count as completed: the
    /// distinction that matters is whether anything failed and whether
    /// anything got through.
    pub fn status(&self) -> PipelineStatus {
        if self.failed.is_empty() {
            PipelineStatus::Success
        } else if self.uploaded.is_empty() && self.ignored.is_empty() {
            PipelineStatus::TotalFailure
        } else {
            PipelineStatus::PartialFailure
        }
    }

    /// Converts the report into the pipeline's terminal result: `Ok` when
    /// nothing failed, otherwise the matching aggregate error carrying the
    /// full report.
    pub fn into_result(self) -> Result<PipelineReport, PipelineError> {
        match self.status() {
            PipelineStatus::Success => Ok(self),
            PipelineStatus::PartialFailure => Err(PipelineError::PartialFailure {
                failed: self.failed.len(),
                total: self.total(),
                report: Box::new(self),
            }),
            PipelineStatus::TotalFailure => Err(PipelineError::TotalFailure {
                failed: self.failed.len(),
                report: Box::new(self),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskStatus, UploadConfig};
    use std::path::PathBuf;

    fn task(name: &str, status: TaskStatus) -> FileTask {
        let mut t = FileTask::new(PathBuf::from(name), None, &UploadConfig::default());
        t.status = status;
        t
    }

    fn failure(name: &str) -> UploadFailure {
        UploadFailure {
            task: task(name, TaskStatus::Failed),
            kind: StoreErrorKind::Server,
            message: "boom".into(),
        }
    }

    #[test]
    fn empty_report_is_success() {
        assert_eq!(PipelineReport::default().status(), PipelineStatus::Success);
    }

    #[test]
    fn failures_with_uploads_are_partial() {
        let report = PipelineReport {
            uploaded: vec![task("a.png", TaskStatus::Uploaded)],
            failed: vec![failure("b.png")],
            ..Default::default()
        };
        assert_eq!(report.status(), PipelineStatus::PartialFailure);
    }

    #[test]
    fn only_failures_are_total() {
        let report = PipelineReport {
            failed: vec![failure("a.png"), failure("b.png")],
            skipped: vec![task("c.png", TaskStatus::Pending)],
            ..Default::default()
        };
        assert_eq!(report.status(), PipelineStatus::TotalFailure);
    }

    #[test]
    fn ignored_counts_as_completed() {
        let report = PipelineReport {
            ignored: vec![task("a.png", TaskStatus::Ignored)],
            failed: vec![failure("b.png")],
            ..Default::default()
        };
        assert_eq!(report.status(), PipelineStatus::PartialFailure);
    }

    #[test]
    fn into_result_surfaces_aggregate_error() {
        let report = PipelineReport {
            failed: vec![failure("a.png")],
            ..Default::default()
        };
        let err = report.into_result().unwrap_err();
        assert!(matches!(err, PipelineError::TotalFailure { failed: 1, .. }));
        assert!(err.report().is_some());
    }
}
