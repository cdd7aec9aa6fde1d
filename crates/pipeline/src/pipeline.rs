//! Bounded-concurrency upload scheduler.
//!
//! Drives every file through the task runner under a sliding window of at
//! most `parallel` concurrent uploads: workers are gated by a semaphore, so
//! each completion immediately frees a slot for the next unscheduled file
//! and one slow upload never stalls the rest of the window.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetlift_store::{ObjectStore, StoreError};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::report::{PipelineReport, UploadFailure};
use crate::task::{self, TaskOutcome};
use crate::types::{FileTask, PipelineEvent, UploadConfig};

/// How a worker resolved its file.
enum WorkerOutcome {
    Uploaded(FileTask),
    Ignored(FileTask),
    Failed(FileTask, StoreError),
    /// Never started: a fail-fast abort was signalled first.
    Skipped(FileTask),
}

/// Orchestrates one upload run over a list of files.
pub struct UploadPipeline {
    events_tx: mpsc::Sender<PipelineEvent>,
    events_rx: Option<mpsc::Receiver<PipelineEvent>>,
    cancel: CancellationToken,
}

impl Default for UploadPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadPipeline {
    /// Creates a new pipeline.
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the progress event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<PipelineEvent>> {
        self.events_rx.take()
    }

    /// Returns a token that cancels scheduling of not-yet-started uploads.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Uploads `files` and returns the aggregated report.
    ///
    /// Remote keys are computed once per file before anything is scheduled.
    /// With `quit_on_error`, the first failure stops scheduling new uploads;
    /// in-flight uploads always run to completion and never-started files
    /// are reported as skipped. A non-empty failure list surfaces as
    /// [`PipelineError::PartialFailure`] or [`PipelineError::TotalFailure`],
    /// both carrying the full report.
    pub async fn run(
        &self,
        files: Vec<PathBuf>,
        base_path: Option<&Path>,
        config: &UploadConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Result<PipelineReport, PipelineError> {
        config.validate()?;

        let tasks: Vec<FileTask> = files
            .into_iter()
            .map(|file| FileTask::new(file, base_path, config))
            .collect();

        info!(
            files = tasks.len(),
            parallel = config.parallel,
            dry_run = config.dry_run,
            "starting upload pipeline"
        );
        self.emit(PipelineEvent::Started { total: tasks.len() });

        if config.dry_run {
            return Ok(self.plan_only(tasks));
        }

        let config = Arc::new(config.clone());
        let semaphore = Arc::new(Semaphore::new(config.parallel));
        let mut workers: JoinSet<WorkerOutcome> = JoinSet::new();

        for mut task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let store = Arc::clone(&store);
            let config = Arc::clone(&config);
            let cancel = self.cancel.clone();
            let events_tx = self.events_tx.clone();

            workers.spawn(async move {
                // Waiting for a permit is what bounds the window; the slot
                // frees as soon as any upload resolves.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return WorkerOutcome::Skipped(task);
                };
                if cancel.is_cancelled() {
                    return WorkerOutcome::Skipped(task);
                }

                match task::run_task(&mut task, &config, store.as_ref()).await {
                    Ok(TaskOutcome::Uploaded { url }) => {
                        let _ = events_tx.try_send(PipelineEvent::Uploaded {
                            key: task.remote_key.clone(),
                            url,
                        });
                        WorkerOutcome::Uploaded(task)
                    }
                    Ok(TaskOutcome::Ignored) => {
                        let _ = events_tx.try_send(PipelineEvent::Ignored {
                            key: task.remote_key.clone(),
                        });
                        WorkerOutcome::Ignored(task)
                    }
                    // Dry runs never reach the workers.
                    Ok(TaskOutcome::DryRun) => WorkerOutcome::Skipped(task),
                    Err(e) => {
                        error!(key = %task.remote_key, error = %e, "upload failed");
                        let _ = events_tx.try_send(PipelineEvent::Failed {
                            key: task.remote_key.clone(),
                            error: e.to_string(),
                        });
                        if config.quit_on_error {
                            cancel.cancel();
                        }
                        WorkerOutcome::Failed(task, e)
                    }
                }
            });
        }

        // Single-writer aggregation: outcomes drain here in completion order.
        let mut report = PipelineReport::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(WorkerOutcome::Uploaded(t)) => report.uploaded.push(t),
                Ok(WorkerOutcome::Ignored(t)) => report.ignored.push(t),
                Ok(WorkerOutcome::Skipped(t)) => report.skipped.push(t),
                Ok(WorkerOutcome::Failed(t, e)) => report.failed.push(UploadFailure {
                    kind: e.kind(),
                    message: e.message().to_string(),
                    task: t,
                }),
                Err(e) => error!(error = %e, "upload worker panicked"),
            }
        }

        if !report.skipped.is_empty() {
            warn!(
                skipped = report.skipped.len(),
                "aborted after failure, remaining files not attempted"
            );
        }

        self.emit(PipelineEvent::Completed {
            uploaded: report.uploaded.len(),
            ignored: report.ignored.len(),
            failed: report.failed.len(),
            skipped: report.skipped.len(),
        });

        report.into_result()
    }

    /// Dry run: resolve every task with its intended key, no network I/O.
    fn plan_only(&self, tasks: Vec<FileTask>) -> PipelineReport {
        let mut report = PipelineReport::default();
        for task in tasks {
            info!(
                path = %task.local_path.display(),
                key = %task.remote_key,
                "dry run, would upload"
            );
            self.emit(PipelineEvent::Planned {
                key: task.remote_key.clone(),
                local_path: task.local_path.clone(),
            });
            report.planned.push(task);
        }
        self.emit(PipelineEvent::Completed {
            uploaded: 0,
            ignored: 0,
            failed: 0,
            skipped: 0,
        });
        report
    }

    /// Progress events are advisory; when nobody is draining the receiver
    /// they are dropped rather than allowed to block an upload slot.
    fn emit(&self, event: PipelineEvent) {
        let _ = self.events_tx.try_send(event);
    }
}
