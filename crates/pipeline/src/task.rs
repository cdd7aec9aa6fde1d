//! Single-file upload lifecycle.
//!
//! Runs one file through: dry-run short-circuit, existence probe, upload
//! with cache headers, URL normalization, optional source cleanup. Retry
//! and continue/abort policy live in the scheduler, not here.

use std::path::Path;

use assetlift_store::{ObjectStore, PutOptions, StoreError, content_type_for, normalize_url};
use tracing::{debug, info, warn};

use crate::types::{FileTask, TaskStatus, UploadConfig};

/// Uploaded assets are immutable once shipped, so clients may cache them
/// for a year.
const CACHE_CONTROL_LONG: &str = "max-age=31536000";

/// Terminal outcome of a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Stored remotely; `url` is the normalized public URL.
    Uploaded { url: String },
    /// Object already existed and overwrite is off.
    Ignored,
    /// Dry run: nothing was sent.
    DryRun,
}

/// Runs the full upload lifecycle for one file.
///
/// A failed existence probe is treated as "absent" and logged: it is a
/// non-critical check and must not block the pipeline. Note this means a
/// transient probe failure can lead to overwriting an existing object even
/// with `overwrite` off.
pub async fn run_task(
    task: &mut FileTask,
    config: &UploadConfig,
    store: &dyn ObjectStore,
) -> Result<TaskOutcome, StoreError> {
    if config.dry_run {
        debug!(
            path = %task.local_path.display(),
            key = %task.remote_key,
            "dry run, upload skipped"
        );
        return Ok(TaskOutcome::DryRun);
    }

    task.status = TaskStatus::Uploading;

    if !config.overwrite {
        match store.head(&task.remote_key).await {
            Ok(true) => {
                task.status = TaskStatus::Ignored;
                info!(key = %task.remote_key, "object already exists, ignored");
                return Ok(TaskOutcome::Ignored);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(
                    key = %task.remote_key,
                    error = %e,
                    "existence probe failed, assuming object is absent"
                );
            }
        }
    }

    let opts = PutOptions {
        timeout: Some(config.timeout),
        cache_control: Some(CACHE_CONTROL_LONG.to_string()),
        content_type: content_type_for(&task.full_path).map(str::to_string),
    };

    match store.put(&task.remote_key, &task.full_path, &opts).await {
        Ok(result) => {
            let url = normalize_url(&result.url);
            task.status = TaskStatus::Uploaded;
            info!(key = %task.remote_key, url = %url, "uploaded");

            if config.delete_origin {
                remove_origin(&task.full_path);
            }

            Ok(TaskOutcome::Uploaded { url })
        }
        Err(e) => {
            task.status = TaskStatus::Failed;
            Err(e)
        }
    }
}

/// Deletes the uploaded source file, then its parent directory when that
/// leaves it empty. Best-effort: failures are logged and never escalated.
fn remove_origin(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to delete source file");
        return;
    }
    debug!(path = %path.display(), "deleted source file");

    let Some(dir) = path.parent() else {
        return;
    };
    match std::fs::read_dir(dir) {
        Ok(mut entries) => {
            if entries.next().is_none()
                && let Err(e) = std::fs::remove_dir(dir)
            {
                warn!(path = %dir.display(), error = %e, "failed to remove empty directory");
            }
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to inspect directory");
        }
    }
}
