//! Data types for the upload pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::keymap;

pub use assetlift_store::DEFAULT_FILE_SUFFIXES;

/// Pluggable key-mapping strategy.
///
/// Receives the absolute local path; returning `Some` of a non-empty string
/// overrides the default mapping for that file. The result is still joined
/// under the configured remote prefix.
pub type KeyMapper = Arc<dyn Fn(&Path) -> Option<String> + Send + Sync>;

/// Configuration for one pipeline run. Immutable once the run starts.
#[derive(Clone)]
pub struct UploadConfig {
    /// Maximum number of concurrent uploads.
    pub parallel: usize,
    /// Upload even when the object already exists remotely.
    pub overwrite: bool,
    /// Delete the local source file after a confirmed upload.
    pub delete_origin: bool,
    /// Deadline for each individual upload.
    pub timeout: Duration,
    /// Stop scheduling new uploads after the first failure.
    pub quit_on_error: bool,
    /// Remote key prefix, e.g. `static/v2`.
    pub dist: String,
    /// Compute mappings and report intended actions without any network I/O.
    pub dry_run: bool,
    /// CDN origin used by the reference rewriter, e.g. `https://cdn.example.com`.
    pub cdn_host: String,
    /// Suffixes recognized as uploadable assets.
    pub file_suffixes: Vec<String>,
    /// Optional custom key-mapping strategy.
    pub key_mapper: Option<KeyMapper>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            parallel: 5,
            overwrite: false,
            delete_origin: false,
            timeout: Duration::from_secs(30),
            quit_on_error: false,
            dist: String::new(),
            dry_run: false,
            cdn_host: String::new(),
            file_suffixes: DEFAULT_FILE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            key_mapper: None,
        }
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("parallel", &self.parallel)
            .field("overwrite", &self.overwrite)
            .field("delete_origin", &self.delete_origin)
            .field("timeout", &self.timeout)
            .field("quit_on_error", &self.quit_on_error)
            .field("dist", &self.dist)
            .field("dry_run", &self.dry_run)
            .field("cdn_host", &self.cdn_host)
            .field("file_suffixes", &self.file_suffixes)
            .field("key_mapper", &self.key_mapper.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl UploadConfig {
    /// Checks the parts of the configuration the pipeline itself depends on.
    pub fn validate(&self) -> Result<(), crate::error::PipelineError> {
        if self.parallel == 0 {
            return Err(crate::error::PipelineError::InvalidConfig(
                "parallel must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle state of a single file in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Created, not yet scheduled.
    Pending,
    /// Upload in progress.
    Uploading,
    /// Stored remotely.
    Uploaded,
    /// Skipped because the object already exists and overwrite is off.
    Ignored,
    /// The upload failed.
    Failed,
}

/// One file's journey through the pipeline.
///
/// Created once per input file before scheduling; the remote key is computed
/// exactly once here and never recomputed. The status transition is the only
/// mutation.
#[derive(Debug, Clone)]
pub struct FileTask {
    /// Path as supplied by the caller.
    pub local_path: PathBuf,
    /// Absolute form of `local_path`.
    pub full_path: PathBuf,
    /// Key the object is stored under.
    pub remote_key: String,
    pub status: TaskStatus,
}

impl FileTask {
    /// Builds a task for `local_path`, resolving the absolute path and the
    /// remote key from the configured mapping.
    pub fn new(local_path: PathBuf, base_path: Option<&Path>, config: &UploadConfig) -> Self {
        let full_path =
            std::path::absolute(&local_path).unwrap_or_else(|_| local_path.clone());
        let remote_key = keymap::remote_key(
            &full_path,
            base_path,
            &config.dist,
            config.key_mapper.as_ref(),
        );
        Self {
            local_path,
            full_path,
            remote_key,
            status: TaskStatus::Pending,
        }
    }
}

/// Progress event emitted while the pipeline runs.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// The run started with this many files.
    Started { total: usize },
    /// Dry run: the file would be uploaded under this key.
    Planned { key: String, local_path: PathBuf },
    /// A file was stored remotely.
    Uploaded { key: String, url: String },
    /// A file already existed remotely and was left untouched.
    Ignored { key: String },
    /// A file failed to upload.
    Failed { key: String, error: String },
    /// The run finished; counts per terminal outcome.
    Completed {
        uploaded: usize,
        ignored: usize,
        failed: usize,
        skipped: usize,
    },
}
