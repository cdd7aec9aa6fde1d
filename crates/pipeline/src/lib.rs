//! Upload pipeline: ship build artifacts to object storage.
//!
//! This crate implements the **business logic** for shipping emitted build
//! artifacts (images, video, audio) to a remote bucket. It is a library
//! crate with no discovery or CLI dependencies — the embedding build tool
//! supplies the resolved file list, the configuration, and an
//! [`assetlift_store::ObjectStore`] implementation.
//!
//! # Pipeline
//!
//! 1. **Map** — compute each file's remote key, exactly once
//! 2. **Schedule** — slide a window of at most `parallel` concurrent uploads
//! 3. **Upload** — probe, put with cache headers, optional source cleanup
//! 4. **Aggregate** — collect per-file outcomes into one report

pub mod error;
pub mod keymap;
pub mod pipeline;
pub mod report;
pub mod task;
pub mod types;

// Re-export primary types for convenience.
pub use error::PipelineError;
pub use pipeline::UploadPipeline;
pub use report::{PipelineReport, PipelineStatus, UploadFailure};
pub use task::{TaskOutcome, run_task};
pub use types::{
    DEFAULT_FILE_SUFFIXES, FileTask, KeyMapper, PipelineEvent, TaskStatus, UploadConfig,
};
