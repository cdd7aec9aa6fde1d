//! Object storage client abstraction for asset uploads.
//!
//! The upload pipeline talks to remote storage exclusively through the
//! [`ObjectStore`] trait, which exposes the two operations it needs: an
//! existence probe (`head`) and an object upload (`put`). Using a trait
//! keeps the pipeline decoupled from any particular vendor and testable
//! with mocks.
//!
//! [`HttpStore`] is the bundled implementation for OSS/S3-compatible HTTP
//! gateways that authenticate with an access key.

pub mod content_type;
pub mod http;
pub mod url;

pub use content_type::{DEFAULT_FILE_SUFFIXES, content_type_for};
pub use http::{HttpStore, StoreConfig};
pub use url::{join_url, normalize_url};

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

/// Machine-readable classification of a store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The object (or bucket) does not exist.
    NotFound,
    /// The credentials were rejected or lack permission.
    Forbidden,
    /// The gateway is rate limiting requests.
    Throttled,
    /// The request exceeded its deadline.
    Timeout,
    /// Connection-level failure (DNS, refused, reset).
    Network,
    /// The gateway reported a server-side error.
    Server,
    /// Required configuration is missing or malformed.
    InvalidConfig,
    /// Anything else, including local I/O while reading the source file.
    Other,
}

impl StoreErrorKind {
    /// Stable lowercase code for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::Forbidden => "forbidden",
            StoreErrorKind::Throttled => "throttled",
            StoreErrorKind::Timeout => "timeout",
            StoreErrorKind::Network => "network",
            StoreErrorKind::Server => "server",
            StoreErrorKind::InvalidConfig => "invalid_config",
            StoreErrorKind::Other => "other",
        }
    }
}

impl std::fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from a store operation: a classification plus a human-readable
/// message. Both halves are retained so per-file failures can be reported
/// with the store's own error code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Options for a single `put`.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Deadline for this upload. `None` falls back to the client default.
    pub timeout: Option<Duration>,
    /// `Cache-Control` header value to store with the object.
    pub cache_control: Option<String>,
    /// `Content-Type` header value to store with the object.
    pub content_type: Option<String>,
}

/// Result of a successful `put`.
#[derive(Debug, Clone)]
pub struct PutResult {
    /// Public URL of the stored object, as reported by the gateway.
    pub url: String,
}

/// Abstract object storage client.
///
/// Implementations bridge to an actual storage backend; the pipeline only
/// depends on this trait. `head` distinguishes a clean "not found"
/// (`Ok(false)`) from a failed probe (`Err`) so callers can decide how much
/// to trust a negative answer.
pub trait ObjectStore: Send + Sync {
    /// Probes whether an object exists under `key`.
    fn head(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, StoreError>> + Send + '_>>;

    /// Uploads the file at `local_path` under `key`.
    fn put(
        &self,
        key: &str,
        local_path: &Path,
        opts: &PutOptions,
    ) -> Pin<Box<dyn Future<Output = Result<PutResult, StoreError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_codes_are_stable() {
        assert_eq!(StoreErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(StoreErrorKind::Throttled.as_str(), "throttled");
        assert_eq!(StoreErrorKind::InvalidConfig.as_str(), "invalid_config");
    }

    #[test]
    fn error_display_includes_kind_and_message() {
        let err = StoreError::new(StoreErrorKind::Forbidden, "access key rejected");
        assert_eq!(err.to_string(), "forbidden: access key rejected");
        assert_eq!(err.kind(), StoreErrorKind::Forbidden);
    }
}
