//! HTTP implementation of [`ObjectStore`] for OSS/S3-compatible gateways.
//!
//! Objects are addressed path-style (`{endpoint}/{bucket}/{key}`) and
//! requests authenticate with a bearer access key. Existence probes map a
//! clean 404 to `Ok(false)`; every other non-success status is classified
//! into a [`StoreErrorKind`] so per-file failures keep the gateway's error
//! class.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::{ObjectStore, PutOptions, PutResult, StoreError, StoreErrorKind};

/// Default per-request deadline when the caller does not supply one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters percent-encoded inside a key path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'%');

/// Connection settings for [`HttpStore`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Gateway base URL, e.g. `https://storage.example.com`.
    pub endpoint: String,
    /// Bucket the objects are uploaded into.
    pub bucket: String,
    /// Access key sent as a bearer token.
    pub access_key: String,
}

impl StoreConfig {
    /// Checks that every required field is present, accumulating all
    /// problems into a single message.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut missing = Vec::new();
        if self.endpoint.trim().is_empty() {
            missing.push("endpoint");
        }
        if self.bucket.trim().is_empty() {
            missing.push("bucket");
        }
        if self.access_key.trim().is_empty() {
            missing.push("access key");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StoreError::new(
                StoreErrorKind::InvalidConfig,
                format!("{} not specified", missing.join(", ")),
            ))
        }
    }
}

/// Object store backed by an OSS/S3-compatible HTTP gateway.
pub struct HttpStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    access_key: String,
}

impl HttpStore {
    /// Creates a store from validated configuration.
    ///
    /// Fails before any network activity when required fields are missing.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                StoreError::new(StoreErrorKind::Other, format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket,
            access_key: config.access_key,
        })
    }

    /// Full object URL for `key`, with each path segment percent-encoded.
    fn object_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .filter(|seg| !seg.is_empty())
            .map(|seg| utf8_percent_encode(seg, SEGMENT).to_string())
            .collect();
        format!("{}/{}/{}", self.endpoint, self.bucket, encoded.join("/"))
    }
}

impl ObjectStore for HttpStore {
    fn head(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, StoreError>> + Send + '_>> {
        let url = self.object_url(key);
        let key = key.to_string();

        Box::pin(async move {
            let resp = self
                .client
                .head(&url)
                .bearer_auth(&self.access_key)
                .send()
                .await
                .map_err(classify_transport)?;

            match resp.status() {
                StatusCode::NOT_FOUND => Ok(false),
                status if status.is_success() => Ok(true),
                status => Err(StoreError::new(
                    classify_status(status),
                    format!("HEAD {key} returned {status}"),
                )),
            }
        })
    }

    fn put(
        &self,
        key: &str,
        local_path: &Path,
        opts: &PutOptions,
    ) -> Pin<Box<dyn Future<Output = Result<PutResult, StoreError>> + Send + '_>> {
        let url = self.object_url(key);
        let key = key.to_string();
        let local_path = local_path.to_path_buf();
        let opts = opts.clone();

        Box::pin(async move {
            let body = tokio::fs::read(&local_path).await.map_err(|e| {
                StoreError::new(
                    StoreErrorKind::Other,
                    format!("failed to read {}: {e}", local_path.display()),
                )
            })?;

            debug!(key = %key, bytes = body.len(), "uploading object");

            let mut req = self
                .client
                .put(&url)
                .bearer_auth(&self.access_key)
                .timeout(opts.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .body(body);
            if let Some(cc) = &opts.cache_control {
                req = req.header(CACHE_CONTROL, cc);
            }
            if let Some(ct) = &opts.content_type {
                req = req.header(CONTENT_TYPE, ct);
            }

            let resp = req.send().await.map_err(classify_transport)?;
            let status = resp.status();
            if status.is_success() {
                Ok(PutResult { url })
            } else {
                Err(StoreError::new(
                    classify_status(status),
                    format!("PUT {key} returned {status}"),
                ))
            }
        })
    }
}

fn classify_status(status: StatusCode) -> StoreErrorKind {
    match status {
        StatusCode::NOT_FOUND => StoreErrorKind::NotFound,
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => StoreErrorKind::Forbidden,
        StatusCode::TOO_MANY_REQUESTS => StoreErrorKind::Throttled,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StoreErrorKind::Timeout,
        status if status.is_server_error() => StoreErrorKind::Server,
        _ => StoreErrorKind::Other,
    }
}

fn classify_transport(e: reqwest::Error) -> StoreError {
    let kind = if e.is_timeout() {
        StoreErrorKind::Timeout
    } else if e.is_connect() {
        StoreErrorKind::Network
    } else {
        StoreErrorKind::Other
    };
    StoreError::new(kind, e.to_string())
}
