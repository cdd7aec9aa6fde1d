//! Local path → remote object key mapping.
//!
//! The remote key is derived from, in order of precedence: the custom
//! mapper, the path relative to the configured base directory, or the
//! trailing path after the last `dist` directory segment (the conventional
//! build output directory). When none of those apply the bare file name is
//! used, which places the object at the bucket root under the prefix —
//! degraded but well-defined.

use std::path::Path;

use assetlift_store::normalize_url;

use crate::types::KeyMapper;

/// Normalizes path separators to forward slashes.
///
/// Idempotent. Windows extended-length paths (`\\?\` prefix) are returned
/// untouched: their backslashes are significant.
pub fn slash(path: &str) -> String {
    if path.starts_with(r"\\?\") {
        return path.to_string();
    }
    path.replace('\\', "/")
}

/// Joins the remote prefix and a relative fragment with forward slashes,
/// collapsing duplicate slashes. Keys never start with a slash.
pub fn join_key(dist: &str, rel: &str) -> String {
    let dist = dist.trim_matches('/');
    let rel = rel.trim_start_matches('/');
    let joined = if dist.is_empty() {
        rel.to_string()
    } else {
        format!("{dist}/{rel}")
    };
    normalize_url(joined.trim_matches('/'))
}

/// Computes the remote key for `full_path`.
pub fn remote_key(
    full_path: &Path,
    base_path: Option<&Path>,
    dist: &str,
    mapper: Option<&KeyMapper>,
) -> String {
    let full = slash(&full_path.to_string_lossy());

    let rel = mapper
        .and_then(|m| m(full_path))
        .filter(|s| !s.is_empty())
        .or_else(|| base_path.and_then(|base| relative_to(&full, &slash(&base.to_string_lossy()))))
        .or_else(|| after_dist_segment(&full))
        .or_else(|| {
            full_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    join_key(dist, &slash(&rel))
}

/// Path of `full` after the `base` prefix, or `None` when `base` is empty
/// or not a prefix.
fn relative_to(full: &str, base: &str) -> Option<String> {
    if base.is_empty() {
        return None;
    }
    full.strip_prefix(base)
        .map(|rest| rest.trim_start_matches('/').to_string())
        .filter(|rest| !rest.is_empty())
}

/// Trailing path after the last `dist` directory segment.
fn after_dist_segment(full: &str) -> Option<String> {
    let rest = if let Some((_, rest)) = full.rsplit_once("/dist/") {
        rest
    } else {
        full.strip_prefix("dist/")?
    };
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}
