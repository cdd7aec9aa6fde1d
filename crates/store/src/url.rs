//! URL and key normalization helpers.
//!
//! Remote keys and gateway URLs are assembled from user-supplied fragments
//! (prefix, relative path, endpoint) that frequently carry stray slashes.
//! Normalization collapses duplicate slashes without ever touching a
//! `scheme://` separator, and is idempotent.

/// Collapses runs of `/` into a single slash, preserving the `://` after a
/// URL scheme. Works on both URLs and bare object keys.
pub fn normalize_url(input: &str) -> String {
    match input.find("://") {
        Some(pos) => {
            let (scheme, rest) = input.split_at(pos + 3);
            let mut out = String::with_capacity(input.len());
            out.push_str(scheme);
            out.push_str(&collapse(rest));
            out
        }
        None => collapse(input),
    }
}

/// Joins `base` and `path` with a single slash and normalizes the result.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return normalize_url(base);
    }
    normalize_url(&format!("{base}/{path}"))
}

fn collapse(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_slash = false;
    for c in s.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    out
}
