//! CDN reference rewriting for emitted text assets.
//!
//! After artifacts are shipped, references inside emitted HTML/CSS/JS still
//! point at relative asset paths. This post-pass scans those files and
//! prepends the CDN origin to every recognized asset-path fragment, writing
//! the files back in place.
//!
//! The pass is safe to run more than once: fragments already preceded by
//! the CDN base URL are left untouched.

use std::path::Path;

use assetlift_store::{DEFAULT_FILE_SUFFIXES, join_url};
use regex::Regex;
use tracing::{debug, info};

/// Errors from the rewrite pass.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid asset pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Rewrites recognized asset references to absolute CDN URLs.
pub struct CdnRewriter {
    base_url: String,
    pattern: Regex,
}

impl CdnRewriter {
    /// Builds a rewriter for `cdn_host`, with asset keys served under the
    /// `dist` prefix.
    ///
    /// The pattern matches an `img/…` path fragment ending in one of
    /// `suffixes` (case-insensitive); an empty slice falls back to the
    /// default asset suffixes.
    pub fn new(cdn_host: &str, dist: &str, suffixes: &[String]) -> Result<Self, RewriteError> {
        let base_url = join_url(cdn_host, dist);

        let defaults: Vec<String>;
        let suffixes = if suffixes.is_empty() {
            defaults = DEFAULT_FILE_SUFFIXES.iter().map(|s| s.to_string()).collect();
            &defaults
        } else {
            suffixes
        };
        let alternatives: Vec<String> = suffixes.iter().map(|s| regex::escape(s)).collect();
        let pattern = Regex::new(&format!(
            r"(?i)img/[A-Za-z0-9_.-]+\.(?:{})",
            alternatives.join("|")
        ))?;

        Ok(Self { base_url, pattern })
    }

    /// The CDN base URL matches are prefixed with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Rewrites `content`, returning the new text and the replacement count.
    ///
    /// Matches already preceded by the base URL are skipped, which makes the
    /// pass idempotent over its own output.
    pub fn rewrite(&self, content: &str) -> (String, usize) {
        let prefix = format!("{}/", self.base_url);
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut count = 0;

        for m in self.pattern.find_iter(content) {
            if content[..m.start()].ends_with(prefix.as_str()) {
                continue;
            }
            out.push_str(&content[last..m.start()]);
            out.push_str(&prefix);
            out.push_str(m.as_str());
            last = m.end();
            count += 1;
        }
        out.push_str(&content[last..]);

        (out, count)
    }

    /// Rewrites one file in place. The file is only written back when at
    /// least one reference changed.
    pub fn rewrite_file(&self, path: &Path) -> Result<usize, RewriteError> {
        let content = std::fs::read_to_string(path)?;
        let (rewritten, count) = self.rewrite(&content);
        if count > 0 {
            std::fs::write(path, rewritten)?;
            info!(file = %path.display(), replaced = count, "rewrote CDN references");
        }
        Ok(count)
    }

    /// Rewrites every file, returning the total replacement count.
    pub fn rewrite_files<P: AsRef<Path>>(&self, files: &[P]) -> Result<usize, RewriteError> {
        let mut total = 0;
        for file in files {
            total += self.rewrite_file(file.as_ref())?;
        }
        Ok(total)
    }
}

/// Runs the rewrite pass over `files` when a CDN host is configured.
///
/// Returns whether a pass ran at all: `false` means no CDN host was
/// configured and nothing was touched.
pub fn rewrite_cdn_references<P: AsRef<Path>>(
    files: &[P],
    cdn_host: &str,
    dist: &str,
    suffixes: &[String],
) -> Result<bool, RewriteError> {
    if cdn_host.trim().is_empty() {
        debug!("no CDN host configured, skipping reference rewrite");
        return Ok(false);
    }

    let rewriter = CdnRewriter::new(cdn_host, dist, suffixes)?;
    let total = rewriter.rewrite_files(files)?;
    info!(files = files.len(), replaced = total, "CDN reference rewrite complete");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn rewriter() -> CdnRewriter {
        CdnRewriter::new("https://cdn.example.com", "", &suffixes(&["png", "jpg"])).unwrap()
    }

    #[test]
    fn rewrites_asset_references() {
        let (out, count) = rewriter().rewrite(r#"<img src="img/logo.png"> url(img/bg.jpg)"#);
        assert_eq!(count, 2);
        assert_eq!(
            out,
            r#"<img src="https://cdn.example.com/img/logo.png"> url(https://cdn.example.com/img/bg.jpg)"#
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let (out, count) = rewriter().rewrite("IMG/Logo.PNG");
        assert_eq!(count, 1);
        assert_eq!(out, "https://cdn.example.com/IMG/Logo.PNG");
    }

    #[test]
    fn unknown_suffixes_are_left_alone() {
        let (out, count) = rewriter().rewrite(r#"<img src="img/logo.tiff">"#);
        assert_eq!(count, 0);
        assert_eq!(out, r#"<img src="img/logo.tiff">"#);
    }

    #[test]
    fn dist_prefix_joins_the_base_url() {
        let rw = CdnRewriter::new("https://cdn.example.com/", "/static", &suffixes(&["png"]))
            .unwrap();
        assert_eq!(rw.base_url(), "https://cdn.example.com/static");
        let (out, _) = rw.rewrite("img/a.png");
        assert_eq!(out, "https://cdn.example.com/static/img/a.png");
    }

    #[test]
    fn rerunning_over_rewritten_output_is_a_noop() {
        let rw = rewriter();
        let (once, count) = rw.rewrite(r#"src="img/a.png" src="img/b.jpg""#);
        assert_eq!(count, 2);
        let (twice, count) = rw.rewrite(&once);
        assert_eq!(count, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn empty_suffix_list_uses_defaults() {
        let rw = CdnRewriter::new("https://cdn.example.com", "", &[]).unwrap();
        let (_, count) = rw.rewrite("img/a.webp img/b.mp4");
        assert_eq!(count, 2);
    }

    #[test]
    fn rewrites_files_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("index.html");
        let css = dir.path().join("style.css");
        std::fs::write(&html, r#"<img src="img/logo.png">"#).unwrap();
        std::fs::write(&css, "body { background: url(img/bg.jpg); }").unwrap();

        let total = rewriter()
            .rewrite_files(&[html.clone(), css.clone()])
            .unwrap();
        assert_eq!(total, 2);

        let html_out = std::fs::read_to_string(&html).unwrap();
        assert!(html_out.contains("https://cdn.example.com/img/logo.png"));
        let css_out = std::fs::read_to_string(&css).unwrap();
        assert!(css_out.contains("https://cdn.example.com/img/bg.jpg"));
    }

    #[test]
    fn files_without_matches_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let js = dir.path().join("bundle.js");
        std::fs::write(&js, "console.log('no assets here');").unwrap();

        let count = rewriter().rewrite_file(&js).unwrap();
        assert_eq!(count, 0);
        assert_eq!(
            std::fs::read_to_string(&js).unwrap(),
            "console.log('no assets here');"
        );
    }

    #[test]
    fn entry_point_reports_whether_a_pass_ran() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("index.html");
        std::fs::write(&html, r#"<img src="img/logo.png">"#).unwrap();
        let files = [html.clone()];

        let ran = rewrite_cdn_references(&files, "", "", &suffixes(&["png"])).unwrap();
        assert!(!ran);
        assert!(std::fs::read_to_string(&html).unwrap().contains(r#""img/logo.png""#));

        let ran =
            rewrite_cdn_references(&files, "https://cdn.example.com", "", &suffixes(&["png"]))
                .unwrap();
        assert!(ran);
        assert!(
            std::fs::read_to_string(&html)
                .unwrap()
                .contains("https://cdn.example.com/img/logo.png")
        );
    }
}
