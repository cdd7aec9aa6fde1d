//! MIME type detection for shipped assets.

use std::path::Path;

/// File suffixes treated as shippable assets by default: the image, video
/// and audio formats a front-end build typically emits.
pub const DEFAULT_FILE_SUFFIXES: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "webp", "ico", "bmp", "webm", "avi", "mp4", "mp3", "flv",
    "mov",
];

/// Detects the MIME content type from a file path extension.
///
/// Covers the image/video/audio formats this system ships; returns `None`
/// for anything unrecognized so callers can omit the header.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("svg") => Some("image/svg+xml"),
        Some("webp") => Some("image/webp"),
        Some("ico") => Some("image/x-icon"),
        Some("bmp") => Some("image/bmp"),
        Some("webm") => Some("video/webm"),
        Some("avi") => Some("video/x-msvideo"),
        Some("mp4") => Some("video/mp4"),
        Some("mov") => Some("video/quicktime"),
        Some("flv") => Some("video/x-flv"),
        Some("mp3") => Some("audio/mpeg"),
        _ => None,
    }
}
