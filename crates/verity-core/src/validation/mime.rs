//! MIME type helpers for selected files.
//!
//! The core does not reject files by type. These helpers only label a file picked from
//! disk and let a presentation layer implement its own advisory accept filter.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Infer a MIME type from the file extension. Unknown extensions map to
/// `application/octet-stream`.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        _ => OCTET_STREAM,
    }
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Match a content type against a media range such as `image/*`, `video/mp4` or `*/*`.
/// Comparison is case-insensitive and ignores MIME parameters.
pub fn matches_media_range(content_type: &str, range: &str) -> bool {
    let content_type = normalize_mime_type(content_type).to_lowercase();
    let range = normalize_mime_type(range).to_lowercase();

    if range == "*/*" || range == "*" {
        return true;
    }

    match range.strip_suffix("/*") {
        Some(top_level) => content_type
            .split_once('/')
            .is_some_and(|(ct_top, _)| ct_top == top_level),
        None => content_type == range,
    }
}
