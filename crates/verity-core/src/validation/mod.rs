//! Validation modules

pub mod mime;

pub use mime::{content_type_for_path, matches_media_range, normalize_mime_type, OCTET_STREAM};
