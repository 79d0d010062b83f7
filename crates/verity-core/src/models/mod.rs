//! Data models for the upload lifecycle

mod file;
mod state;

pub use file::{FileSummary, SelectedFile};
pub use state::{UploadSnapshot, UploadState};
