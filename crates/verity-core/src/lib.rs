//! Verity Core Library
//!
//! This crate provides the upload lifecycle shared by every Verity front end: the
//! selected-file and upload-state model, the error taxonomy, the transport seam that
//! network implementations plug into, and the `UploadController` state machine that
//! ties them together.
//!
//! The core never reads the environment and never talks to the network directly; a
//! transport (see `verity-api-client`) is injected at construction.

pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use config::UploadSettings;
pub use controller::{EventOutcome, SubmitOutcome, UploadController};
pub use error::{ErrorInfo, ErrorKind, FileError, LogLevel, TransportError};
pub use models::{FileSummary, SelectedFile, UploadSnapshot, UploadState};
pub use transport::{
    AttemptEvent, EventKind, ProgressSink, TransportResponse, UploadRequest, UploadTransport,
    FILE_FIELD_NAME,
};
