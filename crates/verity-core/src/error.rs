//! Error types module
//!
//! `ErrorKind`/`ErrorInfo` describe why an upload attempt ended in `Failed`. They are
//! state data, not Rust errors: the controller never returns them as `Err`.
//!
//! `TransportError` is what a transport implementation reports when no HTTP response
//! could be obtained; the controller classifies it into an `ErrorKind`.

use serde::Serialize;

/// Message used when `submit()` is called before any file was selected.
pub const NO_FILE_SELECTED_MESSAGE: &str = "Please select a file first!";

/// Message used for non-2xx responses whose body carries no `message`/`error` field.
pub const GENERIC_SERVER_ERROR_MESSAGE: &str = "Server error occurred";

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors caused by user actions
    Debug,
    /// Warning level - for errors reported by the remote service
    Warn,
    /// Error level - for failures on our side of the wire
    Error,
}

/// Classification of a failed upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// `submit()` was called with no file chosen; nothing was sent.
    NoFileSelected,
    /// A response arrived with a non-2xx status.
    ServerError,
    /// The request went out but no response came back.
    Unreachable,
    /// The request could not be constructed or sent.
    ClientError,
}

impl ErrorKind {
    /// Machine-readable error code (e.g., "SERVER_ERROR")
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::NoFileSelected => "NO_FILE_SELECTED",
            ErrorKind::ServerError => "SERVER_ERROR",
            ErrorKind::Unreachable => "UNREACHABLE",
            ErrorKind::ClientError => "CLIENT_ERROR",
        }
    }

    /// Whether submitting the same file again may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorKind::ServerError | ErrorKind::Unreachable)
    }

    pub fn suggested_action(&self) -> &'static str {
        match self {
            ErrorKind::NoFileSelected => "Choose a file before submitting",
            ErrorKind::ServerError => "Retry later or try a different file",
            ErrorKind::Unreachable => "Check that the analysis service is running",
            ErrorKind::ClientError => "Check the selected file and try again",
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ErrorKind::NoFileSelected => LogLevel::Debug,
            ErrorKind::ServerError => LogLevel::Warn,
            ErrorKind::Unreachable | ErrorKind::ClientError => LogLevel::Error,
        }
    }
}

/// Why the current attempt failed, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_file_selected() -> Self {
        Self::new(ErrorKind::NoFileSelected, NO_FILE_SELECTED_MESSAGE)
    }

    /// Build a `ServerError` from the optional message extracted from the response body.
    pub fn server(message: Option<String>) -> Self {
        Self::new(
            ErrorKind::ServerError,
            message.unwrap_or_else(|| GENERIC_SERVER_ERROR_MESSAGE.to_string()),
        )
    }

    /// Build an `Unreachable` error naming the endpoint the user expected to reach.
    pub fn unreachable(endpoint: &str) -> Self {
        Self::new(
            ErrorKind::Unreachable,
            format!(
                "Cannot reach the server. Is the backend running on {}?",
                endpoint
            ),
        )
    }

    pub fn client(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClientError, description)
    }

    /// Emit this error through `tracing` at the level its kind asks for.
    pub fn log(&self, attempt: u64) {
        match self.kind.log_level() {
            LogLevel::Debug => tracing::debug!(
                attempt,
                code = self.kind.error_code(),
                error_message = %self.message,
                "Upload attempt failed"
            ),
            LogLevel::Warn => tracing::warn!(
                attempt,
                code = self.kind.error_code(),
                error_message = %self.message,
                "Upload attempt failed"
            ),
            LogLevel::Error => tracing::error!(
                attempt,
                code = self.kind.error_code(),
                error_message = %self.message,
                "Upload attempt failed"
            ),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failure reported by a transport when no HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Request was sent (or a connection attempted) but no response arrived.
    #[error("No response from server: {0}")]
    Unreachable(String),

    /// Request could not be built or handed to the network.
    #[error("Request could not be sent: {0}")]
    Client(String),
}

/// Errors raised while turning a path on disk into a `SelectedFile`.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
