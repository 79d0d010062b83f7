//! Transport abstraction trait
//!
//! The controller does not know how bytes reach the analysis service. A transport
//! receives one `UploadRequest`, reports outbound progress through a `ProgressSink`,
//! and returns whatever HTTP response it obtained. Status classification happens in
//! the controller, so transports stay free of UI policy.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::models::SelectedFile;

/// Multipart field the analysis service reads the upload from.
pub const FILE_FIELD_NAME: &str = "file";

/// One submission: a single file sent as one multipart part.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub field_name: &'static str,
    pub file: SelectedFile,
}

impl UploadRequest {
    pub fn new(file: SelectedFile) -> Self {
        Self {
            field_name: FILE_FIELD_NAME,
            file,
        }
    }
}

/// Raw HTTP response captured by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response body as opaque JSON. Non-JSON bodies are kept as a JSON string and an
    /// empty body becomes `null`.
    pub fn json_body(&self) -> JsonValue {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return JsonValue::Null;
        }
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(&self.body).into_owned()))
    }

    /// Human-readable message carried by an error body: `message` first, then `error`.
    pub fn error_message(&self) -> Option<String> {
        let body = self.json_body();
        let object = body.as_object()?;
        ["message", "error"]
            .iter()
            .filter_map(|key| object.get(*key))
            .find_map(message_text)
    }
}

/// Empty strings, `false`, zero and `null` carry no message.
fn message_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null | JsonValue::Bool(false) => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Message delivered to the controller by an attempt's background task.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptEvent {
    /// Generation of the attempt that produced this event.
    pub attempt: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Progress { bytes_sent: u64, total_bytes: u64 },
    Completed(Result<TransportResponse, TransportError>),
    /// End of the cosmetic 100% pulse after success.
    ClearDisplay,
}

/// Handle a transport uses to report outbound byte counts for one attempt.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    attempt: u64,
    tx: mpsc::UnboundedSender<AttemptEvent>,
}

impl ProgressSink {
    pub fn new(attempt: u64, tx: mpsc::UnboundedSender<AttemptEvent>) -> Self {
        Self { attempt, tx }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Report cumulative bytes sent. Reports after the controller is gone are dropped.
    pub fn report(&self, bytes_sent: u64, total_bytes: u64) {
        let _ = self.tx.send(AttemptEvent {
            attempt: self.attempt,
            kind: EventKind::Progress {
                bytes_sent,
                total_bytes,
            },
        });
    }
}

/// Sends one upload to the analysis service.
///
/// Implementations issue exactly one request per call and never retry. A response
/// with any status is `Ok`; `Err` is reserved for "no response at all".
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Endpoint the request goes to, used in user-facing messages.
    fn endpoint(&self) -> &str;

    async fn send(
        &self,
        request: UploadRequest,
        progress: ProgressSink,
    ) -> Result<TransportResponse, TransportError>;
}
