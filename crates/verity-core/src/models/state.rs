use serde::Serialize;
use serde_json::Value as JsonValue;

use super::file::FileSummary;
use crate::error::ErrorInfo;

/// Upload lifecycle. Exactly one mode is active at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadState {
    /// No file chosen
    Idle,
    /// File chosen, not yet submitted
    Ready,
    InFlight {
        percent: u8,
    },
    /// Opaque response body of the analysis service
    Succeeded {
        result: JsonValue,
    },
    Failed {
        error: ErrorInfo,
    },
}

impl UploadState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadState::InFlight { .. })
    }

    pub fn percent(&self) -> Option<u8> {
        match self {
            UploadState::InFlight { percent } => Some(*percent),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            UploadState::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&JsonValue> {
        match self {
            UploadState::Succeeded { result } => Some(result),
            _ => None,
        }
    }
}

/// Read-only view of the controller published to observers after every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSnapshot {
    pub state: UploadState,
    pub file: Option<FileSummary>,
    /// Progress as shown to the user, including the post-success pulse to 100.
    pub display_percent: u8,
    pub attempt: u64,
}

impl Default for UploadSnapshot {
    fn default() -> Self {
        Self {
            state: UploadState::Idle,
            file: None,
            display_percent: 0,
            attempt: 0,
        }
    }
}
