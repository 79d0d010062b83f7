//! Controller settings
//!
//! Only behaviour owned by the state machine lives here. Network configuration
//! (base URL, endpoint path, timeouts) belongs to the transport crate.

use std::time::Duration;

/// How long the 100% pulse stays on the display after a successful upload.
pub const SUCCESS_DISPLAY_MS: u64 = 2000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSettings {
    /// Delay before the cosmetic 100% display is cleared back to 0.
    pub success_display: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            success_display: Duration::from_millis(SUCCESS_DISPLAY_MS),
        }
    }
}

impl UploadSettings {
    pub fn with_success_display(mut self, delay: Duration) -> Self {
        self.success_display = delay;
        self
    }
}
