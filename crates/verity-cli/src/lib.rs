use anyhow::Context;
use serde::Serialize;
use verity_core::validation::matches_media_range;
use verity_core::{ErrorInfo, SelectedFile};

/// Accept list of the original file picker.
pub const DEFAULT_ACCEPT: &str = "image/*,video/*";

const PROGRESS_BAR_WIDTH: usize = 30;

/// Advisory picker filter in the HTML `accept` attribute syntax: media ranges
/// (`image/*`, `video/mp4`) and extensions (`.png`), comma separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptFilter {
    entries: Vec<String>,
}

impl AcceptFilter {
    pub fn parse(list: &str) -> Self {
        let entries = list
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { entries }
    }

    /// An empty filter accepts everything.
    pub fn allows(&self, file: &SelectedFile) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        let name = file.name().to_lowercase();
        self.entries.iter().any(|entry| {
            if entry.starts_with('.') {
                name.ends_with(entry.as_str())
            } else {
                matches_media_range(file.content_type(), entry)
            }
        })
    }

    pub fn describe(&self) -> String {
        self.entries.join(", ")
    }
}

/// Render `Uploading: [#####.....] 50%`.
pub fn progress_line(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = PROGRESS_BAR_WIDTH * usize::from(percent) / 100;
    format!(
        "Uploading: [{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled),
        percent
    )
}

/// Hint printed after a failed upload; recoverable failures invite a retry.
pub fn failure_hint(error: &ErrorInfo) -> String {
    let action = error.kind.suggested_action();
    if error.kind.is_recoverable() {
        format!("{} (run the same command again to retry)", action)
    } else {
        action.to_string()
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
