//! Upload lifecycle state machine
//!
//! `UploadController` owns the selected file and the upload state. User intents
//! (`select_file`, `submit`, `dismiss_error`, `cancel`) are plain `&mut self` calls.
//! The network transfer runs on a spawned task that only sends `AttemptEvent`s back;
//! events are applied on the caller's task via `next_event`/`settle`/`apply`, so state
//! is never mutated concurrently.
//!
//! Every attempt gets a generation number. Selecting a new file or cancelling moves the
//! generation forward, and events carrying an older generation are discarded.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

use crate::config::UploadSettings;
use crate::error::{ErrorInfo, TransportError};
use crate::models::{SelectedFile, UploadSnapshot, UploadState};
use crate::transport::{
    AttemptEvent, EventKind, ProgressSink, TransportResponse, UploadRequest, UploadTransport,
};

/// Result of a `submit()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request was issued for this attempt generation.
    Started { attempt: u64 },
    /// An attempt is already in flight; nothing was sent and state is unchanged.
    AlreadyInFlight,
    /// No file selected; state is now `Failed { NoFileSelected }`.
    Rejected,
}

/// Whether an event changed the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// From a superseded attempt, out of order, or no longer relevant to the state.
    Stale,
}

pub struct UploadController {
    transport: Arc<dyn UploadTransport>,
    settings: UploadSettings,
    file: Option<SelectedFile>,
    state: UploadState,
    display_percent: u8,
    attempt: u64,
    task: Option<AbortHandle>,
    events_tx: mpsc::UnboundedSender<AttemptEvent>,
    events_rx: mpsc::UnboundedReceiver<AttemptEvent>,
    snapshot_tx: watch::Sender<UploadSnapshot>,
}

impl UploadController {
    pub fn new(transport: Arc<dyn UploadTransport>) -> Self {
        Self::with_settings(transport, UploadSettings::default())
    }

    pub fn with_settings(transport: Arc<dyn UploadTransport>, settings: UploadSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(UploadSnapshot::default());

        Self {
            transport,
            settings,
            file: None,
            state: UploadState::Idle,
            display_percent: 0,
            attempt: 0,
            task: None,
            events_tx,
            events_rx,
            snapshot_tx,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn display_percent(&self) -> u8 {
        self.display_percent
    }

    /// Current attempt generation.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn snapshot(&self) -> UploadSnapshot {
        UploadSnapshot {
            state: self.state.clone(),
            file: self.file.as_ref().map(SelectedFile::summary),
            display_percent: self.display_percent,
            attempt: self.attempt,
        }
    }

    /// Observe every transition. The receiver starts at the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<UploadSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Replace the selection and move to `Ready`.
    ///
    /// An outstanding request keeps running, but its events are discarded from now on.
    pub fn select_file(&mut self, file: SelectedFile) {
        tracing::info!(
            file = %file.name(),
            size = file.size(),
            content_type = %file.content_type(),
            "File selected"
        );

        if self.state.is_in_flight() {
            tracing::debug!(
                attempt = self.attempt,
                "Selection supersedes in-flight attempt"
            );
        }

        // Detach rather than abort: only the visual state is superseded.
        self.task = None;
        self.attempt += 1;
        self.file = Some(file);
        self.display_percent = 0;
        self.transition(UploadState::Ready);
    }

    /// Start one upload of the selected file.
    ///
    /// Must be called from within a Tokio runtime. The `InFlight` transition is visible
    /// before this returns.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.state.is_in_flight() {
            tracing::warn!(
                attempt = self.attempt,
                "Submit ignored: an upload is already in flight"
            );
            return SubmitOutcome::AlreadyInFlight;
        }

        let Some(file) = self.file.clone() else {
            self.display_percent = 0;
            let error = ErrorInfo::no_file_selected();
            error.log(self.attempt);
            self.transition(UploadState::Failed { error });
            return SubmitOutcome::Rejected;
        };

        self.attempt += 1;
        let attempt = self.attempt;
        self.display_percent = 0;
        self.transition(UploadState::InFlight { percent: 0 });

        tracing::info!(
            attempt,
            file = %file.name(),
            endpoint = %self.transport.endpoint(),
            "Sending file to analysis service"
        );

        let transport = Arc::clone(&self.transport);
        let sink = ProgressSink::new(attempt, self.events_tx.clone());
        let tx = self.events_tx.clone();
        let send =
            tokio::spawn(async move { transport.send(UploadRequest::new(file), sink).await });
        self.task = Some(send.abort_handle());

        // A panicking transport still completes the attempt; an aborted one reports nothing.
        tokio::spawn(async move {
            let outcome = match send.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => return,
                Err(e) => {
                    tracing::error!(attempt, error = %e, "Transport task panicked");
                    Err(TransportError::Client(format!("Transport task failed: {}", e)))
                }
            };
            let _ = tx.send(AttemptEvent {
                attempt,
                kind: EventKind::Completed(outcome),
            });
        });

        SubmitOutcome::Started { attempt }
    }

    /// Clear a failure. Returns to `Ready` when a file is still selected, else `Idle`.
    pub fn dismiss_error(&mut self) {
        if !matches!(self.state, UploadState::Failed { .. }) {
            return;
        }

        let next = if self.file.is_some() {
            UploadState::Ready
        } else {
            UploadState::Idle
        };
        self.transition(next);
    }

    /// Abort the in-flight transfer and return to `Ready`. Returns `false` when nothing
    /// was in flight.
    pub fn cancel(&mut self) -> bool {
        if !self.state.is_in_flight() {
            return false;
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::info!(attempt = self.attempt, "Upload cancelled");

        self.attempt += 1;
        self.display_percent = 0;
        self.transition(UploadState::Ready);
        true
    }

    /// Wait for the next event from a background task and apply it.
    pub async fn next_event(&mut self) -> Option<EventOutcome> {
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    /// Pump events until the current attempt leaves `InFlight`.
    pub async fn settle(&mut self) -> &UploadState {
        while self.state.is_in_flight() {
            if self.next_event().await.is_none() {
                break;
            }
        }
        &self.state
    }

    /// Apply one event, discarding it if it belongs to a superseded attempt.
    pub fn apply(&mut self, event: AttemptEvent) -> EventOutcome {
        if event.attempt != self.attempt {
            tracing::debug!(
                event_attempt = event.attempt,
                current_attempt = self.attempt,
                "Discarding event from superseded attempt"
            );
            return EventOutcome::Stale;
        }

        match event.kind {
            EventKind::Progress {
                bytes_sent,
                total_bytes,
            } => self.on_progress(bytes_sent, total_bytes),
            EventKind::Completed(outcome) => self.on_completed(outcome),
            EventKind::ClearDisplay => self.on_clear_display(),
        }
    }

    fn on_progress(&mut self, bytes_sent: u64, total_bytes: u64) -> EventOutcome {
        let UploadState::InFlight { percent: current } = self.state else {
            return EventOutcome::Stale;
        };

        let percent = percent_of(bytes_sent, total_bytes);
        if percent < current {
            tracing::trace!(percent, current, "Ignoring out-of-order progress");
            return EventOutcome::Stale;
        }

        tracing::debug!(attempt = self.attempt, percent, "Upload progress");
        self.display_percent = percent;
        self.transition(UploadState::InFlight { percent });
        EventOutcome::Applied
    }

    fn on_completed(
        &mut self,
        outcome: Result<TransportResponse, TransportError>,
    ) -> EventOutcome {
        if !self.state.is_in_flight() {
            return EventOutcome::Stale;
        }
        self.task = None;

        match outcome {
            Ok(response) if response.is_success() => {
                let result = response.json_body();
                tracing::info!(
                    attempt = self.attempt,
                    status = response.status,
                    "Analysis service accepted upload"
                );
                self.display_percent = 100;
                self.transition(UploadState::Succeeded { result });
                self.schedule_display_clear();
            }
            Ok(response) => {
                let error = ErrorInfo::server(response.error_message());
                tracing::debug!(status = response.status, "Non-success response");
                self.fail(error);
            }
            Err(TransportError::Unreachable(detail)) => {
                tracing::debug!(detail = %detail, "No response received");
                self.fail(ErrorInfo::unreachable(self.transport.endpoint()));
            }
            Err(TransportError::Client(detail)) => {
                self.fail(ErrorInfo::client(detail));
            }
        }
        EventOutcome::Applied
    }

    fn on_clear_display(&mut self) -> EventOutcome {
        if !matches!(self.state, UploadState::Succeeded { .. }) || self.display_percent == 0 {
            return EventOutcome::Stale;
        }
        self.display_percent = 0;
        self.publish();
        EventOutcome::Applied
    }

    fn fail(&mut self, error: ErrorInfo) {
        error.log(self.attempt);
        self.display_percent = 0;
        self.transition(UploadState::Failed { error });
    }

    fn schedule_display_clear(&self) {
        let tx = self.events_tx.clone();
        let attempt = self.attempt;
        let delay = self.settings.success_display;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AttemptEvent {
                attempt,
                kind: EventKind::ClearDisplay,
            });
        });
    }

    fn transition(&mut self, next: UploadState) {
        self.state = next;
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl Drop for UploadController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for UploadController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadController")
            .field("endpoint", &self.transport.endpoint())
            .field("file", &self.file)
            .field("state", &self.state)
            .field("display_percent", &self.display_percent)
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// `round(bytes_sent * 100 / total_bytes)`, half rounding up. An empty body counts as
/// fully sent.
pub(crate) fn percent_of(bytes_sent: u64, total_bytes: u64) -> u8 {
    if total_bytes == 0 {
        return 100;
    }
    let sent = u128::from(bytes_sent.min(total_bytes));
    let total = u128::from(total_bytes);
    ((sent * 200 + total) / (total * 2)) as u8
}
