use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use verity_core::{
    ProgressSink, SelectedFile, TransportError, TransportResponse, UploadRequest, UploadTransport,
};

pub const TEST_ENDPOINT: &str = "http://localhost:5000/api/predict";

/// Transport that replays a fixed progress script and outcome, recording every call.
pub struct ScriptedTransport {
    progress: Vec<(u64, u64)>,
    outcome: Result<TransportResponse, TransportError>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<UploadRequest>>,
}

impl ScriptedTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self::with_outcome(Ok(TransportResponse::new(status, body.to_string())))
    }

    pub fn failing(error: TransportError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<TransportResponse, TransportError>) -> Self {
        Self {
            progress: Vec::new(),
            outcome,
            gate: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_progress(mut self, steps: &[(u64, u64)]) -> Self {
        self.progress = steps.to_vec();
        self
    }

    /// Hold the outcome back until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<UploadRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl UploadTransport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        TEST_ENDPOINT
    }

    async fn send(
        &self,
        request: UploadRequest,
        progress: ProgressSink,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        for (sent, total) in &self.progress {
            progress.report(*sent, *total);
        }

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.outcome.clone()
    }
}

/// Transport whose `send` panics after reporting some progress.
pub struct PanickingTransport;

#[async_trait]
impl UploadTransport for PanickingTransport {
    fn endpoint(&self) -> &str {
        TEST_ENDPOINT
    }

    async fn send(
        &self,
        _request: UploadRequest,
        progress: ProgressSink,
    ) -> Result<TransportResponse, TransportError> {
        progress.report(50, 100);
        panic!("transport blew up");
    }
}

pub fn media_file(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/png", vec![0u8; 100])
}
