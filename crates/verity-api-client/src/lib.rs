//! HTTP transport for the Verity analysis service.
//!
//! Implements `verity_core::UploadTransport` on top of reqwest: one multipart POST per
//! upload, the file streamed in chunks so outbound progress can be reported, and the
//! raw response handed back to the controller for classification.

pub mod body;
pub mod config;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use verity_core::{
    ProgressSink, TransportError, TransportResponse, UploadRequest, UploadTransport,
};

pub use config::ClientConfig;

/// reqwest-backed transport for the prediction endpoint.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    config: ClientConfig,
    endpoint: String,
}

impl ReqwestTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: config.endpoint_url(),
            client,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_form(
        &self,
        request: &UploadRequest,
        progress: ProgressSink,
    ) -> Result<Form, TransportError> {
        let file = &request.file;
        let stream =
            body::progress_stream(file.data().clone(), self.config.chunk_size_bytes, progress);

        let part = Part::stream_with_length(Body::wrap_stream(stream), file.size())
            .file_name(file.name().to_string())
            .mime_str(file.content_type())
            .map_err(|e| {
                TransportError::Client(format!(
                    "Invalid content type '{}': {}",
                    file.content_type(),
                    e
                ))
            })?;

        Ok(Form::new().part(request.field_name, part))
    }
}

#[async_trait]
impl UploadTransport for ReqwestTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[tracing::instrument(
        skip(self, request, progress),
        fields(attempt = progress.attempt(), file = %request.file.name(), size = request.file.size())
    )]
    async fn send(
        &self,
        request: UploadRequest,
        progress: ProgressSink,
    ) -> Result<TransportResponse, TransportError> {
        let form = self.build_form(&request, progress)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            TransportError::Unreachable(format!("Failed to read response body: {}", e))
        })?;

        tracing::debug!(status, bytes = body.len(), "Response received");
        Ok(TransportResponse { status, body })
    }
}

/// Builder failures never left the process; everything else means the request was
/// attempted and no response arrived.
fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Client(err.to_string())
    } else {
        TransportError::Unreachable(err.to_string())
    }
}
