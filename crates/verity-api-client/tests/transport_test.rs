use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use verity_api_client::{ClientConfig, ReqwestTransport};
use verity_core::{
    ErrorKind, EventKind, ProgressSink, SelectedFile, TransportError, UploadController,
    UploadRequest, UploadState, UploadTransport,
};

fn transport_for(base_url: &str) -> ReqwestTransport {
    let config = ClientConfig {
        chunk_size_bytes: 8,
        ..ClientConfig::default().with_base_url(base_url)
    };
    ReqwestTransport::new(config).expect("valid config")
}

fn face_png() -> SelectedFile {
    SelectedFile::new("face.png", "image/png", b"pretend-png-bytes-0123456789".to_vec())
}

#[tokio::test]
async fn test_upload_posts_multipart_file_and_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/predict")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="face.png""#.to_string()),
            Matcher::Regex("Content-Type: image/png".to_string()),
            Matcher::Regex("pretend-png-bytes-0123456789".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"label":"fake","confidence":0.92}"#)
        .create_async()
        .await;

    let mut controller = UploadController::new(Arc::new(transport_for(&server.url())));
    controller.select_file(face_png());
    controller.submit();

    let state = controller.settle().await.clone();

    mock.assert_async().await;
    assert_eq!(
        state,
        UploadState::Succeeded {
            result: json!({ "label": "fake", "confidence": 0.92 })
        }
    );
}

#[tokio::test]
async fn test_progress_reports_reach_file_size() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/predict")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let transport = transport_for(&server.url());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let file = face_png();
    let size = file.size();

    let response = transport
        .send(UploadRequest::new(file), ProgressSink::new(3, tx))
        .await
        .expect("response");
    assert_eq!(response.status, 200);

    let mut reports = Vec::new();
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.attempt, 3);
        if let EventKind::Progress { bytes_sent, .. } = event.kind {
            reports.push(bytes_sent);
        }
    }

    assert!(reports.len() > 1);
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(reports.last(), Some(&size));
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/predict")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"model unavailable"}"#)
        .create_async()
        .await;

    let mut controller = UploadController::new(Arc::new(transport_for(&server.url())));
    controller.select_file(face_png());
    controller.submit();

    let error = controller
        .settle()
        .await
        .error()
        .cloned()
        .expect("should be failed");
    assert_eq!(error.kind, ErrorKind::ServerError);
    assert_eq!(error.message, "model unavailable");
    assert_eq!(controller.display_percent(), 0);
}

#[tokio::test]
async fn test_error_field_used_when_message_missing() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/predict")
        .with_status(400)
        .with_body(r#"{"success":false,"error":"Unsupported file type"}"#)
        .create_async()
        .await;

    let mut controller = UploadController::new(Arc::new(transport_for(&server.url())));
    controller.select_file(face_png());
    controller.submit();

    let error = controller
        .settle()
        .await
        .error()
        .cloned()
        .expect("should be failed");
    assert_eq!(error.kind, ErrorKind::ServerError);
    assert_eq!(error.message, "Unsupported file type");
}

#[tokio::test]
async fn test_refused_connection_is_unreachable() {
    // Nothing listens on port 1.
    let transport = transport_for("http://127.0.0.1:1");
    let endpoint = transport.endpoint().to_string();

    let mut controller = UploadController::new(Arc::new(transport));
    controller.select_file(face_png());
    controller.submit();

    let error = controller
        .settle()
        .await
        .error()
        .cloned()
        .expect("should be failed");
    assert_eq!(error.kind, ErrorKind::Unreachable);
    assert!(error.message.contains(&endpoint));
}

#[tokio::test]
async fn test_invalid_content_type_is_client_error_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/predict")
        .expect(0)
        .create_async()
        .await;

    let transport = transport_for(&server.url());
    let (tx, _rx) = mpsc::unbounded_channel();
    let file = SelectedFile::new("face.png", "not a mime", b"bytes".to_vec());

    let err = transport
        .send(UploadRequest::new(file), ProgressSink::new(1, tx))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Client(_)));
    mock.assert_async().await;
}
