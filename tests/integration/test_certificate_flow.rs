// Certificate creation with real disk uploads, end to end through the router

use crate::common::*;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use certificate_registry::api::{create_router, AppState};
use certificate_registry::certificate::qr::QrEncoder;
use certificate_registry::certificate::service::CertificateService;
use certificate_registry::certificate::uploads::DiskUploadStore;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_with_disk_upload_then_verify() {
    let dir = TempDir::new().unwrap();
    let harness = create_test_harness();
    let app_state = AppState {
        certificates: Arc::new(CertificateService::new(
            harness.students.clone(),
            Arc::new(DiskUploadStore::new(dir.path())),
            QrEncoder::default(),
            "https://certs.example.com".to_string(),
        )),
        ..harness.app_state.clone()
    };
    let app = create_router(&app_state, harness.auth_state.clone()).with_state(app_state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/students")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body(
            &sample_student_fields(),
            Some(("../escape.png", &b"image-bytes"[..])),
        )))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let image_path = std::path::PathBuf::from(created["imageUrl"].as_str().unwrap());
    assert_eq!(image_path.parent().unwrap(), dir.path());
    assert_eq!(std::fs::read(&image_path).unwrap(), b"image-bytes");

    // The stored record is what a verifier scanning the QR code would fetch
    let id = created["certificateId"].as_str().unwrap();
    let request = Request::builder()
        .uri(format!("/api/students/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let fetched: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(fetched, created);
    assert_eq!(harness.students.records.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = certificate_registry::config::Config {
        body_size_limit_bytes: 1024,
        ..certificate_registry::config::Config::test_config()
    };
    let harness = create_test_harness_with_config(config);
    let app = create_router(&harness.app_state, harness.auth_state.clone())
        .with_state(harness.app_state);

    let big = vec![b'x'; 64 * 1024];
    let body = multipart_body(&sample_student_fields(), Some(("big.png", big.as_slice())));
    let request = Request::builder()
        .method("POST")
        .uri("/api/students")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(harness.students.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_insert_leaves_no_file_on_disk() {
    let dir = TempDir::new().unwrap();
    let students = Arc::new(MockStudentStore {
        should_fail: true,
        ..Default::default()
    });
    let service = CertificateService::new(
        students,
        Arc::new(DiskUploadStore::new(dir.path())),
        QrEncoder::default(),
        "https://certs.example.com".to_string(),
    );

    let result = service
        .create(
            certificate_registry::core::models::NewStudent::default(),
            Some(certificate_registry::core::models::Upload {
                file_name: "photo.png".to_string(),
                bytes: b"image-bytes".to_vec(),
            }),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
