//! Integration tests for the REST API.

#![cfg(feature = "api")]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use docdown::{
    DispatchEngine,
    api::{ApiSizeLimits, ConvertResponse, ErrorResponse, FormatsResponse, HealthResponse, InfoResponse, create_router, create_router_with_limits},
};

const BOUNDARY: &str = "----docdown-boundary";

fn app() -> Router {
    create_router(DispatchEngine::with_builtins().unwrap())
}

fn multipart_body(file_name: &str, content_type: &str, content: &str) -> String {
    format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\
         \r\n\
         {content}\r\n\
         --{b}--\r\n",
        b = BOUNDARY
    )
}

fn upload(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/convert")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app()
        .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = body_json(response).await;
    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_info_endpoint_reports_limits() {
    let app = create_router_with_limits(DispatchEngine::with_builtins().unwrap(), ApiSizeLimits::from_mb(5));
    let response = app
        .oneshot(Request::builder().uri("/api/v1/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let info: InfoResponse = body_json(response).await;
    assert_eq!(info.max_request_body_bytes, 5 * 1024 * 1024);
    assert!(info.endpoints.iter().any(|e| e.method == "POST" && e.path == "/api/v1/convert/url"));
}

#[tokio::test]
async fn test_formats_endpoint_lists_converters_in_dispatch_order() {
    let response = app()
        .oneshot(Request::builder().uri("/api/v1/formats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let formats: FormatsResponse = body_json(response).await;

    assert!(formats.formats.contains(&"csv".to_string()));
    assert!(formats.formats.contains(&"ipynb".to_string()));
    assert_eq!(formats.count, formats.formats.len());
    assert_eq!(formats.converters.first().map(|c| c.name.as_str()), Some("csv-converter"));
    assert_eq!(
        formats.converters.last().map(|c| c.name.as_str()),
        Some("plain-text-converter")
    );
}

#[tokio::test]
async fn test_convert_csv_upload() {
    let body = multipart_body("people.csv", "text/csv", "name,age\nAda,36");
    let response = app().oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let converted: ConvertResponse = body_json(response).await;
    assert!(converted.success);
    assert_eq!(converted.markdown, "| name | age |\n| --- | --- |\n| Ada | 36 |");
    assert!(converted.processing_time >= 0.0);
}

#[tokio::test]
async fn test_convert_upload_detected_from_name_only() {
    let body = multipart_body("notes.md", "application/octet-stream", "# Notes\n\n\n\n- one");
    let response = app().oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let converted: ConvertResponse = body_json(response).await;
    assert_eq!(converted.markdown, "# Notes\n\n- one");
}

#[tokio::test]
async fn test_convert_without_file_is_bad_request() {
    let response = app().oneshot(upload(format!("--{}--\r\n", BOUNDARY))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = body_json(response).await;
    assert_eq!(error.error_type, "ValidationError");
    assert_eq!(error.status_code, 400);
}

#[tokio::test]
async fn test_convert_unsupported_upload() {
    let body = multipart_body("blob.bin", "application/octet-stream", "\u{0}\u{1}\u{2}\u{0}\u{3}");
    let response = app().oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let error: ErrorResponse = body_json(response).await;
    assert_eq!(error.error_type, "UnsupportedFormatError");
}

#[tokio::test]
async fn test_convert_data_url() {
    let request = post_json(
        "/api/v1/convert/url",
        json!({ "url": "data:text/csv,a%2Cb%0A1%2C2" }),
    );
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let converted: ConvertResponse = body_json(response).await;
    assert_eq!(converted.markdown, "| a | b |\n| --- | --- |\n| 1 | 2 |");
}

#[tokio::test]
async fn test_convert_url_refuses_file_urls() {
    let request = post_json("/api/v1/convert/url", json!({ "url": "file:///etc/hostname" }));
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_convert_url_missing_field() {
    let request = post_json("/api/v1/convert/url", json!({ "keep_data_uris": true }));
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = body_json(response).await;
    assert!(error.message.contains("url"));
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let app = create_router_with_limits(DispatchEngine::with_builtins().unwrap(), ApiSizeLimits::new(256));
    let body = multipart_body("big.txt", "text/plain", &"x".repeat(4096));
    let mut request = upload(body.clone());
    request.headers_mut().insert("content-length", body.len().into());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
