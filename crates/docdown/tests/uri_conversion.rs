//! URI entry point integration tests.

use docdown::{DispatchEngine, DocdownError, FetchedResponse, StreamInfo, parse_data_uri};
use std::fs;
use url::Url;

#[test]
fn test_percent_encoded_data_uri() {
    let engine = DispatchEngine::with_builtins().unwrap();
    let result = engine
        .convert_uri("data:text/csv;charset=utf-8,a%2Cb%0A1%2C2", &StreamInfo::new())
        .unwrap();
    assert_eq!(result.markdown, "| a | b |\n| --- | --- |\n| 1 | 2 |");
}

#[test]
fn test_base64_data_uri() {
    let engine = DispatchEngine::with_builtins().unwrap();
    let result = engine
        .convert("data:text/plain;base64,SGVsbG8sIFdvcmxkIQ==", &StreamInfo::new())
        .unwrap();
    assert_eq!(result.markdown, "Hello, World!");
}

#[test]
fn test_uppercase_data_scheme() {
    let engine = DispatchEngine::with_builtins().unwrap();
    let result = engine.convert("DATA:text/plain,hi", &StreamInfo::new()).unwrap();
    assert_eq!(result.markdown, "hi");
}

#[test]
fn test_data_uri_hints_override_mimetype() {
    let engine = DispatchEngine::with_builtins().unwrap();
    let result = engine
        .convert_uri("data:text/plain,k%2Cv%0A1%2C2", &StreamInfo::new().with_mimetype("text/csv"))
        .unwrap();
    assert!(result.markdown.starts_with("| k | v |"));
}

#[test]
fn test_malformed_data_uris() {
    assert!(matches!(parse_data_uri("data:text/plain"), Err(DocdownError::Validation { .. })));
    assert!(matches!(
        parse_data_uri("data:;base64,@@not base64@@"),
        Err(DocdownError::Validation { .. })
    ));

    let bare = parse_data_uri("data:,plain").unwrap();
    assert_eq!(bare.mimetype, None);
    assert_eq!(bare.data, b"plain");
}

#[test]
fn test_file_uri_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my notes.md");
    fs::write(&path, "# Notes\n\n\n\nsaved").unwrap();

    let uri = Url::from_file_path(&path).unwrap();
    let engine = DispatchEngine::with_builtins().unwrap();
    let result = engine.convert(uri.as_str(), &StreamInfo::new()).unwrap();

    assert_eq!(result.markdown, "# Notes\n\nsaved");
}

#[test]
fn test_localhost_file_uri_is_local() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.txt");
    fs::write(&path, "local content").unwrap();

    let mut uri = Url::from_file_path(&path).unwrap();
    uri.set_host(Some("localhost")).unwrap();

    let engine = DispatchEngine::with_builtins().unwrap();
    let result = engine.convert_uri(uri.as_str(), &StreamInfo::new()).unwrap();
    assert_eq!(result.markdown, "local content");
}

#[test]
fn test_remote_file_uri_is_rejected() {
    let engine = DispatchEngine::with_builtins().unwrap();
    let err = engine
        .convert_uri("file://fileserver/share/report.txt", &StreamInfo::new())
        .unwrap_err();
    assert!(err.to_string().contains("Netloc 'fileserver' is not a local host"));
}

#[test]
fn test_response_headers_drive_detection() {
    let engine = DispatchEngine::with_builtins().unwrap();
    let response = FetchedResponse {
        url: "https://example.com/download?id=7".to_string(),
        content_type: Some("application/octet-stream".to_string()),
        content_disposition: Some("attachment; filename=\"figures.csv\"".to_string()),
        body: b"year,total\n2024,12\n".to_vec(),
    };

    let result = engine.convert_response(&response, &StreamInfo::new()).unwrap();
    assert_eq!(result.markdown, "| year | total |\n| --- | --- |\n| 2024 | 12 |");
}

#[test]
fn test_response_charset_is_used() {
    let engine = DispatchEngine::with_builtins().unwrap();
    let response = FetchedResponse {
        url: "https://example.com/readme".to_string(),
        content_type: Some("text/plain; charset=windows-1252".to_string()),
        content_disposition: None,
        body: b"caf\xe9".to_vec(),
    };

    let result = engine.convert_response(&response, &StreamInfo::new()).unwrap();
    assert_eq!(result.markdown, "café");
}
