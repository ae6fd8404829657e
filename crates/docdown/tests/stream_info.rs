//! Stream guess and merge integration tests.

use docdown::core::guess::{build_guesses, extract_guesses, guess};
use docdown::{DetectionConfig, StreamInfo};
use std::io::Cursor;

#[test]
fn test_merge_later_values_win() {
    let base = StreamInfo::new()
        .with_mimetype("text/plain")
        .with_filename("notes.txt");
    let detected = StreamInfo::new()
        .with_mimetype("text/markdown")
        .with_charset("UTF-8");
    let hints = StreamInfo::new().with_extension(".md");

    let merged = base.merge([&detected, &hints]);

    assert_eq!(merged.mimetype.as_deref(), Some("text/markdown"));
    assert_eq!(merged.charset.as_deref(), Some("UTF-8"));
    assert_eq!(merged.extension.as_deref(), Some(".md"));
    assert_eq!(merged.filename.as_deref(), Some("notes.txt"));
    assert_eq!(base.mimetype.as_deref(), Some("text/plain"), "merge must not modify its receiver");
}

#[test]
fn test_explicit_override_after_merge() {
    let merged = StreamInfo::new()
        .with_mimetype("text/plain")
        .merge([&StreamInfo::new().with_mimetype("text/html")])
        .with_mimetype("text/csv");
    assert_eq!(merged.mimetype.as_deref(), Some("text/csv"));
}

#[test]
fn test_empty_stream_info() {
    assert!(StreamInfo::new().is_empty());
    assert!(!StreamInfo::new().with_url("https://example.com").is_empty());
    assert!(StreamInfo::new().merge([&StreamInfo::new()]).is_empty());
}

#[test]
fn test_serde_skips_unknown_fields() {
    let info = StreamInfo::new().with_extension(".csv");
    let json = serde_json::to_string(&info).unwrap();
    assert_eq!(json, r#"{"extension":".csv"}"#);

    let back: StreamInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, info);
}

#[test]
fn test_content_sniffing_beats_misleading_name() {
    let mut stream = Cursor::new(b"<!DOCTYPE html><html><body><p>hi</p></body></html>".to_vec());
    let guesses = guess(&mut stream, Some("page.txt"), &DetectionConfig::default()).unwrap();

    assert_eq!(guesses[0].mimetype.as_deref(), Some("text/html"));
    assert_eq!(guesses.last().and_then(|g| g.extension.as_deref()), Some(".txt"));
}

#[test]
fn test_extract_guesses_puts_caller_hints_first() {
    let mut stream = Cursor::new(b"%PDF-1.7\n".to_vec());
    let base = StreamInfo::new()
        .with_extension(".csv")
        .with_local_path("/data/export.csv");

    let guesses = extract_guesses(&mut stream, &base, &DetectionConfig::default()).unwrap();

    assert_eq!(guesses[0].extension.as_deref(), Some(".csv"));
    assert_eq!(guesses[0].mimetype.as_deref(), Some("text/csv"));
    assert!(guesses.iter().any(|g| g.mimetype.as_deref() == Some("application/pdf")
        && g.local_path.as_deref() == Some("/data/export.csv")));
    assert_eq!(stream.position(), 0);
}

#[test]
fn test_sniff_limit_is_respected() {
    let mut bytes = vec![b' '; 128];
    bytes.extend_from_slice(b"<html><body>late markup</body></html>");
    let detection = DetectionConfig {
        sniff_bytes: 64,
        ..Default::default()
    };

    let guesses = guess(&mut Cursor::new(bytes), None, &detection).unwrap();

    // Only whitespace is visible, so the sniffer settles for plain text.
    assert_eq!(guesses.len(), 1);
    assert_eq!(guesses[0].mimetype.as_deref(), Some("text/plain"));
}

#[test]
fn test_build_guesses_without_raw_keeps_base() {
    let base = StreamInfo::new().with_mimetype("application/zip");
    let guesses = build_guesses(&base, &[]);
    assert_eq!(guesses, vec![StreamInfo::new().with_mimetype("application/zip").with_extension(".zip")]);

    assert!(build_guesses(&StreamInfo::new(), &[]).is_empty());
}
