//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::{io, path::PathBuf};

use lightscan::{
    BatchOrchestrator, DiscoveryOptions, ErrorKind, LightscanError, Percentile, ScanOptions,
    discover,
};

#[test]
fn nonexistent_directory_message() {
    let error = discover("this_directory_does_not_exist", &DiscoveryOptions::new()).unwrap_err();
    let error_message = error.to_string();
    assert!(
        error_message.contains("Invalid scan directory"),
        "Error message should mention the directory: {error_message}",
    );
    assert!(error_message.contains("this_directory_does_not_exist"));
}

#[test]
fn invalid_percentile_message() {
    let error = Percentile::new(150).unwrap_err();
    assert_eq!(error.to_string(), "Percentile must be between 0 and 100, got 150");
    assert_eq!(error.kind().as_str(), "invalid-percentile");
}

#[test]
fn frame_errors_report_index() {
    let error = LightscanError::DecodeFrameError {
        path: PathBuf::from("clip.mp4"),
        frame_index: 41,
        reason: "Invalid data found when processing input".to_string(),
    };
    assert_eq!(error.frame_index(), Some(41));
    assert_eq!(error.kind(), ErrorKind::DecodeFrame);
    let error_message = error.to_string();
    assert!(error_message.contains("frame 41"), "{error_message}");
    assert!(error_message.contains("clip.mp4"), "{error_message}");
}

#[test]
fn empty_frame_reports_index() {
    let error = LightscanError::EmptyFrameError {
        path: PathBuf::from("clip.mp4"),
        frame_index: 7,
    };
    assert_eq!(error.frame_index(), Some(7));
    assert_eq!(error.kind().to_string(), "empty-frame");
}

#[test]
fn file_level_errors_have_no_index() {
    let error = LightscanError::DecodeOpenError {
        path: PathBuf::from("clip.mp4"),
        reason: "moov atom not found".to_string(),
    };
    assert_eq!(error.frame_index(), None);
    assert_eq!(LightscanError::Cancelled.frame_index(), None);
}

#[test]
fn io_errors_convert() {
    let error: LightscanError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
    assert_eq!(error.kind(), ErrorKind::Io);
    assert!(error.to_string().starts_with("I/O error"));
}

#[test]
fn scan_of_file_path_is_rejected() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temporary_directory.path().join("clip.mp4");
    std::fs::write(&file_path, b"").expect("Failed to write file");

    let result = BatchOrchestrator::new(ScanOptions::new()).run(&file_path);
    match result {
        Err(LightscanError::PathError { path, .. }) => assert_eq!(path, file_path),
        Err(other) => panic!("Expected PathError, got: {other}"),
        Ok(_) => panic!("Expected PathError, got a result"),
    }
}
