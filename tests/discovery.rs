//! File discovery tests.

mod common;

use std::fs;

use lightscan::{DiscoveryOptions, ErrorKind, LightscanError, discover};

use common::touch_all;

#[test]
fn discovers_matching_files_sorted() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch_all(directory.path(), &["c.mp4", "a.mp4", "notes.txt", "b.mp4", "mp4"]);

    let videos = discover(directory.path(), &DiscoveryOptions::new()).expect("discover");
    let labels: Vec<&str> = videos.iter().map(|video| video.label()).collect();
    assert_eq!(labels, ["a.mp4", "b.mp4", "c.mp4"]);
    assert!(videos.iter().all(|video| video.path().starts_with(directory.path())));
}

#[test]
fn discovery_is_idempotent() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch_all(directory.path(), &["z.mp4", "m.mp4", "a.mp4", "k.mp4"]);

    let options = DiscoveryOptions::new();
    let first = discover(directory.path(), &options).expect("discover");
    let second = discover(directory.path(), &options).expect("discover");
    assert_eq!(first, second);
}

#[test]
fn empty_directory_is_not_an_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let videos = discover(directory.path(), &DiscoveryOptions::new()).expect("discover");
    assert!(videos.is_empty());
}

#[test]
fn case_insensitive_by_default() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch_all(directory.path(), &["upper.MP4", "lower.mp4"]);

    let videos = discover(directory.path(), &DiscoveryOptions::new()).expect("discover");
    assert_eq!(videos.len(), 2);

    let exact = DiscoveryOptions::new().case_sensitive(true);
    let videos = discover(directory.path(), &exact).expect("discover");
    let labels: Vec<&str> = videos.iter().map(|video| video.label()).collect();
    assert_eq!(labels, ["lower.mp4"]);
}

#[test]
fn custom_extensions() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch_all(directory.path(), &["a.mov", "b.mkv", "c.mp4"]);

    let options = DiscoveryOptions::new().with_extensions([".mov", "mkv"]);
    let videos = discover(directory.path(), &options).expect("discover");
    let labels: Vec<&str> = videos.iter().map(|video| video.label()).collect();
    assert_eq!(labels, ["a.mov", "b.mkv"]);
}

#[test]
fn subdirectories_are_not_videos() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir(directory.path().join("folder.mp4")).expect("mkdir");
    fs::create_dir(directory.path().join("nested")).expect("mkdir");
    touch_all(&directory.path().join("nested"), &["deep.mp4"]);
    touch_all(directory.path(), &["top.mp4"]);

    let videos = discover(directory.path(), &DiscoveryOptions::new()).expect("discover");
    let labels: Vec<&str> = videos.iter().map(|video| video.label()).collect();
    assert_eq!(labels, ["top.mp4"]);
}

#[test]
fn missing_directory_is_path_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = directory.path().join("does-not-exist");

    let error = discover(&missing, &DiscoveryOptions::new()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Path);
    match error {
        LightscanError::PathError { path, .. } => assert_eq!(path, missing),
        other => panic!("expected PathError, got {other:?}"),
    }
}

#[test]
fn file_is_not_a_directory() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch_all(directory.path(), &["clip.mp4"]);

    let error = discover(directory.path().join("clip.mp4"), &DiscoveryOptions::new()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Path);
    assert!(
        error.to_string().contains("not a directory"),
        "Error should explain the rejection: {error}",
    );
}
