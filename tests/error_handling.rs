//! Error message tests.
//!
//! These verify that errors name the offending path or value so the CLI can
//! print them without extra context.

use std::path::PathBuf;

use framereel::{FramereelError, VideoProbe};

#[test]
fn probe_nonexistent_file() {
    let result = VideoProbe::probe("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to probe video"),
        "Error message should mention probing: {error_message}",
    );
}

#[test]
fn probe_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = VideoProbe::probe(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn malformed_name_message() {
    let error = FramereelError::MalformedFrameName {
        path: PathBuf::from("frame_a.png"),
    };
    assert_eq!(
        error.to_string(),
        "Frame file name frame_a.png does not start with a frame number"
    );
}

#[test]
fn no_frames_message() {
    let error = FramereelError::NoFrames {
        directory: PathBuf::from("shots"),
        extension: "png".to_string(),
    };
    assert_eq!(error.to_string(), "No frames matching *.png found in shots");
}

#[test]
fn duplicate_index_message() {
    let error = FramereelError::DuplicateFrameIndex {
        index: 1,
        first: PathBuf::from("1.png"),
        second: PathBuf::from("01.png"),
    };
    let message = error.to_string();
    assert!(message.contains("1.png") && message.contains("01.png"), "{message}");
}

#[test]
fn invalid_resolution_message() {
    let error = FramereelError::InvalidResolution {
        width: 2001,
        height: 2000,
    };
    assert!(error.to_string().contains("2001x2000"));
}

#[test]
fn oversized_frame_number_message() {
    let error = FramereelError::FrameIndexOutOfRange {
        path: PathBuf::from("99999999999999999999999.png"),
    };
    assert_eq!(
        error.to_string(),
        "Frame number in 99999999999999999999999.png does not fit in 64 bits"
    );
}
