//! Frame discovery and ordering tests.

use std::fs;
use std::path::{Path, PathBuf};

use framereel::{
    AssembleOptions, FrameSequence, FramereelError, MalformedNamePolicy, parse_frame_index,
};

fn touch(directory: &Path, name: &str) -> PathBuf {
    let path = directory.join(name);
    fs::write(&path, b"").expect("Failed to create file");
    path
}

fn names(sequence: &FrameSequence) -> Vec<String> {
    sequence
        .iter()
        .map(|entry| entry.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn sorts_numerically_not_lexicographically() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    for name in ["10.png", "2.png", "1.png", "0.png", "100.png", "9.png"] {
        touch(directory.path(), name);
    }

    let sequence = FrameSequence::collect(directory.path(), &AssembleOptions::new())
        .expect("Failed to collect frames");

    assert_eq!(
        names(&sequence),
        ["0.png", "1.png", "2.png", "9.png", "10.png", "100.png"]
    );
    let indices: Vec<u64> = sequence.iter().map(|entry| entry.index).collect();
    assert_eq!(indices, [0, 1, 2, 9, 10, 100]);
}

#[test]
fn ignores_other_extensions_and_directories() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch(directory.path(), "0.png");
    touch(directory.path(), "1.PNG");
    touch(directory.path(), "2.jpg");
    touch(directory.path(), "notes.txt");
    fs::create_dir(directory.path().join("3.png")).expect("Failed to create dir");

    let sequence = FrameSequence::collect(directory.path(), &AssembleOptions::new())
        .expect("Failed to collect frames");

    assert_eq!(names(&sequence), ["0.png", "1.PNG"]);
}

#[test]
fn custom_extension() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch(directory.path(), "0.png");
    touch(directory.path(), "5.jpg");
    touch(directory.path(), "3.jpg");

    let options = AssembleOptions::new().extension(".JPG");
    let sequence = FrameSequence::collect(directory.path(), &options).expect("collect");

    assert_eq!(names(&sequence), ["3.jpg", "5.jpg"]);
}

#[test]
fn malformed_name_is_rejected_by_default() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch(directory.path(), "0.png");
    touch(directory.path(), "1.png");
    let bad = touch(directory.path(), "frame_a.png");

    let result = FrameSequence::collect(directory.path(), &AssembleOptions::new());

    match result {
        Err(FramereelError::MalformedFrameName { path }) => assert_eq!(path, bad),
        other => panic!("Expected MalformedFrameName, got: {other:?}"),
    }
}

#[test]
fn malformed_name_is_skipped_on_request() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch(directory.path(), "1.png");
    touch(directory.path(), "frame_a.png");
    touch(directory.path(), "0.png");

    let options = AssembleOptions::new().malformed_names(MalformedNamePolicy::Skip);
    let sequence = FrameSequence::collect(directory.path(), &options).expect("collect");

    assert_eq!(names(&sequence), ["0.png", "1.png"]);
}

#[test]
fn duplicate_frame_numbers_are_rejected() {
    let result = FrameSequence::from_paths(
        vec![PathBuf::from("1.png"), PathBuf::from("01.png")],
        MalformedNamePolicy::Reject,
    );

    match result {
        Err(FramereelError::DuplicateFrameIndex { index, .. }) => assert_eq!(index, 1),
        other => panic!("Expected DuplicateFrameIndex, got: {other:?}"),
    }
}

#[test]
fn missing_directory_reports_path() {
    let result = FrameSequence::collect("this_directory_does_not_exist", &AssembleOptions::new());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("this_directory_does_not_exist"),
        "Error should name the directory: {error_message}",
    );
}

#[test]
fn empty_directory_gives_empty_sequence() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    touch(directory.path(), "readme.md");

    let sequence = FrameSequence::collect(directory.path(), &AssembleOptions::new())
        .expect("collect");

    assert!(sequence.is_empty());
    assert_eq!(sequence.len(), 0);
    assert!(sequence.gaps().is_empty());
    assert_eq!(sequence.missing_frames(), 0);
}

#[test]
fn gaps_lists_missing_numbers() {
    let sequence = FrameSequence::from_paths(
        ["0.png", "1.png", "4.png", "6.png"].map(PathBuf::from),
        MalformedNamePolicy::Reject,
    )
    .expect("build sequence");

    assert_eq!(sequence.gaps(), [2..=3, 5..=5]);
    assert_eq!(sequence.missing_frames(), 3);
}

#[test]
fn sparse_numbering_does_not_expand_gaps() {
    let last = format!("{}.png", u64::MAX);
    let sequence = FrameSequence::from_paths(
        [PathBuf::from("0.png"), PathBuf::from(&last)],
        MalformedNamePolicy::Reject,
    )
    .expect("build sequence");

    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.gaps(), [1..=u64::MAX - 1]);
    assert_eq!(sequence.missing_frames(), u64::MAX - 1);
}

#[test]
fn oversized_frame_number_has_its_own_error() {
    let oversized = PathBuf::from("99999999999999999999999.png");

    let result = FrameSequence::from_paths(
        [PathBuf::from("0.png"), oversized.clone()],
        MalformedNamePolicy::Reject,
    );
    match result {
        Err(FramereelError::FrameIndexOutOfRange { path }) => assert_eq!(path, oversized),
        other => panic!("Expected FrameIndexOutOfRange, got: {other:?}"),
    }

    let skipped = FrameSequence::from_paths(
        [PathBuf::from("0.png"), oversized],
        MalformedNamePolicy::Skip,
    )
    .expect("oversized name is skipped");
    assert_eq!(skipped.len(), 1);
}

#[test]
fn parse_frame_index_cases() {
    assert_eq!(parse_frame_index(Path::new("0.png")), Some(0));
    assert_eq!(parse_frame_index(Path::new("dir/42.png")), Some(42));
    assert_eq!(parse_frame_index(Path::new("0007.png")), Some(7));
    assert_eq!(parse_frame_index(Path::new("3.final.png")), Some(3));
    assert_eq!(parse_frame_index(Path::new("frame_a.png")), None);
    assert_eq!(parse_frame_index(Path::new("-1.png")), None);
    assert_eq!(parse_frame_index(Path::new("+1.png")), None);
    assert_eq!(parse_frame_index(Path::new(".png")), None);
    assert_eq!(parse_frame_index(Path::new("99999999999999999999999.png")), None);
}
