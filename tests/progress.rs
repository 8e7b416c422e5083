//! Progress and cancellation tests.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use framereel::{
    AssembleOptions, CancellationToken, FrameAssembler, FramereelError, OperationType,
    ProgressCallback, ProgressInfo, VideoCodec,
};
use image::{Rgb, RgbImage};

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn cancellation_token_default_not_cancelled() {
    assert!(!CancellationToken::new().is_cancelled());
    assert!(!CancellationToken::default().is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

// ── Assembly progress ──────────────────────────────────────────────

#[derive(Default)]
struct RecordingProgress {
    started: Mutex<Vec<u64>>,
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_frame(&self, position: u64, _path: &Path) {
        self.started.lock().unwrap().push(position);
    }

    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

fn write_frames(directory: &Path, count: u32) {
    for index in 0..count {
        let value = (index * 20) as u8;
        RgbImage::from_pixel(16, 16, Rgb([value, value, value]))
            .save(directory.join(format!("{index}.png")))
            .expect("Failed to save png");
    }
}

fn skip_if_encoder_missing(result: &Result<impl std::fmt::Debug, FramereelError>) -> bool {
    if let Err(FramereelError::VideoEncodeError(message)) = result {
        eprintln!("Skipping: MPEG-4 encoder not available ({message})");
        return true;
    }
    false
}

#[test]
fn progress_reports_every_frame_then_final() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frames(directory.path(), 5);

    let recorder = Arc::new(RecordingProgress::default());
    let options = AssembleOptions::new()
        .resolution(16, 16)
        .fps(5)
        .codec(VideoCodec::Mpeg4)
        .with_progress(recorder.clone());

    let result = FrameAssembler::new(options).run(directory.path());
    if skip_if_encoder_missing(&result) {
        return;
    }
    result.expect("Failed to assemble");

    assert_eq!(*recorder.started.lock().unwrap(), [0, 1, 2, 3, 4]);

    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), 6, "five frame reports plus a final one");

    for (position, info) in infos.iter().take(5).enumerate() {
        assert_eq!(info.operation, OperationType::FrameAssembly);
        assert_eq!(info.current_frame, Some(position as u64));
        assert_eq!(info.current, position as u64 + 1);
        assert_eq!(info.total, Some(5));
        let expected_name = format!("{position}.png");
        assert_eq!(
            info.current_path.as_ref().and_then(|p| p.file_name()),
            Some(std::ffi::OsStr::new(&expected_name))
        );
    }

    let last = infos.last().unwrap();
    assert_eq!(last.current, 5);
    assert_eq!(last.current_frame, None);
    assert_eq!(last.percentage, Some(100.0));
}

#[test]
fn batch_size_reduces_callbacks() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frames(directory.path(), 6);

    let recorder = Arc::new(RecordingProgress::default());
    let options = AssembleOptions::new()
        .resolution(16, 16)
        .codec(VideoCodec::Mpeg4)
        .with_progress(recorder.clone())
        .with_batch_size(3);

    let result = FrameAssembler::new(options).run(directory.path());
    if skip_if_encoder_missing(&result) {
        return;
    }
    result.expect("Failed to assemble");

    let infos = recorder.infos.lock().unwrap();
    let counts: Vec<u64> = infos.iter().map(|info| info.current).collect();
    assert_eq!(counts, [3, 6, 6]);
}

#[test]
fn cancelled_run_returns_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frames(directory.path(), 3);

    let token = CancellationToken::new();
    token.cancel();

    let options = AssembleOptions::new()
        .resolution(16, 16)
        .codec(VideoCodec::Mpeg4)
        .with_cancellation(token);

    let result = FrameAssembler::new(options).run(directory.path());
    if skip_if_encoder_missing(&result) {
        return;
    }

    match result {
        Err(FramereelError::Cancelled) => {}
        other => panic!("Expected Cancelled, got: {other:?}"),
    }
}

#[test]
fn failing_frame_is_announced_before_it_is_read() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    write_frames(directory.path(), 4);
    fs::write(directory.path().join("2.png"), b"not a png").expect("Failed to write file");

    let recorder = Arc::new(RecordingProgress::default());
    let options = AssembleOptions::new()
        .resolution(16, 16)
        .codec(VideoCodec::Mpeg4)
        .with_progress(recorder.clone());

    let result = FrameAssembler::new(options).run(directory.path());
    if skip_if_encoder_missing(&result) {
        return;
    }
    assert!(matches!(result, Err(FramereelError::FrameDecode { .. })));

    assert_eq!(*recorder.started.lock().unwrap(), [0, 1, 2]);
    let written: Vec<Option<u64>> = recorder
        .infos
        .lock()
        .unwrap()
        .iter()
        .map(|info| info.current_frame)
        .collect();
    assert_eq!(written, [Some(0), Some(1)]);
}
