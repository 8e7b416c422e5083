//! The frame assembler: directory of numbered frames in, one video out.
//!
//! A run is a single sequential pass:
//!
//! 1. collect the frame files and sort them by frame number,
//! 2. open the output video,
//! 3. decode, resize, and append each frame in order,
//! 4. finalize the video.
//!
//! Everything that can be rejected up front (options, file names, an empty
//! directory, an existing output without overwrite) is checked before the
//! output file is touched. Once the output is open it is finalized on every
//! exit path, including a frame that fails to decode halfway through.
//!
//! # Example
//!
//! ```no_run
//! use framereel::{AssembleOptions, FrameAssembler};
//!
//! let report = FrameAssembler::new(AssembleOptions::new().fps(25)).run("frames")?;
//! println!("wrote {} frames to {}", report.frames_written, report.output.display());
//! # Ok::<(), framereel::FramereelError>(())
//! ```

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::RgbImage;

use crate::configuration::AssembleOptions;
use crate::encode::VideoWriter;
use crate::error::FramereelError;
use crate::frame::{load_frame, resize_frame};
use crate::progress::ProgressTracker;
use crate::sequence::FrameSequence;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
#[must_use]
pub struct AssemblyReport {
    /// The video that was written.
    pub output: PathBuf,
    /// Number of frames in the video.
    pub frames_written: u64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
    /// Runs of frame numbers missing from the input sequence.
    pub gaps: Vec<RangeInclusive<u64>>,
    /// Total count of missing frame numbers.
    pub missing_frames: u64,
    /// Wall-clock time of the encode pass.
    pub elapsed: Duration,
}

/// Turns a directory of numbered frames into a video.
#[derive(Debug, Clone, Default)]
pub struct FrameAssembler {
    options: AssembleOptions,
}

impl FrameAssembler {
    /// Create an assembler with the given options.
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// The options this assembler runs with.
    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// List the frame files of `directory` in ascending frame-number order.
    ///
    /// See [`FrameSequence::collect`] for the errors.
    pub fn collect_and_sort_filenames<P: AsRef<Path>>(
        &self,
        directory: P,
    ) -> Result<FrameSequence, FramereelError> {
        FrameSequence::collect(directory, &self.options)
    }

    /// Decode one frame file and resize it to the target resolution.
    ///
    /// # Errors
    ///
    /// [`FramereelError::FrameDecode`] if the file is unreadable or not an image.
    pub fn process_frame(&self, path: &Path) -> Result<RgbImage, FramereelError> {
        let frame = load_frame(path)?;
        Ok(resize_frame(
            &frame,
            self.options.encoder.width,
            self.options.encoder.height,
            self.options.resize_filter,
        ))
    }

    /// Assemble every frame of `directory` into the configured output.
    ///
    /// # Errors
    ///
    /// - [`FramereelError::InvalidResolution`] / [`FramereelError::InvalidFrameRate`].
    /// - Any error of [`collect_and_sort_filenames`](Self::collect_and_sort_filenames).
    /// - [`FramereelError::NoFrames`] if nothing matched; no output is created.
    /// - [`FramereelError::OutputExists`] if overwriting is disabled.
    /// - Any error of [`assemble`](Self::assemble).
    pub fn run<P: AsRef<Path>>(&self, directory: P) -> Result<AssemblyReport, FramereelError> {
        let directory = directory.as_ref();
        self.options.encoder.validate()?;

        let sequence = self.collect_and_sort_filenames(directory)?;
        if sequence.is_empty() {
            return Err(FramereelError::NoFrames {
                directory: directory.to_path_buf(),
                extension: self.options.extension.clone(),
            });
        }

        let output = self.options.output_path(directory);
        if output.exists() && !self.options.overwrite {
            return Err(FramereelError::OutputExists(output));
        }

        self.assemble(&sequence, &output)
    }

    /// Encode an already collected sequence into `output`.
    ///
    /// The output is opened before the first frame is read. If a frame fails,
    /// the frames written so far are flushed and the file is closed before
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// - [`FramereelError::VideoWriteError`] for an empty sequence.
    /// - [`FramereelError::FrameDecode`] for an unreadable frame.
    /// - [`FramereelError::Cancelled`] if the cancellation token fires.
    /// - Encoder errors from [`VideoWriter`].
    pub fn assemble(
        &self,
        sequence: &FrameSequence,
        output: &Path,
    ) -> Result<AssemblyReport, FramereelError> {
        if sequence.is_empty() {
            return Err(FramereelError::VideoWriteError(
                "no frames to write".to_string(),
            ));
        }

        let gaps = sequence.gaps();
        let missing_frames = sequence.missing_frames();
        if missing_frames > 0 {
            log::warn!(
                "{missing_frames} frame numbers are missing from the sequence ({} gaps)",
                gaps.len(),
            );
        }

        let encoder = &self.options.encoder;
        log::info!(
            "Assembling {} frames into {:?} ({}x{} @ {} fps)",
            sequence.len(), output, encoder.width, encoder.height, encoder.fps,
        );

        let start = Instant::now();
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            sequence.len() as u64,
            self.options.batch_size,
        );

        let mut writer = VideoWriter::create(output, encoder)?;
        for (position, entry) in sequence.iter().enumerate() {
            if self.options.is_cancelled() {
                return Err(FramereelError::Cancelled);
            }

            tracker.starting(position as u64, &entry.path);
            let frame = self.process_frame(&entry.path)?;
            writer.write_frame(&frame)?;
            tracker.written(position as u64, &entry.path);
        }
        let frames_written = writer.finish()?;
        tracker.finish();

        Ok(AssemblyReport {
            output: output.to_path_buf(),
            frames_written,
            width: encoder.width,
            height: encoder.height,
            fps: encoder.fps,
            gaps,
            missing_frames,
            elapsed: start.elapsed(),
        })
    }
}
