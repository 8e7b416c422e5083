//! Error types for the `framereel` crate.
//!
//! This module defines [`FramereelError`], the single error type returned by
//! every fallible operation in the crate. Variants carry the offending path or
//! value so the CLI can print a useful message without extra logging.

use std::path::PathBuf;

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framereel` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramereelError {
    /// The frame directory could not be listed.
    #[error("Failed to read frame directory {path}: {reason}")]
    DirectoryRead {
        /// Directory that was scanned.
        path: PathBuf,
        /// Underlying reason the listing failed.
        reason: String,
    },

    /// No file in the directory matched the frame pattern.
    #[error("No frames matching *.{extension} found in {directory}")]
    NoFrames {
        /// Directory that was scanned.
        directory: PathBuf,
        /// Extension the pattern was looking for.
        extension: String,
    },

    /// A matching file name does not start with an integer.
    #[error("Frame file name {path} does not start with a frame number")]
    MalformedFrameName {
        /// The offending file.
        path: PathBuf,
    },

    /// A frame name is all digits but the number does not fit in a `u64`.
    #[error("Frame number in {path} does not fit in 64 bits")]
    FrameIndexOutOfRange {
        /// The offending file.
        path: PathBuf,
    },

    /// Two files resolve to the same frame number (e.g. `1.png` and `01.png`).
    #[error("Frame number {index} is used by both {first} and {second}")]
    DuplicateFrameIndex {
        /// The shared frame number.
        index: u64,
        /// File seen first.
        first: PathBuf,
        /// File seen second.
        second: PathBuf,
    },

    /// A frame file could not be read or is not a valid image.
    #[error("Failed to decode frame {path}: {source}")]
    FrameDecode {
        /// The frame file.
        path: PathBuf,
        /// Error reported by the image decoder.
        #[source]
        source: ImageError,
    },

    /// The configured output resolution cannot be encoded.
    #[error("Invalid resolution {width}x{height}: dimensions must be non-zero and even")]
    InvalidResolution {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The configured frame rate is zero.
    #[error("Frame rate must be greater than zero")]
    InvalidFrameRate,

    /// The output file already exists and overwriting was not allowed.
    #[error("Output already exists: {0}")]
    OutputExists(PathBuf),

    /// The encoder could not be found, configured, or fed.
    #[error("Video encoding error: {0}")]
    VideoEncodeError(String),

    /// Writing the container (header, packets, trailer) failed.
    #[error("Video write error: {0}")]
    VideoWriteError(String),

    /// The produced file could not be opened for inspection.
    #[error("Failed to probe video {path}: {reason}")]
    Probe {
        /// The probed file.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The file has no video stream.
    #[error("No video stream found in {0}")]
    NoVideoStream(PathBuf),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for FramereelError {
    fn from(error: FfmpegError) -> Self {
        FramereelError::FfmpegError(error.to_string())
    }
}
