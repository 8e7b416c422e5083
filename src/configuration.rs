//! Assembly configuration.
//!
//! [`AssembleOptions`] is a builder that carries the target resolution, frame
//! rate, codec, frame-name pattern, and progress/cancellation hooks into
//! [`FrameAssembler`](crate::FrameAssembler).
//!
//! # Example
//!
//! ```
//! use framereel::{AssembleOptions, MalformedNamePolicy, ResizeFilter, VideoCodec};
//!
//! let options = AssembleOptions::new()
//!     .resolution(1280, 720)
//!     .fps(30)
//!     .codec(VideoCodec::Mpeg4)
//!     .resize_filter(ResizeFilter::Triangle)
//!     .malformed_names(MalformedNamePolicy::Skip);
//!
//! assert_eq!(options.encoder.width, 1280);
//! assert_eq!(options.encoder.fps, 30);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::FilterType;

use crate::encode::{VideoCodec, VideoEncoderOptions};
use crate::progress::{CancellationToken, ProgressCallback};

/// Default output width in pixels.
pub const DEFAULT_WIDTH: u32 = 2000;
/// Default output height in pixels.
pub const DEFAULT_HEIGHT: u32 = 2000;
/// Default output frame rate.
pub const DEFAULT_FPS: u32 = 25;
/// Default output file name, relative to the frame directory.
pub const DEFAULT_OUTPUT: &str = "video.mp4";
/// Default frame file extension.
pub const DEFAULT_EXTENSION: &str = "png";

/// Resampling filter used when resizing frames to the target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Linear (bilinear) filter.
    Triangle,
    /// Cubic filter.
    CatmullRom,
    /// Gaussian filter.
    Gaussian,
    /// Lanczos with window 3. This is the default.
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn to_filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// What to do with a matching file whose name does not start with a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedNamePolicy {
    /// Abort before any frame is processed. This is the default.
    #[default]
    Reject,
    /// Leave the file out of the sequence and log a warning.
    Skip,
}

/// Configuration for a [`FrameAssembler`](crate::FrameAssembler) run.
///
/// Defaults reproduce the classic behavior: `*.png` frames, 2000x2000 output
/// at 25 fps, written to `video.mp4` inside the frame directory, replacing any
/// existing file.
#[derive(Clone)]
pub struct AssembleOptions {
    /// Encoder settings (resolution, frame rate, codec, quality).
    pub encoder: VideoEncoderOptions,
    /// Output path. `None` means [`DEFAULT_OUTPUT`] inside the frame directory.
    pub output: Option<PathBuf>,
    /// Whether an existing output file may be replaced.
    pub overwrite: bool,
    /// Extension of frame files, without the dot. Matched case-insensitively.
    pub extension: String,
    /// Handling of non-numeric frame names.
    pub malformed_names: MalformedNamePolicy,
    /// Resampling filter for the resize step.
    pub resize_filter: ResizeFilter,
    pub(crate) progress: Option<Arc<dyn ProgressCallback>>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for AssembleOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AssembleOptions")
            .field("encoder", &self.encoder)
            .field("output", &self.output)
            .field("overwrite", &self.overwrite)
            .field("extension", &self.extension)
            .field("malformed_names", &self.malformed_names)
            .field("resize_filter", &self.resize_filter)
            .field("has_progress", &self.progress.is_some())
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AssembleOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            encoder: VideoEncoderOptions::default(),
            output: None,
            overwrite: true,
            extension: DEFAULT_EXTENSION.to_string(),
            malformed_names: MalformedNamePolicy::default(),
            resize_filter: ResizeFilter::default(),
            progress: None,
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the target resolution every frame is resized to.
    #[must_use]
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.encoder = self.encoder.resolution(width, height);
        self
    }

    /// Set the output frame rate.
    #[must_use]
    pub fn fps(mut self, fps: u32) -> Self {
        self.encoder = self.encoder.fps(fps);
        self
    }

    /// Set the output codec.
    #[must_use]
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.encoder = self.encoder.codec(codec);
        self
    }

    /// Set the CRF quality value (H.264 / H.265 only).
    #[must_use]
    pub fn crf(mut self, crf: u32) -> Self {
        self.encoder = self.encoder.crf(crf);
        self
    }

    /// Set the target bitrate in bits per second. Overrides CRF.
    #[must_use]
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.encoder = self.encoder.bitrate(bitrate);
        self
    }

    /// Write the video to `path` instead of the default location.
    #[must_use]
    pub fn output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Allow or forbid replacing an existing output file.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the frame file extension. A leading dot is ignored.
    #[must_use]
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self
    }

    /// Set the handling of non-numeric frame names.
    #[must_use]
    pub fn malformed_names(mut self, policy: MalformedNamePolicy) -> Self {
        self.malformed_names = policy;
        self
    }

    /// Set the resampling filter.
    #[must_use]
    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Attach a cancellation token, checked before each frame.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Fire the progress callback every `size` frames. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Resolve the output path for a run over `directory`.
    pub fn output_path(&self, directory: &Path) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => directory.join(DEFAULT_OUTPUT),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
