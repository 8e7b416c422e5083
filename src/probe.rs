//! Inspect a produced video.
//!
//! [`VideoProbe`] opens a file, reads the first video stream's parameters,
//! and counts its packets exactly by demuxing the whole file. Nothing is
//! decoded, so it stays cheap even for large outputs.
//!
//! # Example
//!
//! ```no_run
//! use framereel::VideoProbe;
//!
//! let summary = VideoProbe::probe("video.mp4")?;
//! println!(
//!     "{}x{} @ {:.2} fps, {} frames",
//!     summary.width, summary.height, summary.frames_per_second, summary.frame_count,
//! );
//! # Ok::<(), framereel::FramereelError>(())
//! ```

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::media::Type as MediaType;

use crate::error::FramereelError;

/// Summary of a video file's main video stream.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoSummary {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate reported by the container.
    pub frames_per_second: f64,
    /// Exact number of video packets (one per frame for the supported codecs).
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
    /// Container duration.
    pub duration: Duration,
}

/// Video file inspector.
pub struct VideoProbe;

impl VideoProbe {
    /// Probe `path` and summarise its first video stream.
    ///
    /// # Errors
    ///
    /// - [`FramereelError::Probe`] if the file cannot be opened as media.
    /// - [`FramereelError::NoVideoStream`] if it has no video stream.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoSummary, FramereelError> {
        let path = path.as_ref();
        ffmpeg_next::init()?;

        let mut input = ffmpeg_next::format::input(path).map_err(|error| FramereelError::Probe {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let (stream_index, width, height, frames_per_second, codec) = {
            let stream = input
                .streams()
                .best(MediaType::Video)
                .ok_or_else(|| FramereelError::NoVideoStream(path.to_path_buf()))?;
            let decoder = CodecContext::from_parameters(stream.parameters())?
                .decoder()
                .video()?;
            let rate = stream.avg_frame_rate();
            let frames_per_second = if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            };
            let codec = decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            (
                stream.index(),
                decoder.width(),
                decoder.height(),
                frames_per_second,
                codec,
            )
        };

        let duration = Duration::from_micros(input.duration().max(0) as u64);

        let frame_count = input
            .packets()
            .filter(|(stream, _)| stream.index() == stream_index)
            .count() as u64;

        log::debug!("Probed {path:?}: {width}x{height}, {frame_count} frames");

        Ok(VideoSummary {
            width,
            height,
            frames_per_second,
            frame_count,
            codec,
            duration,
        })
    }
}
