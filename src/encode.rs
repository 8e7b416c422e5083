//! Video encoding: append RGB frames to a video file.
//!
//! [`VideoWriter`] is the streaming interface used by the assembler. It is
//! opened once before any frame is written, accepts frames one at a time, and
//! is finalized by [`VideoWriter::finish`]. A writer dropped without being
//! finished (for example because a later frame failed to decode) still
//! flushes the encoder and writes the container trailer, so the file on disk
//! stays playable up to the last written frame.
//!
//! [`VideoEncoder`] wraps the writer for the common case of an in-memory
//! slice of frames.
//!
//! # Example
//!
//! ```no_run
//! use framereel::{VideoEncoderOptions, VideoWriter};
//!
//! let options = VideoEncoderOptions::default().resolution(640, 480).fps(25);
//! let mut writer = VideoWriter::create("out.mp4", &options)?;
//! let frame = image::RgbImage::new(640, 480);
//! writer.write_frame(&frame)?;
//! let written = writer.finish()?;
//! assert_eq!(written, 1);
//! # Ok::<(), framereel::FramereelError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Dictionary, Packet, Rational};
use image::{DynamicImage, RgbImage};

use crate::configuration::{DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_WIDTH, ResizeFilter};
use crate::conversion::rgb_image_to_frame;
use crate::error::FramereelError;
use crate::frame::resize_frame;

/// Bits per pixel per frame used to derive a bitrate for codecs without a
/// constant-quality mode.
const DERIVED_BITS_PER_PIXEL: f64 = 0.1;
/// FFmpeg's own default bitrate, used as the floor for derived bitrates.
const MIN_DERIVED_BITRATE: usize = 200_000;

/// Options for the video encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoEncoderOptions {
    /// Frames per second (default: 25).
    pub fps: u32,
    /// Output width (default: 2000).
    pub width: u32,
    /// Output height (default: 2000).
    pub height: u32,
    /// Codec to use. Default is H.264.
    pub codec: VideoCodec,
    /// Constant Rate Factor for H.264/H.265 (0-51, lower is better). Default: 23.
    pub crf: Option<u32>,
    /// Bitrate in bits per second. If set, overrides CRF.
    pub bitrate: Option<usize>,
}

impl Default for VideoEncoderOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            codec: VideoCodec::H264,
            crf: Some(23),
            bitrate: None,
        }
    }
}

impl VideoEncoderOptions {
    /// Set the frame rate.
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the output resolution.
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the codec.
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the CRF quality value.
    pub fn crf(mut self, crf: u32) -> Self {
        self.crf = Some(crf);
        self
    }

    /// Set the target bitrate in bits per second.
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Check that the options describe an encodable stream.
    ///
    /// # Errors
    ///
    /// - [`FramereelError::InvalidResolution`] for a zero or odd dimension
    ///   (4:2:0 chroma needs even sizes).
    /// - [`FramereelError::InvalidFrameRate`] for a zero frame rate.
    pub fn validate(&self) -> Result<(), FramereelError> {
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(FramereelError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        if self.fps == 0 || self.fps > i32::MAX as u32 {
            return Err(FramereelError::InvalidFrameRate);
        }
        Ok(())
    }

    fn time_base(&self) -> Rational {
        Rational::new(1, self.fps as i32)
    }

    fn derived_bitrate(&self) -> usize {
        let pixels_per_second = self.width as f64 * self.height as f64 * self.fps as f64;
        ((pixels_per_second * DERIVED_BITS_PER_PIXEL) as usize).max(MIN_DERIVED_BITRATE)
    }
}

/// Supported output video codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
    /// MPEG-4 Part 2. Built into every FFmpeg, no external encoder needed.
    Mpeg4,
}

impl VideoCodec {
    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
            VideoCodec::Mpeg4 => Id::MPEG4,
        }
    }

    fn supports_crf(self) -> bool {
        matches!(self, VideoCodec::H264 | VideoCodec::H265)
    }
}

/// An open video file that frames are appended to, in call order.
pub struct VideoWriter {
    path: PathBuf,
    output: Output,
    encoder: OpenedVideoEncoder,
    scaler: ScalingContext,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    width: u32,
    height: u32,
    frames_written: u64,
    finished: bool,
}

impl VideoWriter {
    /// Create (or truncate) `path` and prepare it to receive frames.
    ///
    /// The container format is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// - [`FramereelError::InvalidResolution`] / [`FramereelError::InvalidFrameRate`]
    ///   for unusable options.
    /// - [`FramereelError::VideoEncodeError`] if the codec is unavailable or
    ///   cannot be opened.
    /// - [`FramereelError::VideoWriteError`] if the container cannot be created.
    pub fn create<P: AsRef<Path>>(
        path: P,
        options: &VideoEncoderOptions,
    ) -> Result<Self, FramereelError> {
        let path = path.as_ref();
        options.validate()?;
        ffmpeg_next::init()?;

        log::info!(
            "Opening {:?} for writing ({}x{}, codec={:?}, fps={})",
            path, options.width, options.height, options.codec, options.fps,
        );

        let codec_id = options.codec.to_codec_id();

        // Checked before the output exists so a missing codec leaves no file behind.
        if ffmpeg_next::encoder::find(codec_id).is_none() {
            return Err(FramereelError::VideoEncodeError(format!(
                "codec {codec_id:?} not available"
            )));
        }

        let output = ffmpeg_next::format::output(path)
            .map_err(|e| FramereelError::VideoWriteError(format!("cannot open output: {e}")))?;

        Self::start(path, output, options).inspect_err(|_| {
            if let Err(error) = fs::remove_file(path) {
                log::warn!("Failed to remove unusable output {path:?}: {error}");
            }
        })
    }

    fn start(
        path: &Path,
        mut output: Output,
        options: &VideoEncoderOptions,
    ) -> Result<Self, FramereelError> {
        let codec_id = options.codec.to_codec_id();
        let time_base = options.time_base();
        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            FramereelError::VideoEncodeError(format!("codec {codec_id:?} not available"))
        })?;

        // Must be read before add_stream borrows the context mutably.
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|e| FramereelError::VideoWriteError(format!("cannot add stream: {e}")))?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .map_err(|e| {
                FramereelError::VideoEncodeError(format!("cannot create codec context: {e}"))
            })?
            .encoder()
            .video()
            .map_err(|e| {
                FramereelError::VideoEncodeError(format!("cannot open video encoder: {e}"))
            })?;

        encoder.set_width(options.width);
        encoder.set_height(options.height);
        encoder.set_format(Pixel::YUV420P);
        encoder.set_time_base(time_base);
        encoder.set_frame_rate(Some(Rational::new(options.fps as i32, 1)));

        let mut encoder_options = Dictionary::new();
        match (options.bitrate, options.crf) {
            (Some(bitrate), _) => encoder.set_bit_rate(bitrate),
            (None, Some(crf)) if options.codec.supports_crf() => {
                encoder_options.set("crf", &crf.to_string());
            }
            (None, _) => encoder.set_bit_rate(options.derived_bitrate()),
        }

        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let encoder = encoder
            .open_as_with(encoder_codec, encoder_options)
            .map_err(|e| FramereelError::VideoEncodeError(format!("cannot open encoder: {e}")))?;

        stream.set_parameters(&encoder);
        stream.set_time_base(time_base);

        output
            .write_header()
            .map_err(|e| FramereelError::VideoWriteError(format!("cannot write header: {e}")))?;

        // The muxer may pick its own time base while writing the header.
        let stream_time_base = output
            .stream(stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| {
                FramereelError::VideoWriteError("output stream disappeared".to_string())
            })?;

        let scaler = ScalingContext::get(
            Pixel::RGB24,
            options.width,
            options.height,
            Pixel::YUV420P,
            options.width,
            options.height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| FramereelError::VideoWriteError(format!("cannot create scaler: {e}")))?;

        Ok(Self {
            path: path.to_path_buf(),
            output,
            encoder,
            scaler,
            stream_index,
            encoder_time_base: time_base,
            stream_time_base,
            width: options.width,
            height: options.height,
            frames_written: 0,
            finished: false,
        })
    }

    /// Append one frame. The frame must already have the writer's dimensions.
    ///
    /// # Errors
    ///
    /// - [`FramereelError::VideoWriteError`] on a size mismatch or muxing failure.
    /// - [`FramereelError::VideoEncodeError`] if the encoder rejects the frame.
    pub fn write_frame(&mut self, frame: &RgbImage) -> Result<(), FramereelError> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(FramereelError::VideoWriteError(format!(
                "frame is {}x{}, writer expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height,
            )));
        }

        let source = rgb_image_to_frame(frame);
        let mut converted = VideoFrame::empty();
        self.scaler
            .run(&source, &mut converted)
            .map_err(|e| FramereelError::VideoWriteError(format!("scaling failed: {e}")))?;
        converted.set_pts(Some(self.frames_written as i64));

        self.encoder
            .send_frame(&converted)
            .map_err(|e| FramereelError::VideoEncodeError(format!("send_frame failed: {e}")))?;
        self.drain_packets()?;

        self.frames_written += 1;
        log::debug!("Wrote frame {} to {:?}", self.frames_written, self.path);
        Ok(())
    }

    /// Number of frames accepted so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Output dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Flush the encoder, write the trailer, and close the file.
    ///
    /// Returns the number of frames written.
    pub fn finish(mut self) -> Result<u64, FramereelError> {
        self.finalize()?;
        log::info!("Finished {:?} with {} frames", self.path, self.frames_written);
        Ok(self.frames_written)
    }

    fn finalize(&mut self) -> Result<(), FramereelError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        self.encoder
            .send_eof()
            .map_err(|e| FramereelError::VideoEncodeError(format!("send_eof failed: {e}")))?;
        self.drain_packets()?;

        self.output
            .write_trailer()
            .map_err(|e| FramereelError::VideoWriteError(format!("cannot write trailer: {e}")))
    }

    fn drain_packets(&mut self) -> Result<(), FramereelError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| FramereelError::VideoWriteError(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        log::warn!(
            "Closing unfinished video {:?} after {} frames",
            self.path, self.frames_written,
        );
        if let Err(error) = self.finalize() {
            log::warn!("Failed to finalize {:?}: {error}", self.path);
        }
    }
}

/// Encodes an in-memory slice of frames into a video file.
pub struct VideoEncoder {
    config: VideoEncoderOptions,
}

impl VideoEncoder {
    /// Create a new video encoder with the given options.
    pub fn new(config: VideoEncoderOptions) -> Self {
        Self { config }
    }

    /// Write `frames` to `path`, resizing each to the configured resolution.
    ///
    /// Returns the number of frames written.
    ///
    /// # Errors
    ///
    /// [`FramereelError::VideoWriteError`] for an empty slice, plus every
    /// error of [`VideoWriter::create`] and [`VideoWriter::write_frame`].
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        frames: &[DynamicImage],
    ) -> Result<u64, FramereelError> {
        if frames.is_empty() {
            return Err(FramereelError::VideoWriteError(
                "no frames to write".to_string(),
            ));
        }

        let mut writer = VideoWriter::create(path, &self.config)?;
        for frame in frames {
            let rgb = resize_frame(
                frame,
                self.config.width,
                self.config.height,
                ResizeFilter::default(),
            );
            writer.write_frame(&rgb)?;
        }
        writer.finish()
    }
}
