//! # framereel
//!
//! Assemble a directory of numbered image frames into a single video file.
//!
//! Frames are files named `<number>.png` (`0.png`, `1.png`, ..., `10.png`).
//! They are ordered by that number, resized to one fixed resolution, and
//! encoded in order with FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framereel::{AssembleOptions, FrameAssembler};
//!
//! // 2000x2000 at 25 fps into ./video.mp4, the defaults.
//! let report = FrameAssembler::new(AssembleOptions::new()).run(".")?;
//! println!("{} frames", report.frames_written);
//! # Ok::<(), framereel::FramereelError>(())
//! ```
//!
//! ### Custom output
//!
//! ```no_run
//! use framereel::{AssembleOptions, FrameAssembler, VideoCodec};
//!
//! let options = AssembleOptions::new()
//!     .resolution(1920, 1080)
//!     .fps(30)
//!     .codec(VideoCodec::H265)
//!     .output("render.mp4");
//! FrameAssembler::new(options).run("frames")?;
//! # Ok::<(), framereel::FramereelError>(())
//! ```
//!
//! ## Features
//!
//! - **Numeric ordering**: `2.png` before `10.png`, duplicates and
//!   non-numeric names rejected before anything is written
//! - **Exact output size**: every frame is resized to the target resolution
//! - **Safe finalization**: the output is closed properly even when a frame
//!   fails halfway through
//! - **Progress & cancellation**: callbacks and a `CancellationToken`
//! - **Probing**: read back resolution and exact frame count of a video
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod assembler;
pub mod configuration;
mod conversion;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod probe;
pub mod progress;
pub mod sequence;

pub use assembler::{AssemblyReport, FrameAssembler};
pub use configuration::{
    AssembleOptions, DEFAULT_EXTENSION, DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_OUTPUT,
    DEFAULT_WIDTH, MalformedNamePolicy, ResizeFilter,
};
pub use encode::{VideoCodec, VideoEncoder, VideoEncoderOptions, VideoWriter};
pub use error::FramereelError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::{load_frame, resize_frame};
pub use probe::{VideoProbe, VideoSummary};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use sequence::{FrameEntry, FrameSequence, parse_frame_index};
