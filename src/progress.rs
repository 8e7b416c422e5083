//! Progress reporting and cancellation support.
//!
//! Assembly can take a while for long sequences at high resolutions, so the
//! [`FrameAssembler`](crate::FrameAssembler) reports through a
//! [`ProgressCallback`] and checks a [`CancellationToken`] before each frame.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use std::path::Path;
//!
//! use framereel::{AssembleOptions, FrameAssembler, ProgressCallback, ProgressInfo};
//!
//! struct PrintIndex;
//!
//! impl ProgressCallback for PrintIndex {
//!     fn on_frame(&self, position: u64, _path: &Path) {
//!         println!("{position}");
//!     }
//!
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(percentage) = info.percentage {
//!             eprintln!("{percentage:.0}%");
//!         }
//!     }
//! }
//!
//! let options = AssembleOptions::new().with_progress(Arc::new(PrintIndex));
//! FrameAssembler::new(options).run(".")?;
//! # Ok::<(), framereel::FramereelError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding, resizing, and encoding frames into the output video.
    FrameAssembly,
}

/// A snapshot of assembly progress.
///
/// Delivered to [`ProgressCallback::on_progress`] every
/// [`batch_size`](crate::AssembleOptions::with_batch_size) frames and once
/// more when the run completes.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many frames have been written so far.
    pub current: u64,
    /// Total frames expected.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Zero-based position of the frame just written. `None` in the final report.
    pub current_frame: Option<u64>,
    /// Source file of the frame just written. `None` in the final report.
    pub current_path: Option<PathBuf>,
}

/// Trait for receiving progress updates during assembly.
///
/// Progress callbacks are infallible: they observe but cannot halt the run.
/// Use [`CancellationToken`] for that.
pub trait ProgressCallback: Send + Sync {
    /// Called right before the frame at `position` is read from `path`.
    ///
    /// If that frame then fails to decode, this was the last call.
    fn on_frame(&self, _position: u64, _path: &Path) {}

    /// Called after frames are written, every batch and once at the end.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state, so a token handed to the assembler can be cancelled
/// from a signal handler or another thread.
///
/// ```
/// use framereel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let shared = token.clone();
/// shared.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Emits the callbacks of one run. Inert when no callback is configured.
pub(crate) struct ProgressTracker {
    callback: Option<Arc<dyn ProgressCallback>>,
    total: u64,
    written: u64,
    batch_size: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Option<Arc<dyn ProgressCallback>>,
        total: u64,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            total,
            written: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
        }
    }

    pub(crate) fn starting(&self, position: u64, path: &Path) {
        if let Some(callback) = &self.callback {
            callback.on_frame(position, path);
        }
    }

    /// Record one written frame; report when it completes a batch.
    pub(crate) fn written(&mut self, position: u64, path: &Path) {
        self.written += 1;
        if self.written % self.batch_size == 0 {
            self.report(Some(position), Some(path));
        }
    }

    pub(crate) fn finish(&self) {
        self.report(None, None);
    }

    fn report(&self, position: Option<u64>, path: Option<&Path>) {
        let Some(callback) = &self.callback else {
            return;
        };
        let elapsed = self.start_time.elapsed();
        let remaining = self.total.saturating_sub(self.written);

        callback.on_progress(&ProgressInfo {
            operation: OperationType::FrameAssembly,
            current: self.written,
            total: Some(self.total),
            percentage: (self.total > 0)
                .then(|| self.written as f32 / self.total as f32 * 100.0),
            elapsed,
            estimated_remaining: (self.written > 0)
                .then(|| elapsed.mul_f64(remaining as f64 / self.written as f64)),
            current_frame: position,
            current_path: path.map(Path::to_path_buf),
        });
    }
}
