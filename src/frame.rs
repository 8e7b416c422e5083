//! Per-frame decode and resize.

use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::configuration::ResizeFilter;
use crate::error::FramereelError;

/// Read and decode one frame file.
///
/// The format is guessed from the file contents, so a mislabelled JPEG still
/// loads.
///
/// # Errors
///
/// [`FramereelError::FrameDecode`] if the file is unreadable or not an image.
pub fn load_frame(path: &Path) -> Result<DynamicImage, FramereelError> {
    image::ImageReader::open(path)
        .map_err(|error| FramereelError::FrameDecode {
            path: path.to_path_buf(),
            source: error.into(),
        })?
        .with_guessed_format()
        .map_err(|error| FramereelError::FrameDecode {
            path: path.to_path_buf(),
            source: error.into(),
        })?
        .decode()
        .map_err(|source| FramereelError::FrameDecode {
            path: path.to_path_buf(),
            source,
        })
}

/// Resize a frame to exactly `width` x `height` and convert it to RGB8.
///
/// The aspect ratio is not preserved: every frame ends up with the target
/// dimensions whatever its source size. Alpha is dropped.
pub fn resize_frame(
    frame: &DynamicImage,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> RgbImage {
    if frame.width() == width && frame.height() == height {
        frame.to_rgb8()
    } else {
        frame
            .resize_exact(width, height, filter.to_filter_type())
            .to_rgb8()
    }
}
