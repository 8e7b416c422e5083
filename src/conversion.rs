//! Internal pixel-buffer helpers.

use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as VideoFrame;
use image::RgbImage;

/// Copy a tightly-packed RGB image into a new RGB24 FFmpeg frame.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3), so
/// rows are copied one at a time unless the strides happen to match.
pub(crate) fn rgb_image_to_frame(image: &RgbImage) -> VideoFrame {
    let (width, height) = image.dimensions();
    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = frame.stride(0);
    let row_len = (width as usize) * 3;
    let source = image.as_raw();
    let destination = frame.data_mut(0);

    if stride == row_len {
        destination[..source.len()].copy_from_slice(source);
    } else {
        for (row, pixels) in source.chunks_exact(row_len).enumerate() {
            let start = row * stride;
            destination[start..start + row_len].copy_from_slice(pixels);
        }
    }

    frame
}
