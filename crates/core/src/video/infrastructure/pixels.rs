//! Conversions between tightly packed [`Frame`] buffers and ffmpeg's
//! row-padded RGB24 frames.

use crate::shared::frame::Frame;

/// Copies pixel data from an ffmpeg RGB24 frame into a contiguous buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row
/// (stride > width * 3); they are stripped here.
pub fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    pixels
}

/// Builds an ffmpeg RGB24 frame from a packed RGB [`Frame`].
pub fn to_rgb_video_frame(frame: &Frame) -> ffmpeg_next::util::frame::video::Video {
    let width = frame.width();
    let height = frame.height();
    let mut rgb_frame =
        ffmpeg_next::util::frame::video::Video::new(ffmpeg_next::format::Pixel::RGB24, width, height);

    let stride = rgb_frame.stride(0);
    let row_len = width as usize * 3;
    let src = frame.data();
    let dst = rgb_frame.data_mut(0);
    for row in 0..height as usize {
        let src_start = row * row_len;
        let dst_start = row * stride;
        dst[dst_start..dst_start + row_len].copy_from_slice(&src[src_start..src_start + row_len]);
    }
    rgb_frame
}
