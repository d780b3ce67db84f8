//! Test fixtures: small encoded videos with known content.

use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

pub fn metadata(width: u32, height: u32, fps: f64) -> VideoMetadata {
    VideoMetadata {
        width,
        height,
        fps,
        total_frames: 0,
        codec: String::new(),
        source_path: None,
    }
}

pub fn solid_frame(index: usize, width: u32, height: u32, value: u8) -> Frame {
    Frame::new(vec![value; (width * height * 3) as usize], width, height, 3, index)
}

/// Writes `num_frames` gray frames whose brightness steps by 40 per frame.
pub fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32) {
    let mut writer = FfmpegWriter::new();
    writer.open(path, &metadata(width, height, 30.0)).unwrap();
    for i in 0..num_frames {
        let value = ((i * 40) % 256) as u8;
        writer.write(&solid_frame(i, width, height, value)).unwrap();
    }
    writer.close().unwrap();
}

/// Overwrites the middle third of the `mdat` payload with 0xFF, leaving the
/// container index intact so only the frames stored there fail to decode.
pub fn corrupt_frame_data(path: &Path) {
    let mut bytes = std::fs::read(path).unwrap();
    let tag = bytes.windows(4).position(|w| w == b"mdat").unwrap();
    let size = u32::from_be_bytes(bytes[tag - 4..tag].try_into().unwrap()) as usize;
    let start = tag + 4;
    let end = (tag - 4 + size).min(bytes.len());
    let third = (end - start) / 3;
    bytes[start + third..end - third].fill(0xFF);
    std::fs::write(path, bytes).unwrap();
}
