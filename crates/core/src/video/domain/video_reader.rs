use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// One decoded frame, or the error that stopped decoding.
pub type FrameResult = Result<Frame, Box<dyn std::error::Error>>;

/// Reads frames from a video source.
///
/// Implementations handle I/O details (codec, container format, etc.)
/// while the pipeline works with the abstract `Frame` and `VideoMetadata`
/// types. The frame iterator ends at a clean end of stream; a decode
/// failure is yielded as an `Err` item.
pub trait VideoReader: Send {
    /// Opens a video file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order, indexed from 0.
    fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_>;

    /// Releases any resources held by the reader. Safe to call twice.
    fn close(&mut self);
}
