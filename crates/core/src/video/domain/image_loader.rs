use std::path::Path;

use crate::shared::frame::Frame;

/// Decodes a single still image into an RGB [`Frame`] with index 0.
pub trait ImageLoader: Send {
    fn load(&mut self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
