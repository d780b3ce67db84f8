use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Frame count reported by the container, 0 when unknown.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Same geometry with the frame rate replaced.
    pub fn with_fps(&self, fps: f64) -> Self {
        Self {
            fps,
            ..self.clone()
        }
    }
}
