use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for face localization.
///
/// Boxes are returned in the detector's own order and in the coordinate
/// space of `frame`. Callers that need "the first face" take index 0.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;
}
