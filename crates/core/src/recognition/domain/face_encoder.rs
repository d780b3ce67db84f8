use crate::recognition::domain::face_encoding::FaceEncoding;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for face embedding extraction.
///
/// Returns exactly one encoding per box, in the same order, so callers can
/// zip boxes and encodings.
pub trait FaceEncoder: Send {
    fn encode(
        &mut self,
        frame: &Frame,
        boxes: &[FaceBox],
    ) -> Result<Vec<FaceEncoding>, Box<dyn std::error::Error>>;
}
