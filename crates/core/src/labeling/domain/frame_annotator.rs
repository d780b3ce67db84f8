use crate::recognition::domain::face_labeler::LabeledFace;
use crate::shared::frame::Frame;

/// Domain interface for drawing face labels onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) and leave
/// pixels outside the drawn shapes untouched. Boxes are in frame space.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        faces: &[LabeledFace],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
