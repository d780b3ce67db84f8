use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// A face box paired with the name it was matched to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledFace {
    pub face_box: FaceBox,
    pub name: String,
}

impl LabeledFace {
    pub fn new(face_box: FaceBox, name: impl Into<String>) -> Self {
        Self {
            face_box,
            name: name.into(),
        }
    }

    pub fn scaled(&self, factor: i32) -> Self {
        Self {
            face_box: self.face_box.scaled(factor),
            name: self.name.clone(),
        }
    }
}

/// Domain interface for "who is in this frame".
///
/// Returned boxes are in detection space, which may be smaller than the
/// frame; see [`FaceLabeler::box_scale`].
pub trait FaceLabeler: Send {
    fn label(&mut self, frame: &Frame) -> Result<Vec<LabeledFace>, Box<dyn std::error::Error>>;

    /// Integer factor mapping returned boxes back onto the full frame.
    fn box_scale(&self) -> u32 {
        1
    }
}
