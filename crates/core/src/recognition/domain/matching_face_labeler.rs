use crate::detection::domain::face_detector::FaceDetector;
use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::recognition::domain::face_labeler::{FaceLabeler, LabeledFace};
use crate::recognition::domain::face_matcher::FaceMatcher;
use crate::shared::frame::Frame;

/// Detects, encodes and names every face in a frame.
///
/// Detection runs on a copy shrunk by `downscale` to trade accuracy for
/// speed. Boxes are reported in that shrunken space; `box_scale` tells the
/// caller how to map them back.
pub struct MatchingFaceLabeler {
    detector: Box<dyn FaceDetector>,
    encoder: Box<dyn FaceEncoder>,
    matcher: FaceMatcher,
    downscale: u32,
}

impl MatchingFaceLabeler {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        encoder: Box<dyn FaceEncoder>,
        matcher: FaceMatcher,
        downscale: u32,
    ) -> Self {
        Self {
            detector,
            encoder,
            matcher,
            downscale: downscale.max(1),
        }
    }
}

impl FaceLabeler for MatchingFaceLabeler {
    fn label(&mut self, frame: &Frame) -> Result<Vec<LabeledFace>, Box<dyn std::error::Error>> {
        let small = frame.downscaled(self.downscale)?;
        let boxes = self.detector.detect(&small)?;
        if boxes.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.encoder.encode(&small, &boxes)?;
        if encodings.len() != boxes.len() {
            return Err(format!(
                "Encoder returned {} encodings for {} faces",
                encodings.len(),
                boxes.len()
            )
            .into());
        }

        Ok(boxes
            .into_iter()
            .zip(encodings.iter())
            .map(|(face_box, encoding)| {
                LabeledFace::new(face_box, self.matcher.label_for(encoding))
            })
            .collect())
    }

    fn box_scale(&self) -> u32 {
        self.downscale
    }
}
