use crate::recognition::domain::face_labeler::{FaceLabeler, LabeledFace};
use crate::shared::frame::Frame;

/// Decorator that labels every Nth frame and carries the result forward.
///
/// Frames `0, N, 2N, ...` (counted in call order) go to the inner labeler;
/// every other frame gets the last computed annotation set verbatim, so
/// labels stay put for up to `N - 1` frames while faces move.
pub struct SkipFrameLabeler {
    inner: Box<dyn FaceLabeler>,
    skip_interval: usize,
    frame_count: usize,
    last_labels: Vec<LabeledFace>,
}

impl SkipFrameLabeler {
    pub fn new(inner: Box<dyn FaceLabeler>, skip_interval: usize) -> Result<Self, &'static str> {
        if skip_interval < 1 {
            return Err("skip_interval must be >= 1");
        }
        Ok(Self {
            inner,
            skip_interval,
            frame_count: 0,
            last_labels: Vec::new(),
        })
    }

    /// Whether the next call to `label` will run the inner labeler.
    pub fn samples_next(&self) -> bool {
        self.frame_count % self.skip_interval == 0
    }
}

impl FaceLabeler for SkipFrameLabeler {
    fn label(&mut self, frame: &Frame) -> Result<Vec<LabeledFace>, Box<dyn std::error::Error>> {
        if self.samples_next() {
            self.last_labels = self.inner.label(frame)?;
        }
        self.frame_count += 1;
        Ok(self.last_labels.clone())
    }

    fn box_scale(&self) -> u32 {
        self.inner.box_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::face_box::FaceBox;

    /// Returns a single face tagged with the index of the frame it was
    /// computed on.
    struct CountingLabeler;

    impl FaceLabeler for CountingLabeler {
        fn label(&mut self, frame: &Frame) -> Result<Vec<LabeledFace>, Box<dyn std::error::Error>> {
            let x = frame.index() as i32 * 10;
            Ok(vec![LabeledFace::new(
                FaceBox::new(0, x + 5, 5, x),
                format!("frame{}", frame.index()),
            )])
        }

        fn box_scale(&self) -> u32 {
            2
        }
    }

    struct FailingLabeler;

    impl FaceLabeler for FailingLabeler {
        fn label(&mut self, _frame: &Frame) -> Result<Vec<LabeledFace>, Box<dyn std::error::Error>> {
            Err("inference failed".into())
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 3, index)
    }

    fn labeler(skip: usize) -> SkipFrameLabeler {
        SkipFrameLabeler::new(Box::new(CountingLabeler), skip).unwrap()
    }

    #[test]
    fn test_interval_1_labels_every_frame() {
        let mut l = labeler(1);
        for i in 0..4 {
            let labels = l.label(&frame(i)).unwrap();
            assert_eq!(labels[0].name, format!("frame{i}"));
        }
    }

    #[test]
    fn test_interval_5_carries_frame_0_through_frame_4() {
        let mut l = labeler(5);
        let first = l.label(&frame(0)).unwrap();

        for i in 1..5 {
            assert_eq!(l.label(&frame(i)).unwrap(), first, "frame {i}");
        }

        let sixth = l.label(&frame(5)).unwrap();
        assert_eq!(sixth[0].name, "frame5");
        assert_ne!(sixth, first);
    }

    #[test]
    fn test_samples_next_follows_interval() {
        let mut l = labeler(3);
        let mut sampled = Vec::new();
        for i in 0..7 {
            sampled.push(l.samples_next());
            l.label(&frame(i)).unwrap();
        }
        assert_eq!(sampled, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_box_scale_delegates() {
        assert_eq!(labeler(5).box_scale(), 2);
    }

    #[test]
    fn test_skip_interval_0_errors() {
        let result = SkipFrameLabeler::new(Box::new(CountingLabeler), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_inner_error_propagates() {
        let mut l = SkipFrameLabeler::new(Box::new(FailingLabeler), 2).unwrap();
        assert!(l.label(&frame(0)).is_err());
    }

    #[test]
    fn test_empty_result_is_carried_forward() {
        struct EmptyLabeler;
        impl FaceLabeler for EmptyLabeler {
            fn label(
                &mut self,
                _frame: &Frame,
            ) -> Result<Vec<LabeledFace>, Box<dyn std::error::Error>> {
                Ok(Vec::new())
            }
        }

        let mut l = SkipFrameLabeler::new(Box::new(EmptyLabeler), 2).unwrap();
        assert!(l.label(&frame(0)).unwrap().is_empty());
        assert!(l.label(&frame(1)).unwrap().is_empty());
    }
}
