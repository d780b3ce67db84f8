/// ArcFace face encoder using ONNX Runtime.
///
/// Crops each face box out of the frame, resamples it to the model's
/// 112x112 input and returns the L2-normalized embedding.
use std::path::Path;

use crate::detection::infrastructure::execution_provider::build_session;
use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::recognition::domain::face_encoding::FaceEncoding;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct OnnxArcFaceEncoder {
    session: ort::session::Session,
}

impl OnnxArcFaceEncoder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: build_session(model_path)?,
        })
    }

    fn embed(
        &mut self,
        frame: &Frame,
        face_box: &FaceBox,
    ) -> Result<FaceEncoding, Box<dyn std::error::Error>> {
        let tensor = preprocess(frame, face_box);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("ArcFace model produced no outputs".into());
        }
        let embedding = outputs[0].try_extract_array::<f32>()?;
        to_encoding(embedding.iter().copied().collect())
    }
}

fn to_encoding(values: Vec<f32>) -> Result<FaceEncoding, Box<dyn std::error::Error>> {
    if values.is_empty() {
        return Err("ArcFace model produced an empty embedding".into());
    }
    Ok(FaceEncoding::new(values))
}

impl FaceEncoder for OnnxArcFaceEncoder {
    fn encode(
        &mut self,
        frame: &Frame,
        boxes: &[FaceBox],
    ) -> Result<Vec<FaceEncoding>, Box<dyn std::error::Error>> {
        boxes.iter().map(|b| self.embed(frame, b)).collect()
    }
}

/// Crop area inside the frame as `(x, y, width, height)`, never smaller
/// than one pixel.
fn crop_area(frame: &Frame, face_box: &FaceBox) -> (usize, usize, usize, usize) {
    let fw = frame.width().max(1) as i32;
    let fh = frame.height().max(1) as i32;
    let left = face_box.left.clamp(0, fw - 1);
    let top = face_box.top.clamp(0, fh - 1);
    let right = face_box.right.clamp(left + 1, fw);
    let bottom = face_box.bottom.clamp(top + 1, fh);
    (
        left as usize,
        top as usize,
        (right - left) as usize,
        (bottom - top) as usize,
    )
}

/// Resample the face crop to 112x112, normalize, NCHW layout.
fn preprocess(frame: &Frame, face_box: &FaceBox) -> ndarray::Array4<f32> {
    let (crop_x, crop_y, crop_w, crop_h) = crop_area(frame, face_box);
    let src = frame.as_ndarray();

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));

    for y in 0..INPUT_SIZE {
        let src_y = crop_y
            + (((y as f64 + 0.5) * crop_h as f64 / INPUT_SIZE as f64) as usize).min(crop_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x = crop_x
                + (((x as f64 + 0.5) * crop_w as f64 / INPUT_SIZE as f64) as usize)
                    .min(crop_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(vec![value; (width * height * 3) as usize], width, height, 3, 0)
    }

    #[test]
    fn test_preprocess_shape() {
        let tensor = preprocess(&uniform(50, 50, 128), &FaceBox::new(0, 50, 50, 0));
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
    }

    #[test]
    fn test_preprocess_normalization_bounds() {
        let white = preprocess(&uniform(10, 10, 255), &FaceBox::new(0, 10, 10, 0));
        let black = preprocess(&uniform(10, 10, 0), &FaceBox::new(0, 10, 10, 0));
        assert!((white[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
        assert!((black[[0, 0, 0, 0]] + 1.0).abs() < 0.01);
    }

    #[test]
    fn test_preprocess_samples_only_inside_box() {
        // Left half black, right half white; box covers the right half only.
        let (w, h) = (20u32, 10u32);
        let mut data = vec![0u8; (w * h * 3) as usize];
        for row in 0..h as usize {
            for col in 10..w as usize {
                let offset = (row * w as usize + col) * 3;
                data[offset..offset + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        let frame = Frame::new(data, w, h, 3, 0);

        let tensor = preprocess(&frame, &FaceBox::new(0, 20, 10, 10));

        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 0.01));
    }

    #[test]
    fn test_empty_embedding_is_error() {
        assert!(to_encoding(Vec::new()).is_err());
    }

    #[test]
    fn test_embedding_is_normalized() {
        let encoding = to_encoding(vec![3.0, 4.0]).unwrap();
        assert_relative_eq!(encoding.as_slice()[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(encoding.as_slice()[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_crop_area_clamps_to_frame() {
        let frame = uniform(100, 50, 0);
        assert_eq!(crop_area(&frame, &FaceBox::new(-10, 120, 60, -5)), (0, 0, 100, 50));
    }

    #[test]
    fn test_crop_area_degenerate_box_is_one_pixel() {
        let frame = uniform(100, 50, 0);
        assert_eq!(crop_area(&frame, &FaceBox::new(60, 150, 60, 150)), (99, 49, 1, 1));
    }
}
