pub mod onnx_arcface_encoder;
pub mod skip_frame_labeler;
