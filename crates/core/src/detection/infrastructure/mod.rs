pub mod execution_provider;
mod math;
pub mod onnx_yolo_detector;
