pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

/// Run detection and matching on every Nth frame.
pub const DEFAULT_FRAME_SKIP: usize = 5;

/// Maximum embedding distance for two faces to count as the same person.
pub const DEFAULT_TOLERANCE: f64 = 0.6;

/// Sampled frames are shrunk by this factor before detection; boxes are
/// multiplied by it again before drawing.
pub const DETECTION_DOWNSCALE: u32 = 2;

/// The output is always encoded at this rate, whatever the source rate.
pub const OUTPUT_FPS: f64 = 30.0;
pub const OUTPUT_CODEC_TAG: &[u8; 4] = b"mp4v";
pub const DEFAULT_OUTPUT: &str = "output.mp4";

/// Matched case-sensitively against the end of the file name.
pub const REFERENCE_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png"];

pub const UNKNOWN_NAME: &str = "Unknown";
