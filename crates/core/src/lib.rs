pub mod detection;
pub mod labeling;
pub mod pipeline;
pub mod recognition;
pub mod shared;
pub mod video;
