pub mod annotate_video_use_case;
pub mod build_reference_set_use_case;
pub mod pipeline_logger;
