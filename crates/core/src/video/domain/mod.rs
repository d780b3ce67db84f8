pub mod image_loader;
pub mod video_reader;
pub mod video_writer;
