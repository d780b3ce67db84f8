pub mod ffmpeg_image_loader;
pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
mod pixels;
mod rgb_decoder;
#[cfg(test)]
pub(crate) mod test_video;
