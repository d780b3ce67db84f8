use std::error::Error;
use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_loader::ImageLoader;
use crate::video::infrastructure::rgb_decoder::RgbDecoder;

/// Loads reference photos through ffmpeg's image demuxers and codecs, so
/// they go through the same RGB conversion as the input video.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegImageLoader;

impl FfmpegImageLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ImageLoader for FfmpegImageLoader {
    fn load(&mut self, path: &Path) -> Result<Frame, Box<dyn Error>> {
        ffmpeg_next::init()?;
        let mut ictx = ffmpeg_next::format::input(path)?;

        let (image_index, mut decoder) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or("No image data found")?;
            (stream.index(), RgbDecoder::for_stream(&stream)?)
        };

        for (stream, packet) in ictx.packets() {
            if stream.index() != image_index {
                continue;
            }
            decoder.send(&packet)?;
            if let Some(frame) = decoder.receive(0)? {
                return Ok(frame);
            }
        }

        // Some codecs hold the picture until the decoder is flushed
        decoder.finish()?;
        decoder
            .receive(0)?
            .ok_or_else(|| format!("No decodable image in {}", path.display()).into())
    }
}
