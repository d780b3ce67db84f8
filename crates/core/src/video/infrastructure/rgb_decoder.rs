//! Stream decoding to packed RGB24 [`Frame`]s, shared by the video reader
//! and the reference image loader.

use std::error::Error;

use crate::shared::frame::Frame;
use crate::video::infrastructure::pixels::extract_rgb_pixels;

/// True when a decoder call failed only because no frame is available yet.
///
/// EAGAIN asks for more input and EOF means the decoder is drained. Any
/// other error is a real decode failure and must reach the caller.
pub fn is_pending(err: &ffmpeg_next::Error) -> bool {
    match err {
        ffmpeg_next::Error::Eof => true,
        ffmpeg_next::Error::Other { errno } => *errno == ffmpeg_next::util::error::EAGAIN,
        _ => false,
    }
}

/// A video decoder paired with an RGB24 scaler at the stream's size.
pub struct RgbDecoder {
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
}

impl RgbDecoder {
    pub fn for_stream(stream: &ffmpeg_next::Stream<'_>) -> Result<Self, Box<dyn Error>> {
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let (width, height) = (decoder.width(), decoder.height());

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            decoder,
            scaler,
            width,
            height,
        })
    }

    pub fn send(&mut self, packet: &ffmpeg_next::Packet) -> Result<(), ffmpeg_next::Error> {
        self.decoder.send_packet(packet)
    }

    /// Signals end of input so buffered frames can be drained.
    pub fn finish(&mut self) -> Result<(), ffmpeg_next::Error> {
        match self.decoder.send_eof() {
            Err(e) if !is_pending(&e) => Err(e),
            _ => Ok(()),
        }
    }

    /// Takes the next decoded frame and tags it with `index`.
    ///
    /// `Ok(None)` means the decoder wants another packet, or is drained
    /// after [`finish`](Self::finish).
    pub fn receive(&mut self, index: usize) -> Result<Option<Frame>, Box<dyn Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        match self.decoder.receive_frame(&mut decoded) {
            Ok(()) => {}
            Err(e) if is_pending(&e) => return Ok(None),
            Err(e) => return Err(Box::new(e)),
        }

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb)?;
        let pixels = extract_rgb_pixels(&rgb, self.width, self.height);
        Ok(Some(Frame::new(pixels, self.width, self.height, 3, index)))
    }
}
