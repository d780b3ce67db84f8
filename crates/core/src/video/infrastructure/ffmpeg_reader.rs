use std::error::Error;
use std::path::Path;

use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{FrameResult, VideoReader};
use crate::video::infrastructure::rgb_decoder::RgbDecoder;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`].
///
/// [`Frame`]: crate::shared::frame::Frame
pub struct FfmpegReader {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    video_stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            video_stream_index: 0,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames per second from the stream's average rate, 0 when unknown.
fn stream_fps(stream: &ffmpeg_next::Stream<'_>) -> f64 {
    let rate = stream.rate();
    if rate.denominator() == 0 {
        return 0.0;
    }
    rate.numerator() as f64 / rate.denominator() as f64
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn Error>> {
        ffmpeg_next::init()?;
        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps: stream_fps(&stream),
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {}: {}x{} @ {:.2} fps, {} frames ({})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames,
            metadata.codec
        );

        self.video_stream_index = stream.index();
        self.input_ctx = Some(ictx);
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_> {
        let Some(ictx) = self.input_ctx.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };

        let decoder = match ictx.stream(self.video_stream_index) {
            Some(stream) => RgbDecoder::for_stream(&stream),
            None => Err("FfmpegReader: video stream disappeared".into()),
        };
        let decoder = match decoder {
            Ok(decoder) => decoder,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };

        Box::new(FfmpegFrameIter {
            ictx,
            decoder,
            video_stream_index: self.video_stream_index,
            frame_index: 0,
            input_done: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.input_ctx = None;
    }
}

/// Lazy iterator that decodes video frames one at a time, avoiding the need
/// to buffer the entire video in memory.
///
/// A decode failure is yielded once as an `Err` and ends the iteration, so
/// callers can tell a broken stream from a clean end of file.
struct FfmpegFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: RgbDecoder,
    video_stream_index: usize,
    frame_index: usize,
    input_done: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    /// Sends the next video packet, or end-of-input once packets run out.
    fn feed(&mut self) -> Result<(), Box<dyn Error>> {
        for (stream, packet) in self.ictx.packets() {
            if stream.index() == self.video_stream_index {
                self.decoder.send(&packet)?;
                return Ok(());
            }
        }
        self.input_done = true;
        self.decoder.finish()?;
        Ok(())
    }

    fn fail(&mut self, err: Box<dyn Error>) -> Option<FrameResult> {
        log::warn!("Decoding failed after frame {}: {err}", self.frame_index);
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = FrameResult;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.decoder.receive(self.frame_index) {
                Ok(Some(frame)) => {
                    self.frame_index += 1;
                    return Some(Ok(frame));
                }
                Ok(None) if self.input_done => self.done = true,
                Ok(None) => {
                    if let Err(e) = self.feed() {
                        return self.fail(e);
                    }
                }
                Err(e) => return self.fail(e),
            }
        }
        None
    }
}
