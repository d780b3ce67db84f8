use std::path::Path;

use crate::shared::constants::{OUTPUT_CODEC_TAG, OUTPUT_FPS};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::pixels::to_rgb_video_frame;

/// Encodes video frames via ffmpeg-next into an MPEG-4 Part 2 stream
/// tagged `mp4v`.
pub struct FfmpegWriter {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    fps: i32,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            fps: OUTPUT_FPS as i32,
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    fn time_base(&self) -> ffmpeg_next::Rational {
        ffmpeg_next::Rational(1, self.fps)
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounds the requested rate, falling back to [`OUTPUT_FPS`] when the
/// metadata carries none.
fn encoder_fps(fps: f64) -> i32 {
    let rounded = fps.round() as i32;
    if rounded <= 0 {
        OUTPUT_FPS as i32
    } else {
        rounded
    }
}

fn drain_packets(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_index: usize,
    encoder_time_base: ffmpeg_next::Rational,
) -> Result<(), Box<dyn std::error::Error>> {
    let ost_time_base = octx
        .stream(stream_index)
        .ok_or("FfmpegWriter: output stream missing")?
        .time_base();

    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(stream_index);
        encoded.rescale_ts(encoder_time_base, ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        self.fps = encoder_fps(metadata.fps);

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;
        self.video_stream_index = ost.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(self.time_base());
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(self.fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        unsafe {
            (*ost.parameters().as_mut_ptr()).codec_tag = u32::from_le_bytes(*OUTPUT_CODEC_TAG);
        }

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Writing {} at {}x{} @ {} fps",
            path.display(),
            metadata.width,
            metadata.height,
            self.fps
        );

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let time_base = self.time_base();
        let encoder = self.encoder.as_mut().ok_or("FfmpegWriter: not opened")?;
        let scaler = self.scaler.as_mut().ok_or("FfmpegWriter: not opened")?;
        let octx = self.octx.as_mut().ok_or("FfmpegWriter: not opened")?;

        let rgb_frame = to_rgb_video_frame(frame);

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        drain_packets(encoder, octx, self.video_stream_index, time_base)?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let time_base = self.time_base();
        self.scaler = None;
        let (Some(mut encoder), Some(mut octx)) = (self.encoder.take(), self.octx.take()) else {
            return Ok(());
        };

        encoder.send_eof()?;
        drain_packets(&mut encoder, &mut octx, self.video_stream_index, time_base)?;
        octx.write_trailer()?;

        log::debug!("Finalized output after {} frames", self.frame_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_video::{metadata, solid_frame};
    use rstest::rstest;

    fn open_stream(path: &Path) -> (ffmpeg_next::format::context::Input, usize) {
        ffmpeg_next::init().unwrap();
        let ictx = ffmpeg_next::format::input(path).unwrap();
        let index = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap()
            .index();
        (ictx, index)
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let meta = metadata(160, 120, 30.0);

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &meta).unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 160, 120, 128)).unwrap();
        }
        writer.close().unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_written_video_has_correct_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let meta = metadata(160, 120, 30.0);

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &meta).unwrap();
        writer.write(&solid_frame(0, 160, 120, 128)).unwrap();
        writer.close().unwrap();

        let (ictx, index) = open_stream(&path);
        let stream = ictx.stream(index).unwrap();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).unwrap();
        let decoder = codec_ctx.decoder().video().unwrap();
        assert_eq!(decoder.width(), 160);
        assert_eq!(decoder.height(), 120);
    }

    #[test]
    fn test_written_stream_is_tagged_mp4v() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(64, 48, 30.0)).unwrap();
        writer.write(&solid_frame(0, 64, 48, 90)).unwrap();
        writer.close().unwrap();

        let (ictx, index) = open_stream(&path);
        let stream = ictx.stream(index).unwrap();
        assert_eq!(stream.parameters().id(), ffmpeg_next::codec::Id::MPEG4);
        let tag = unsafe { (*stream.parameters().as_ptr()).codec_tag };
        assert_eq!(tag.to_le_bytes(), *OUTPUT_CODEC_TAG);
    }

    #[test]
    fn test_written_stream_uses_requested_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(64, 48, 30.0)).unwrap();
        for i in 0..4 {
            writer.write(&solid_frame(i, 64, 48, 90)).unwrap();
        }
        writer.close().unwrap();

        let (ictx, index) = open_stream(&path);
        let rate = ictx.stream(index).unwrap().rate();
        let fps = rate.numerator() as f64 / rate.denominator() as f64;
        assert!((fps - 30.0).abs() < 0.5, "fps was {fps}");
    }

    #[rstest]
    #[case(30.0, 30)]
    #[case(29.97, 30)]
    #[case(0.0, 30)]
    #[case(-1.0, 30)]
    #[case(24.0, 24)]
    fn test_encoder_fps(#[case] fps: f64, #[case] expected: i32) {
        assert_eq!(encoder_fps(fps), expected);
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let mut writer = FfmpegWriter::new();
        let result = writer.write(&solid_frame(0, 160, 120, 128));
        assert!(result.is_err());
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut writer = FfmpegWriter::new();
        assert!(writer.close().is_ok());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let meta = metadata(160, 120, 30.0);

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &meta).unwrap();
        writer.write(&solid_frame(0, 160, 120, 128)).unwrap();
        writer.close().unwrap();
        assert!(writer.close().is_ok());
    }

    #[test]
    fn test_roundtrip_preserves_frames() {
        use crate::video::domain::video_reader::VideoReader;
        use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.mp4");
        let meta = metadata(160, 120, 30.0);

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &meta).unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 160, 120, 128)).unwrap();
        }
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        let read_meta = reader.open(&path).unwrap();
        assert_eq!(read_meta.width, 160);
        assert_eq!(read_meta.height, 120);

        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 3);

        // Codec is lossy, but the overall brightness should be close
        let first = &frames[0];
        let avg: f64 =
            first.data().iter().map(|&b| b as f64).sum::<f64>() / first.data().len() as f64;
        assert!(
            (avg - 128.0).abs() < 40.0,
            "Average pixel value {avg} should be close to 128"
        );
    }
}
