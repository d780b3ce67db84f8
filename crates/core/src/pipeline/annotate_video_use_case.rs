use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::labeling::domain::frame_annotator::FrameAnnotator;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::recognition::domain::face_labeler::{FaceLabeler, LabeledFace};
use crate::recognition::infrastructure::skip_frame_labeler::SkipFrameLabeler;
use crate::shared::constants::OUTPUT_FPS;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("frame skip must be at least 1, got {0}")]
    InvalidFrameSkip(usize),

    #[error("cannot open video {}: {source}", path.display())]
    UnreadableVideo {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    #[error("failed to read frame {index}: {source}")]
    FrameRead {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    #[error("{0}")]
    Pipeline(Box<dyn std::error::Error>),
}

/// Video labeling pipeline: read → label → annotate → write.
///
/// Every frame of the input is written to the output. Only every
/// `frame_skip`-th frame is labeled; the frames in between are drawn with
/// the labels of the last sampled frame. The output is always encoded at
/// [`OUTPUT_FPS`], whatever the source rate.
pub struct AnnotateVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    labeler: Box<dyn FaceLabeler>,
    annotator: Box<dyn FrameAnnotator>,
    logger: Box<dyn PipelineLogger>,
}

impl AnnotateVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        labeler: Box<dyn FaceLabeler>,
        annotator: Box<dyn FrameAnnotator>,
        logger: Box<dyn PipelineLogger>,
        frame_skip: usize,
    ) -> Result<Self, AnnotateError> {
        let labeler = SkipFrameLabeler::new(labeler, frame_skip)
            .map_err(|_| AnnotateError::InvalidFrameSkip(frame_skip))?;
        Ok(Self {
            reader,
            writer,
            labeler: Box::new(labeler),
            annotator,
            logger,
        })
    }

    /// Annotates `input` into `output` and returns the number of frames
    /// written.
    ///
    /// Nothing is created at `output` when `input` cannot be opened. On a
    /// mid-stream read failure the frames written so far are finalized
    /// before the error is returned.
    pub fn execute(&mut self, input: &Path, output: &Path) -> Result<usize, AnnotateError> {
        let metadata = self
            .reader
            .open(input)
            .map_err(|source| AnnotateError::UnreadableVideo {
                path: input.to_path_buf(),
                source,
            })?;

        self.logger.info(&format!(
            "Annotating {} ({}x{}, {:.2} fps) into {}",
            input.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            output.display()
        ));

        let result = match self.writer.open(output, &metadata.with_fps(OUTPUT_FPS)) {
            Ok(()) => {
                let processed = self.process_frames(metadata.total_frames);
                let closed = self.writer.close().map_err(AnnotateError::Pipeline);
                processed.and_then(|written| closed.map(|()| written))
            }
            Err(e) => Err(AnnotateError::Pipeline(e)),
        };
        self.reader.close();

        if result.is_ok() {
            self.logger.summary();
        }
        result
    }

    fn process_frames(&mut self, total: usize) -> Result<usize, AnnotateError> {
        let scale = self.labeler.box_scale() as i32;
        let mut written = 0;

        for (index, frame) in self.reader.frames().enumerate() {
            let mut frame = frame.map_err(|source| AnnotateError::FrameRead { index, source })?;

            let t0 = Instant::now();
            let faces: Vec<LabeledFace> = self
                .labeler
                .label(&frame)
                .map_err(AnnotateError::Pipeline)?
                .iter()
                .map(|face| face.scaled(scale))
                .collect();
            self.logger.timing("label", elapsed_ms(t0));
            self.logger.metric("faces", faces.len() as f64);

            let t0 = Instant::now();
            self.annotator
                .annotate(&mut frame, &faces)
                .map_err(AnnotateError::Pipeline)?;
            self.logger.timing("annotate", elapsed_ms(t0));

            let t0 = Instant::now();
            self.writer.write(&frame).map_err(AnnotateError::Pipeline)?;
            self.logger.timing("write", elapsed_ms(t0));

            written += 1;
            self.logger.progress(written, total);
        }

        Ok(written)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
