use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use thiserror::Error;

use face_label_core::detection::domain::face_detector::FaceDetector;
use face_label_core::detection::infrastructure::onnx_yolo_detector::{
    OnnxYoloDetector, DEFAULT_CONFIDENCE,
};
use face_label_core::labeling::infrastructure::box_label_annotator::BoxLabelAnnotator;
use face_label_core::pipeline::annotate_video_use_case::{AnnotateError, AnnotateVideoUseCase};
use face_label_core::pipeline::build_reference_set_use_case::{
    BuildReferenceSetUseCase, ReferenceSetError,
};
use face_label_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use face_label_core::recognition::domain::face_encoder::FaceEncoder;
use face_label_core::recognition::domain::face_matcher::FaceMatcher;
use face_label_core::recognition::domain::matching_face_labeler::MatchingFaceLabeler;
use face_label_core::recognition::domain::name_mapping::{NameMapping, NameMappingError};
use face_label_core::recognition::infrastructure::onnx_arcface_encoder::OnnxArcFaceEncoder;
use face_label_core::shared::constants::{
    DEFAULT_FRAME_SKIP, DEFAULT_OUTPUT, DEFAULT_TOLERANCE, DETECTION_DOWNSCALE,
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use face_label_core::shared::model_resolver::{self, ModelResolveError, ModelSource};
use face_label_core::video::infrastructure::ffmpeg_image_loader::FfmpegImageLoader;
use face_label_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use face_label_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Label known faces in a video using a directory of reference photos.
#[derive(Parser, Debug)]
#[command(name = "face-label")]
struct Cli {
    /// Input video file.
    video: PathBuf,

    /// Directory of reference photos (.jpg/.png), one person per photo.
    training_dir: PathBuf,

    /// Output video file.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Run detection and matching every Nth frame (1 = every frame).
    #[arg(long, default_value_t = DEFAULT_FRAME_SKIP)]
    frame_skip: usize,

    /// Maximum embedding distance for a match (smaller = stricter).
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// JSON file mapping photo file stems to display names.
    #[arg(long)]
    names: Option<PathBuf>,

    /// Extra stem=Name mapping; repeatable, overrides --names.
    #[arg(long = "name", value_name = "STEM=NAME")]
    name_pairs: Vec<String>,

    /// Directory checked for model files before downloading them.
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("no usable reference faces found in {}", .0.display())]
    EmptyReferenceSet(PathBuf),
    #[error(transparent)]
    Names(#[from] NameMappingError),
    #[error(transparent)]
    Model(#[from] ModelResolveError),
    #[error(transparent)]
    References(#[from] ReferenceSetError),
    #[error(transparent)]
    Annotate(#[from] AnnotateError),
    #[error("{0}")]
    Other(Box<dyn std::error::Error>),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Names(NameMappingError::InvalidPair(_)) => 2,
            CliError::Annotate(AnnotateError::InvalidFrameSkip(_)) => 2,
            CliError::EmptyReferenceSet(_) => 3,
            CliError::Annotate(AnnotateError::UnreadableVideo { .. }) => 4,
            CliError::Annotate(AnnotateError::FrameRead { .. }) => 5,
            _ => 1,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    validate(&cli)?;
    let names = build_name_mapping(cli.names.as_deref(), &cli.name_pairs)?;

    let mut detector = build_detector(&cli)?;
    let mut encoder = build_encoder(&cli)?;

    let references = BuildReferenceSetUseCase::new(Box::new(FfmpegImageLoader::new()), names)
        .execute(&cli.training_dir, detector.as_mut(), encoder.as_mut())?;
    if references.is_empty() {
        return Err(CliError::EmptyReferenceSet(cli.training_dir));
    }

    let labeler = MatchingFaceLabeler::new(
        detector,
        encoder,
        FaceMatcher::new(references, cli.tolerance),
        DETECTION_DOWNSCALE,
    );
    let mut use_case = AnnotateVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new()),
        Box::new(labeler),
        Box::new(BoxLabelAnnotator::default()),
        Box::new(StdoutPipelineLogger::default()),
        cli.frame_skip,
    )?;
    let written = use_case.execute(&cli.video, &cli.output)?;
    log::info!("Wrote {written} frames to {}", cli.output.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), CliError> {
    if cli.frame_skip < 1 {
        return Err(CliError::Usage(format!(
            "Frame skip must be at least 1, got {}",
            cli.frame_skip
        )));
    }
    if cli.tolerance.is_nan() || cli.tolerance < 0.0 {
        return Err(CliError::Usage(format!(
            "Tolerance must be non-negative, got {}",
            cli.tolerance
        )));
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(CliError::Usage(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )));
    }
    Ok(())
}

/// Loads the optional JSON mapping, then applies `--name` pairs on top.
fn build_name_mapping(file: Option<&Path>, pairs: &[String]) -> Result<NameMapping, CliError> {
    let mut names = match file {
        Some(path) => NameMapping::from_json_file(path)?,
        None => NameMapping::new(),
    };
    for pair in pairs {
        let (stem, name) = NameMapping::parse_pair(pair)?;
        names.insert(stem, name);
    }
    Ok(names)
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, CliError> {
    let model_path = resolve_model(YOLO_MODEL_NAME, YOLO_MODEL_URL, cli.models_dir.as_deref())?;
    let detector = OnnxYoloDetector::new(&model_path, cli.confidence).map_err(CliError::Other)?;
    Ok(Box::new(detector))
}

fn build_encoder(cli: &Cli) -> Result<Box<dyn FaceEncoder>, CliError> {
    let model_path = resolve_model(
        EMBEDDING_MODEL_NAME,
        EMBEDDING_MODEL_URL,
        cli.models_dir.as_deref(),
    )?;
    let encoder = OnnxArcFaceEncoder::new(&model_path).map_err(CliError::Other)?;
    Ok(Box::new(encoder))
}

fn resolve_model(name: &str, url: &str, models_dir: Option<&Path>) -> Result<PathBuf, CliError> {
    log::info!("Resolving model: {name}");
    let label = name.to_string();
    let path = model_resolver::resolve(
        ModelSource { name, url },
        models_dir,
        Some(Box::new(move |downloaded, total| {
            download_progress(&label, downloaded, total)
        })),
    )?;
    Ok(path)
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
