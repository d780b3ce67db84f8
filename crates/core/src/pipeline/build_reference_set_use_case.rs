use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::recognition::domain::name_mapping::NameMapping;
use crate::recognition::domain::reference_set::ReferenceSet;
use crate::shared::constants::REFERENCE_IMAGE_EXTENSIONS;
use crate::video::domain::image_loader::ImageLoader;

#[derive(Error, Debug)]
pub enum ReferenceSetError {
    #[error("face model failed on {}: {source}", file.display())]
    Detection {
        file: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}

/// Scans a directory of labeled photos and produces the reference set.
///
/// Each `.jpg`/`.png` file contributes at most one entry: the encoding of
/// the first face the detector reports, named through the [`NameMapping`]
/// by the file stem. Unreadable images and images without a face are
/// logged and skipped.
pub struct BuildReferenceSetUseCase {
    loader: Box<dyn ImageLoader>,
    names: NameMapping,
}

impl BuildReferenceSetUseCase {
    pub fn new(loader: Box<dyn ImageLoader>, names: NameMapping) -> Self {
        Self { loader, names }
    }

    pub fn execute(
        &mut self,
        directory: &Path,
        detector: &mut dyn FaceDetector,
        encoder: &mut dyn FaceEncoder,
    ) -> Result<ReferenceSet, ReferenceSetError> {
        let mut references = ReferenceSet::new();

        if !directory.is_dir() {
            log::warn!("Reference directory {} does not exist", directory.display());
            return Ok(references);
        }
        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot list reference directory {}: {e}", directory.display());
                return Ok(references);
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            if !is_reference_image(&path) {
                continue;
            }

            let frame = match self.loader.load(&path) {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Could not read {}: {e}", path.display());
                    continue;
                }
            };

            let detection_err = |source: Box<dyn std::error::Error>| {
                ReferenceSetError::Detection {
                    file: path.clone(),
                    source,
                }
            };
            let boxes = detector.detect(&frame).map_err(detection_err)?;
            let Some(first) = boxes.first() else {
                log::warn!("No faces found in {}", file_name(&path));
                continue;
            };

            let encoding = encoder
                .encode(&frame, std::slice::from_ref(first))
                .map_err(detection_err)?
                .into_iter()
                .next()
                .ok_or_else(|| detection_err("encoder returned no encoding".into()))?;

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = self.names.display_name(&stem);
            log::info!("Loaded reference {} as {name}", file_name(&path));
            references.push(encoding, name);
        }

        log::info!("Reference set holds {} faces", references.len());
        Ok(references)
    }
}

/// Case-sensitive suffix match on the file name.
fn is_reference_image(path: &Path) -> bool {
    let name = file_name(path);
    REFERENCE_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(ext))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::face_encoding::FaceEncoding;
    use crate::shared::face_box::FaceBox;
    use crate::shared::frame::Frame;
    use rstest::rstest;

    /// Loads "images" whose file contents are a single brightness byte.
    /// Empty files fail to decode.
    struct ByteImageLoader;

    impl ImageLoader for ByteImageLoader {
        fn load(&mut self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            let bytes = std::fs::read(path)?;
            let value = *bytes.first().ok_or("empty image")?;
            Ok(Frame::new(vec![value; 4 * 4 * 3], 4, 4, 3, 0))
        }
    }

    /// Finds no face on frames with brightness 0, two faces otherwise.
    struct BrightnessDetector;

    impl FaceDetector for BrightnessDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            if frame.data()[0] == 0 {
                return Ok(Vec::new());
            }
            Ok(vec![FaceBox::new(0, 2, 2, 0), FaceBox::new(1, 4, 4, 1)])
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            Err("session crashed".into())
        }
    }

    /// Encodes each box as (brightness, box.top) and records the boxes.
    #[derive(Default)]
    struct RecordingEncoder {
        seen: Vec<Vec<FaceBox>>,
    }

    impl FaceEncoder for RecordingEncoder {
        fn encode(
            &mut self,
            frame: &Frame,
            boxes: &[FaceBox],
        ) -> Result<Vec<FaceEncoding>, Box<dyn std::error::Error>> {
            self.seen.push(boxes.to_vec());
            Ok(boxes
                .iter()
                .map(|b| FaceEncoding::new(vec![frame.data()[0] as f32, b.top as f32]))
                .collect())
        }
    }

    fn builder(names: NameMapping) -> BuildReferenceSetUseCase {
        BuildReferenceSetUseCase::new(Box::new(ByteImageLoader), names)
    }

    fn write_image(dir: &Path, name: &str, value: &[u8]) {
        std::fs::write(dir.join(name), value).unwrap();
    }

    fn build(dir: &Path, names: NameMapping) -> ReferenceSet {
        builder(names)
            .execute(dir, &mut BrightnessDetector, &mut RecordingEncoder::default())
            .unwrap()
    }

    #[test]
    fn test_missing_directory_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let references = build(&dir.path().join("absent"), NameMapping::new());
        assert!(references.is_empty());
    }

    #[test]
    fn test_empty_directory_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build(dir.path(), NameMapping::new()).is_empty());
    }

    #[test]
    fn test_mapped_and_unmapped_names() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "digital photo.jpg", &[10]);
        write_image(dir.path(), "stranger.png", &[20]);
        let names: NameMapping = [("digital photo", "Name1")].into_iter().collect();

        let references = build(dir.path(), names);

        assert_eq!(references.len(), 2);
        let mut names: Vec<_> = references.names().collect();
        names.sort();
        assert_eq!(names, vec!["Name1", "Unknown"]);
        assert_eq!(references.encodings().count(), references.names().count());
    }

    #[test]
    fn test_image_without_face_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "blank.jpg", &[0]);
        write_image(dir.path(), "person.jpg", &[50]);
        let names: NameMapping = [("person", "Ada"), ("blank", "Nobody")].into_iter().collect();

        let references = build(dir.path(), names);

        assert_eq!(references.names().collect::<Vec<_>>(), vec!["Ada"]);
    }

    #[test]
    fn test_unreadable_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "corrupt.jpg", &[]);
        write_image(dir.path(), "person.png", &[50]);

        let references = build(dir.path(), NameMapping::new());

        assert_eq!(references.len(), 1);
    }

    #[test]
    fn test_only_first_detected_face_is_encoded() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "group.jpg", &[50]);
        let mut encoder = RecordingEncoder::default();

        let references = builder(NameMapping::new())
            .execute(dir.path(), &mut BrightnessDetector, &mut encoder)
            .unwrap();

        assert_eq!(references.len(), 1);
        assert_eq!(encoder.seen, vec![vec![FaceBox::new(0, 2, 2, 0)]]);
    }

    #[rstest]
    #[case("photo.jpeg")]
    #[case("photo.JPG")]
    #[case("photo.PNG")]
    #[case("photo.gif")]
    #[case("notes.txt")]
    #[case("jpg")]
    fn test_other_extensions_are_ignored(#[case] name: &str) {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), name, &[50]);
        assert!(build(dir.path(), NameMapping::new()).is_empty());
    }

    #[test]
    fn test_stem_keeps_inner_dots() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "j.r.r.png", &[50]);
        let names: NameMapping = [("j.r.r", "Tolkien")].into_iter().collect();

        let references = build(dir.path(), names);

        assert_eq!(references.names().collect::<Vec<_>>(), vec!["Tolkien"]);
    }

    #[test]
    fn test_detector_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "person.jpg", &[50]);

        let result = builder(NameMapping::new()).execute(
            dir.path(),
            &mut FailingDetector,
            &mut RecordingEncoder::default(),
        );

        match result {
            Err(ReferenceSetError::Detection { file, .. }) => {
                assert!(file.ends_with("person.jpg"));
            }
            other => panic!("expected detection error, got {other:?}"),
        }
    }
}
