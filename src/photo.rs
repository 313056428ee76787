//! Still-image recognition
//!
//! One photo in, one candidate out. Unlike the live path, a photo wants a
//! single answer: the first observation that survives normalization and
//! the grammar check wins, and finding nothing is a user-visible error.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::debug;

use crate::errors::RecognitionError;
use crate::filter::{self, PlateCandidate};
use crate::grammar::PlateGrammar;
use crate::vision::Extractor;

/// Result of one photo recognition task
#[derive(Debug)]
pub struct PhotoOutcome {
    /// The photo the task was started for
    pub path: PathBuf,
    pub outcome: Result<PlateCandidate, RecognitionError>,
}

/// Recognize a plate on a single photo.
///
/// Returns the first validated candidate, `NoMatchFound` when the photo
/// contains no recognizable plate, or `ExtractionFailure` when the file
/// cannot be read or the OCR backend fails.
pub fn recognize_photo(
    path: &Path,
    extractor: &mut Extractor,
    grammar: &PlateGrammar,
) -> Result<PlateCandidate, RecognitionError> {
    let decoded = image::open(path).map_err(|e| {
        RecognitionError::ExtractionFailure(format!("cannot decode {}: {}", path.display(), e))
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let observations = extractor.extract(rgba.as_raw(), width, height)?;
    filter::first_match(&observations, grammar).ok_or(RecognitionError::NoMatchFound)
}

/// Recognize a photo on a background thread and deliver the outcome.
///
/// Tasks are never cancelled. When tasks for two different photos overlap,
/// both deliver, and the receiver sees them in completion order: whichever
/// task finishes last determines the final state on the receiving side.
pub fn spawn_photo_task(
    path: PathBuf,
    mut extractor: Extractor,
    grammar: PlateGrammar,
    results: Sender<PhotoOutcome>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let outcome = recognize_photo(&path, &mut extractor, &grammar);
        if results.send(PhotoOutcome { path, outcome }).is_err() {
            debug!("Photo result dropped; receiver is gone");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreprocessSettings;
    use crate::vision::{BoundingRegion, RawTextObservation, TextRecognizer};
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    struct FixedRecognizer {
        texts: Vec<String>,
    }

    impl TextRecognizer for FixedRecognizer {
        fn extract(
            &mut self,
            _data: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<RawTextObservation>, RecognitionError> {
            Ok(self
                .texts
                .iter()
                .map(|text| RawTextObservation {
                    text: text.clone(),
                    alternatives: Vec::new(),
                    confidence: 0.9,
                    region: BoundingRegion {
                        x: 0.1,
                        y: 0.1,
                        width: 0.3,
                        height: 0.1,
                    },
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn extractor_reading(texts: &[&str]) -> Extractor {
        let settings = PreprocessSettings {
            enabled: false,
            ..PreprocessSettings::default()
        };
        Extractor::new(
            Box::new(FixedRecognizer {
                texts: texts.iter().map(|t| t.to_string()).collect(),
            }),
            settings,
        )
    }

    fn plate_photo(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(8, 4, image::Rgba([255, 255, 255, 255]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_photo_with_plate_yields_first_match() {
        let dir = tempfile::tempdir().unwrap();
        let photo = plate_photo(dir.path(), "car.png");
        let grammar = PlateGrammar::new().unwrap();
        let mut extractor = extractor_reading(&["garbage", "ВС 4412 НХ", "AB1234CD"]);

        let candidate = recognize_photo(&photo, &mut extractor, &grammar).unwrap();

        assert_eq!(candidate.text, "BC4412HX");
    }

    #[test]
    fn test_photo_without_plate_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let photo = plate_photo(dir.path(), "street.png");
        let grammar = PlateGrammar::new().unwrap();
        let mut extractor = extractor_reading(&["STOP", "ONE WAY"]);

        let err = recognize_photo(&photo, &mut extractor, &grammar).unwrap_err();

        assert!(matches!(err, RecognitionError::NoMatchFound));
        assert_eq!(err.to_string(), "plate not found on image");
    }

    #[test]
    fn test_unreadable_photo_is_an_extraction_failure() {
        let grammar = PlateGrammar::new().unwrap();
        let mut extractor = extractor_reading(&[]);

        let err = recognize_photo(
            Path::new("/nonexistent/photo.png"),
            &mut extractor,
            &grammar,
        )
        .unwrap_err();

        assert!(matches!(err, RecognitionError::ExtractionFailure(_)));
    }

    #[test]
    fn test_overlapping_tasks_both_deliver() {
        let dir = tempfile::tempdir().unwrap();
        let first = plate_photo(dir.path(), "first.png");
        let second = plate_photo(dir.path(), "second.png");
        let grammar = PlateGrammar::new().unwrap();
        let (tx, rx) = unbounded();

        let a = spawn_photo_task(
            first.clone(),
            extractor_reading(&["AA1111BB"]),
            grammar.clone(),
            tx.clone(),
        );
        let b = spawn_photo_task(
            second.clone(),
            extractor_reading(&["CC2222DD"]),
            grammar,
            tx,
        );

        let mut seen = vec![
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        ];
        a.join().unwrap();
        b.join().unwrap();

        seen.sort_by(|x, y| x.path.cmp(&y.path));
        assert_eq!(seen[0].path, first);
        assert_eq!(seen[0].outcome.as_ref().unwrap().text, "AA1111BB");
        assert_eq!(seen[1].path, second);
        assert_eq!(seen[1].outcome.as_ref().unwrap().text, "CC2222DD");
    }
}
