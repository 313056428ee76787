//! Text extraction layer
//!
//! Wraps a text-recognition engine behind the `TextRecognizer` trait and
//! pairs it with pixel preprocessing. The shipping backend is Tesseract
//! (behind the `tesseract` cargo feature); tests substitute fakes through
//! the same trait.

pub mod preprocess;
#[cfg(feature = "tesseract")]
pub mod tesseract;

use std::time::Instant;

use tracing::debug;

use crate::config::PreprocessSettings;
use crate::errors::RecognitionError;

/// Bounding region in normalized image coordinates
///
/// All values are in [0, 1] relative to the source dimensions, origin at
/// the top-left. Normalized regions survive pixel-level rescaling unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Region width
    pub width: f32,
    /// Region height
    pub height: f32,
}

/// One detected text region from a single extraction pass
///
/// Owned exclusively by the pass that produced it; nothing here is
/// persisted or carried across frames.
#[derive(Debug, Clone)]
pub struct RawTextObservation {
    /// Top-ranked reading for this region
    pub text: String,
    /// Lower-ranked readings, best first; may be empty
    pub alternatives: Vec<String>,
    /// Recognition confidence in [0, 1]
    pub confidence: f32,
    /// Where the text sits in the source image
    pub region: BoundingRegion,
}

/// Engine configuration for plate-oriented recognition
///
/// Accuracy is favored over speed and natural-language correction stays
/// off regardless of these options; plate text is not prose.
#[derive(Debug, Clone)]
pub struct RecognizerOptions {
    /// OCR language model
    pub language: String,
    /// Characters the engine may emit; empty disables the restriction
    pub char_whitelist: String,
    /// Tesseract page segmentation mode (11 = sparse text)
    pub page_seg_mode: u32,
    /// Observations below this confidence are dropped (0.0 keeps all)
    pub min_confidence: f32,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            char_whitelist: "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-".to_string(),
            page_seg_mode: 11,
            min_confidence: 0.0,
        }
    }
}

/// A text-recognition engine
pub trait TextRecognizer: Send {
    /// Run one extraction pass over an RGBA buffer.
    fn extract(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawTextObservation>, RecognitionError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// Build the compiled-in recognition backend.
#[cfg(feature = "tesseract")]
pub fn create_recognizer(
    options: &RecognizerOptions,
) -> Result<Box<dyn TextRecognizer>, RecognitionError> {
    Ok(Box::new(tesseract::TesseractRecognizer::new(options)?))
}

/// Build the compiled-in recognition backend.
#[cfg(not(feature = "tesseract"))]
pub fn create_recognizer(
    _options: &RecognizerOptions,
) -> Result<Box<dyn TextRecognizer>, RecognitionError> {
    Err(RecognitionError::ExtractionFailure(
        "no OCR backend compiled in (build with the `tesseract` feature)".to_string(),
    ))
}

/// One extraction pass: preprocessing followed by the OCR backend
pub struct Extractor {
    recognizer: Box<dyn TextRecognizer>,
    preprocessing: PreprocessSettings,
}

impl Extractor {
    /// Pair a recognizer with preprocessing settings.
    pub fn new(recognizer: Box<dyn TextRecognizer>, preprocessing: PreprocessSettings) -> Self {
        Self {
            recognizer,
            preprocessing,
        }
    }

    /// Extract raw text observations from one RGBA buffer.
    ///
    /// Regions come back normalized to [0, 1], so they remain valid for the
    /// original buffer even when preprocessing rescaled the pixels.
    pub fn extract(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawTextObservation>, RecognitionError> {
        let start = Instant::now();

        let prepared = preprocess::apply(data, width, height, &self.preprocessing);
        let observations =
            self.recognizer
                .extract(&prepared.data, prepared.width, prepared.height)?;

        debug!(
            "Extraction ({}) complete in {:?}: {} observations",
            self.recognizer.name(),
            start.elapsed(),
            observations.len()
        );

        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct OneShotRecognizer {
        observations: Vec<RawTextObservation>,
        seen_dimensions: Arc<Mutex<Option<(u32, u32)>>>,
    }

    impl TextRecognizer for OneShotRecognizer {
        fn extract(
            &mut self,
            _data: &[u8],
            width: u32,
            height: u32,
        ) -> Result<Vec<RawTextObservation>, RecognitionError> {
            *self.seen_dimensions.lock() = Some((width, height));
            Ok(self.observations.clone())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn observation(text: &str) -> RawTextObservation {
        RawTextObservation {
            text: text.to_string(),
            alternatives: vec![],
            confidence: 0.9,
            region: BoundingRegion {
                x: 0.1,
                y: 0.2,
                width: 0.3,
                height: 0.1,
            },
        }
    }

    #[test]
    fn test_extractor_passes_observations_through() {
        let seen = Arc::new(Mutex::new(None));
        let recognizer = OneShotRecognizer {
            observations: vec![observation("AI0030HK")],
            seen_dimensions: seen.clone(),
        };
        let mut extractor = Extractor::new(
            Box::new(recognizer),
            PreprocessSettings {
                enabled: false,
                ..PreprocessSettings::default()
            },
        );

        let data = vec![0u8; 8 * 4 * 4];
        let observations = extractor.extract(&data, 8, 4).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].text, "AI0030HK");
        assert_eq!(*seen.lock(), Some((8, 4)));
    }

    #[test]
    fn test_preprocessing_scales_pixels_but_regions_stay_normalized() {
        let region = BoundingRegion {
            x: 0.25,
            y: 0.5,
            width: 0.5,
            height: 0.25,
        };
        let seen = Arc::new(Mutex::new(None));
        let recognizer = OneShotRecognizer {
            observations: vec![RawTextObservation {
                region,
                ..observation("XY1234ZZ")
            }],
            seen_dimensions: seen.clone(),
        };
        let settings = PreprocessSettings {
            enabled: true,
            scale: 2,
            ..PreprocessSettings::default()
        };
        let mut extractor = Extractor::new(Box::new(recognizer), settings);

        let data = vec![128u8; 4 * 4 * 4];
        let observations = extractor.extract(&data, 4, 4).unwrap();

        // The backend saw scaled pixels; the region is still valid as-is.
        assert_eq!(*seen.lock(), Some((8, 8)));
        assert_eq!(observations[0].region, region);
    }

    #[cfg(not(feature = "tesseract"))]
    #[test]
    fn test_create_recognizer_without_backend_reports_extraction_failure() {
        let err = create_recognizer(&RecognizerOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, RecognitionError::ExtractionFailure(_)));
    }
}
