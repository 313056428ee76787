//! Tesseract OCR backend
//!
//! Word-level extraction through leptess, tuned for plate text: restricted
//! character set, dictionary correction off, sparse page segmentation.
//! Needs the native tesseract and leptonica libraries plus language data.

use std::io::Cursor;

use leptess::{LepTess, Variable};
use tracing::debug;

use super::{BoundingRegion, RawTextObservation, RecognizerOptions, TextRecognizer};
use crate::errors::RecognitionError;

/// Tesseract-backed text recognizer
pub struct TesseractRecognizer {
    options: RecognizerOptions,
}

impl TesseractRecognizer {
    /// Verify tesseract can initialize with the configured language.
    pub fn new(options: &RecognizerOptions) -> Result<Self, RecognitionError> {
        LepTess::new(None, &options.language).map_err(|e| {
            RecognitionError::ExtractionFailure(format!(
                "tesseract init failed for language '{}': {} (is the language data installed?)",
                options.language, e
            ))
        })?;

        Ok(Self {
            options: options.clone(),
        })
    }

    /// Build a fresh engine instance configured for plate text.
    fn configured_engine(&self) -> Result<LepTess, RecognitionError> {
        let mut engine = LepTess::new(None, &self.options.language)
            .map_err(|e| RecognitionError::ExtractionFailure(format!("tesseract init failed: {}", e)))?;

        engine
            .set_variable(
                Variable::TesseditPagesegMode,
                &self.options.page_seg_mode.to_string(),
            )
            .map_err(|e| {
                RecognitionError::ExtractionFailure(format!("cannot set page segmentation: {}", e))
            })?;

        if !self.options.char_whitelist.is_empty() {
            engine
                .set_variable(Variable::TesseditCharWhitelist, &self.options.char_whitelist)
                .map_err(|e| {
                    RecognitionError::ExtractionFailure(format!("cannot set whitelist: {}", e))
                })?;
        }

        // Plate text is not prose; keep the language model out of it.
        engine
            .set_variable(Variable::LoadSystemDawg, "F")
            .map_err(|e| {
                RecognitionError::ExtractionFailure(format!("cannot disable dictionary: {}", e))
            })?;
        engine
            .set_variable(Variable::LoadFreqDawg, "F")
            .map_err(|e| {
                RecognitionError::ExtractionFailure(format!("cannot disable dictionary: {}", e))
            })?;

        Ok(engine)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn extract(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawTextObservation>, RecognitionError> {
        if width == 0 || height == 0 || data.len() < (width as usize * height as usize * 4) {
            return Err(RecognitionError::ExtractionFailure(format!(
                "invalid image buffer ({}x{}, {} bytes)",
                width,
                height,
                data.len()
            )));
        }

        let mut engine = self.configured_engine()?;

        // leptess wants encoded image data, not a raw buffer
        let img: image::RgbaImage = image::ImageBuffer::from_raw(width, height, data.to_vec())
            .ok_or_else(|| {
                RecognitionError::ExtractionFailure("buffer does not match dimensions".to_string())
            })?;
        let mut png = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| RecognitionError::ExtractionFailure(format!("png encode failed: {}", e)))?;

        engine
            .set_image_from_mem(png.get_ref())
            .map_err(|e| RecognitionError::ExtractionFailure(format!("set image failed: {}", e)))?;

        // None means a blank image, not a failure
        let boxes =
            match engine.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true) {
                Some(boxes) => boxes,
                None => return Ok(Vec::new()),
            };

        let mut observations = Vec::new();
        for word_box in &boxes {
            let geometry = word_box.get_geometry();
            engine.set_rectangle(geometry.x, geometry.y, geometry.w, geometry.h);

            let text = engine.get_utf8_text().unwrap_or_default().trim().to_string();
            if text.is_empty() {
                continue;
            }

            let confidence = engine.mean_text_conf() as f32 / 100.0;
            if confidence < self.options.min_confidence {
                continue;
            }

            let region = BoundingRegion {
                x: geometry.x as f32 / width as f32,
                y: geometry.y as f32 / height as f32,
                width: geometry.w as f32 / width as f32,
                height: geometry.h as f32 / height as f32,
            };

            debug!(
                "Tesseract read {:?} ({:.0}%) at ({:.3}, {:.3}, {:.3}, {:.3})",
                text,
                confidence * 100.0,
                region.x,
                region.y,
                region.width,
                region.height
            );

            observations.push(RawTextObservation {
                text,
                alternatives: Vec::new(),
                confidence,
                region,
            });
        }

        Ok(observations)
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a native tesseract install with eng language data.
    #[test]
    #[ignore]
    fn test_blank_image_yields_no_observations() {
        let options = RecognizerOptions::default();
        let mut ocr = TesseractRecognizer::new(&options).unwrap();
        let blank = vec![255u8; 64 * 32 * 4];
        let observations = ocr.extract(&blank, 64, 32).unwrap();
        assert!(observations.is_empty());
    }
}
