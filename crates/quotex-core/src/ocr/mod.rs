//! OCR fallback for scanned documents.

#[cfg(feature = "ocr")]
mod pure_engine;

#[cfg(feature = "ocr")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use tracing::warn;

use crate::error::OcrError;
use crate::models::OcrConfig;

/// Turns a page image into plain text.
///
/// Words recognized on the same visual line are separated by tabs so that
/// tabular scans survive as text tables.
pub trait TextRecognizer {
    /// Recognize all text in the image, top to bottom.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Language pair the recognizer was configured for.
    fn languages(&self) -> &[String];
}

/// Build the configured recognizer.
///
/// Returns `Ok(None)` when OCR support is compiled out or the model files
/// are missing; callers decide whether that is fatal.
pub fn create_recognizer(config: &OcrConfig) -> Result<Option<Box<dyn TextRecognizer>>, OcrError> {
    #[cfg(feature = "ocr")]
    {
        let det = config.model_dir.join(&config.detection_model);
        if !det.exists() {
            warn!("OCR models not found in {}", config.model_dir.display());
            return Ok(None);
        }
        let engine = PureOcrEngine::from_config(config)?;
        Ok(Some(Box::new(engine)))
    }

    #[cfg(not(feature = "ocr"))]
    {
        warn!(
            "OCR support not compiled in, ignoring models in {}",
            config.model_dir.display()
        );
        Ok(None)
    }
}
