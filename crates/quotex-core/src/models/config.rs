//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the quotex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotexConfig {
    /// Line item extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR fallback configuration.
    pub ocr: OcrConfig,
}

/// Line item extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// A bare number is only read as a price when strictly above this value.
    pub price_floor: Decimal,

    /// Rows scanned below a product row when looking for its price.
    pub lookahead_rows: usize,

    /// Rows scanned when locating a header inside a raw grid.
    pub header_scan_rows: usize,

    /// Keyword hits a row needs to qualify as the header row.
    pub header_min_hits: usize,

    /// Minimum description length (characters) accepted by validation.
    pub min_description_len: usize,

    /// Extract sheets and pages on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            price_floor: Decimal::ONE_HUNDRED,
            lookahead_rows: 5,
            header_scan_rows: 20,
            header_min_hits: 2,
            min_description_len: 3,
            parallel: true,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Run OCR when the text path fails for the whole document.
    pub ocr_fallback: bool,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            ocr_fallback: true,
            max_pages: 50,
        }
    }
}

/// OCR model files and recognition options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Expected language pair of scanned documents.
    pub languages: Vec<String>,

    /// Keep `[UNK]` tokens emitted by the recognizer.
    pub keep_unknown: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "rec.onnx".to_string(),
            dictionary: "dict.txt".to_string(),
            languages: vec!["eng".to_string(), "heb".to_string()],
            keep_unknown: false,
        }
    }
}

impl QuotexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.ocr.model_dir.join(model_name)
    }
}
