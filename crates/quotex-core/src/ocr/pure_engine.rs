//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::TextRecognizer;
use crate::error::OcrError;
use crate::models::OcrConfig;

/// Regions whose top edges are closer than this (pixels) share a line.
const LINE_TOLERANCE: f32 = 12.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    languages: Vec<String>,
    keep_unknown: bool,
}

/// One recognized region reduced to what line assembly needs.
#[derive(Debug, Clone)]
struct Region {
    text: String,
    x: f32,
    y: f32,
}

impl PureOcrEngine {
    /// Load the detection/recognition models named in the config.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.model_dir.join(&config.detection_model);
        let rec_path = config.model_dir.join(&config.recognition_model);
        let dict_path = config.model_dir.join(&config.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded OCR engine from {} for languages {}",
            config.model_dir.display(),
            config.languages.join("+")
        );

        Ok(Self {
            engine,
            languages: config.languages.clone(),
            keep_unknown: config.keep_unknown,
        })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        debug!("Recognizing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let regions: Vec<Region> = results
            .iter()
            .map(|r| {
                let (x, y) = polygon_origin(&r.bounding_box);
                let text = if self.keep_unknown {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Region { text, x, y }
            })
            .filter(|r| !r.text.trim().is_empty())
            .collect();

        let text = assemble_lines(regions);

        info!(
            "OCR complete: {} lines in {}ms",
            text.lines().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn languages(&self) -> &[String] {
        &self.languages
    }
}

/// Top-left corner of a detection polygon.
fn polygon_origin(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}

/// Group regions into visual lines (top to bottom), words left to right,
/// joined with tabs.
fn assemble_lines(mut regions: Vec<Region>) -> String {
    regions.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut lines: Vec<(f32, Vec<Region>)> = Vec::new();
    for region in regions {
        match lines.last_mut() {
            Some((y, words)) if (region.y - *y).abs() <= LINE_TOLERANCE => words.push(region),
            _ => lines.push((region.y, vec![region])),
        }
    }

    lines
        .into_iter()
        .map(|(_, mut words)| {
            words.sort_by(|a, b| a.x.total_cmp(&b.x));
            words
                .iter()
                .map(|w| w.text.trim())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(text: &str, x: f32, y: f32) -> Region {
        Region {
            text: text.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn test_assemble_lines_in_reading_order() {
        let text = assemble_lines(vec![
            region("Widget", 120.0, 52.0),
            region("SKU", 10.0, 10.0),
            region("X1", 10.0, 50.0),
            region("Description", 120.0, 12.0),
        ]);
        assert_eq!(text, "SKU\tDescription\nX1\tWidget");
    }
}
