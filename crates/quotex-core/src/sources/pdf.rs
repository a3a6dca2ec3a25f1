//! PDF documents: text layer first, OCR over embedded page images when the
//! text layer cannot be read.

use std::path::Path;

use image::DynamicImage;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::DocumentExtraction;
use crate::error::{ExtractionError, PdfError, Result};
use crate::extract::{split_text_tables, FreeTextExtractor, TableExtractor};
use crate::models::{PdfConfig, QuotexConfig, SourceKind};
use crate::ocr::TextRecognizer;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Extracts line items and findings from a PDF.
pub struct PdfSource<'r> {
    tables: TableExtractor,
    text: FreeTextExtractor,
    config: PdfConfig,
    parallel: bool,
    recognizer: Option<&'r dyn TextRecognizer>,
}

impl<'r> PdfSource<'r> {
    pub fn new(config: &QuotexConfig, recognizer: Option<&'r dyn TextRecognizer>) -> Self {
        Self {
            tables: TableExtractor::new(&config.extraction),
            text: FreeTextExtractor::new(),
            config: config.pdf.clone(),
            parallel: config.extraction.parallel,
            recognizer,
        }
    }

    /// Read and extract a PDF file.
    pub fn extract_path(&self, path: &Path) -> Result<DocumentExtraction> {
        let data = std::fs::read(path)?;
        let source_file = path.display().to_string();
        self.extract_with(PdfExtractor::new(), &data, Some(&source_file))
    }

    /// Extract using the given processor.
    ///
    /// OCR runs only when reading the text layer fails. A readable but empty
    /// text layer yields an empty extraction.
    pub fn extract_with<P: PdfProcessor>(
        &self,
        mut processor: P,
        data: &[u8],
        source_file: Option<&str>,
    ) -> Result<DocumentExtraction> {
        let name = source_file.unwrap_or("pdf");

        let failure = match read_text_layer(&mut processor, data, self.config.max_pages) {
            Ok(pages) => return Ok(self.extract_pages(&pages, "page", source_file)),
            Err(e) => e,
        };

        if !self.config.ocr_fallback {
            return Err(failure.into());
        }
        let Some(recognizer) = self.recognizer else {
            return Err(ExtractionError::MissingCapability(format!(
                "{} needs OCR ({}) but no recognizer is available",
                name, failure
            ))
            .into());
        };

        warn!("Text layer of {} unreadable ({}), falling back to OCR", name, failure);
        let (pages, mut warnings) = self.recognize_pages(&processor, recognizer)?;

        let mut extraction = self.extract_pages(&pages, "scan", source_file);
        extraction.ocr_used = true;
        extraction.warnings.insert(0, format!("{}: text layer unreadable: {}", name, failure));
        extraction.warnings.append(&mut warnings);
        Ok(extraction)
    }

    /// Run the text-table and free-text paths over each page's text.
    fn extract_pages(&self, pages: &[String], label: &str, source_file: Option<&str>) -> DocumentExtraction {
        let tables = &self.tables;
        let text = &self.text;
        let extract_page = |(index, page): (usize, &String)| {
            let mut page_extraction = DocumentExtraction::default();
            let split = split_text_tables(page, &format!("{} {}", label, index + 1));
            for grid in &split.tables {
                page_extraction.absorb_table(SourceKind::Pdf, tables.extract_grid(grid, source_file));
            }
            page_extraction.findings = text.extract(page, SourceKind::Pdf, source_file);
            page_extraction
        };

        let per_page: Vec<DocumentExtraction> = if self.parallel {
            pages.par_iter().enumerate().map(extract_page).collect()
        } else {
            pages.iter().enumerate().map(extract_page).collect()
        };

        let mut extraction = DocumentExtraction::default();
        for mut page in per_page {
            for (source, rows) in page.rows {
                extraction.push_rows(source, rows);
            }
            extraction.findings.append(&mut page.findings);
            extraction.warnings.append(&mut page.warnings);
        }

        info!(
            "Extracted {} rows and {} findings from {} pages",
            extraction.row_count(),
            extraction.findings.len(),
            pages.len()
        );
        extraction
    }

    /// Recognize the page images. One text per image; images that fail to
    /// recognize become warnings.
    fn recognize_pages<P: PdfProcessor>(
        &self,
        processor: &P,
        recognizer: &dyn TextRecognizer,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let images = page_images(processor, self.config.max_pages);
        if images.is_empty() {
            return Err(PdfError::ImageExtraction("no page images to recognize".to_string()).into());
        }

        info!(
            "Running OCR ({}) over {} images",
            recognizer.languages().join("+"),
            images.len()
        );

        let mut texts = Vec::with_capacity(images.len());
        let mut warnings = Vec::new();
        for (index, image) in images.iter().enumerate() {
            match recognizer.recognize(image) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("OCR failed on image {}: {}", index + 1, e);
                    warnings.push(format!("image {}: {}", index + 1, e));
                }
            }
        }
        Ok((texts, warnings))
    }
}

fn read_text_layer<P: PdfProcessor>(processor: &mut P, data: &[u8], max_pages: usize) -> crate::pdf::Result<Vec<String>> {
    processor.load(data)?;
    processor.extract_page_texts(max_pages)
}

/// Images of each page in order; when no page references an image, every
/// image stream in the document.
fn page_images<P: PdfProcessor>(processor: &P, max_pages: usize) -> Vec<DynamicImage> {
    let mut last = processor.page_count();
    if max_pages > 0 {
        last = last.min(max_pages as u32);
    }

    let mut images = Vec::new();
    for page in 1..=last {
        match processor.extract_images(page) {
            Ok(mut found) => images.append(&mut found),
            Err(e) => debug!("No images on page {}: {}", page, e),
        }
    }

    if images.is_empty() {
        debug!("No page images found, scanning all objects");
        images = processor.extract_all_images();
    }
    images
}
