//! PDF access: per-page text and embedded page images.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Text of each page in order, at most `max_pages` of them (0 = all).
    fn extract_page_texts(&self, max_pages: usize) -> Result<Vec<String>>;

    /// Extract the image XObjects referenced by a page.
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;

    /// Every decodable image stream in the document, regardless of page.
    fn extract_all_images(&self) -> Vec<DynamicImage>;
}
