//! Error types for the quotex-core library.

use thiserror::Error;

/// Main error type for the quotex library.
#[derive(Error, Debug)]
pub enum QuotexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Spreadsheet loading error.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] SpreadsheetError),

    /// Line item extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl QuotexError {
    /// Whether this error must abort the whole request instead of only the
    /// document that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            QuotexError::Extraction(ExtractionError::MissingCapability(_))
                | QuotexError::Extraction(ExtractionError::NoValidProducts { .. })
                | QuotexError::Ocr(OcrError::Unavailable(_))
        )
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// OCR was required but no recognizer is available.
    #[error("OCR unavailable: {0}")]
    Unavailable(String),
}

/// Errors related to spreadsheet loading.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Failed to open the workbook.
    #[error("failed to open workbook: {0}")]
    Open(String),

    /// A single sheet could not be read.
    #[error("failed to read sheet {sheet}: {reason}")]
    Sheet { sheet: String, reason: String },

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook contains no sheets.
    #[error("workbook has no sheets")]
    NoSheets,
}

/// Errors related to line item extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Failed to parse a cell value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// The document format is not supported.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// A parsing capability required by the document is not available.
    #[error("missing capability: {0}")]
    MissingCapability(String),

    /// Nothing survived validation, so there is nothing to price.
    #[error("no valid products extracted ({rejected} rejected)")]
    NoValidProducts { rejected: usize },

    /// No line item data found.
    #[error("no line item data found")]
    NoData,
}

/// Result type for the quotex library.
pub type Result<T> = std::result::Result<T, QuotexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let missing = QuotexError::from(ExtractionError::MissingCapability("ocr".into()));
        assert!(missing.is_fatal());

        let empty = QuotexError::from(ExtractionError::NoValidProducts { rejected: 2 });
        assert!(empty.is_fatal());
        assert_eq!(empty.to_string(), "extraction error: no valid products extracted (2 rejected)");

        let page = QuotexError::from(PdfError::InvalidPage(3));
        assert!(!page.is_fatal());
    }
}
