//! Core library for vendor quote extraction.
//!
//! This crate provides:
//! - Header location and bilingual (English/Hebrew) column role detection
//! - A cascading price locator for prices outside their expected cell
//! - Spreadsheet, PDF (with OCR fallback) and email body extraction
//! - Cross-source unification, deduplication and validation of line items

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod sources;
pub mod unify;

pub use error::{QuotexError, Result};
pub use extract::{FindingValue, Role, TableExtractor, TextFinding};
pub use models::{
    CellValue, Grid, ProductMetadata, QuotexConfig, RawRow, SourceKind, UnifiedProduct, ValidationError,
};
pub use ocr::{create_recognizer, TextRecognizer};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{DocumentSummary, ExtractionReport, QuotePipeline};
pub use sources::{DocumentExtraction, DocumentKind, InputDocument};
pub use unify::{Unification, Validator};
