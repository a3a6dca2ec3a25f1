//! Data models shared across the extraction pipeline.

pub mod config;
pub mod grid;
pub mod product;

pub use config::{ExtractionConfig, OcrConfig, PdfConfig, QuotexConfig};
pub use grid::{CellValue, Grid};
pub use product::{ProductMetadata, RawRow, SourceKind, UnifiedProduct, ValidationError};
