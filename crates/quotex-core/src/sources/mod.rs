//! Per-document extractors: spreadsheets, PDFs and email bodies.
//!
//! Each turns one input document into raw rows grouped by source kind, plus
//! free-text findings and non-fatal warnings.

pub mod email;
pub mod pdf;
pub mod spreadsheet;

pub use email::EmailSource;
pub use pdf::PdfSource;
pub use spreadsheet::SpreadsheetSource;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExtractionError;
use crate::extract::{TableExtraction, TextFinding};
use crate::models::{RawRow, SourceKind};

/// Format of an input document, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Workbook readable by calamine (xlsx, xlsm, xlsb, xls, ods).
    Workbook,
    Csv,
    Pdf,
    /// Plain-text email body.
    EmailBody,
}

impl DocumentKind {
    /// Detect the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(DocumentKind::Workbook),
            "csv" => Some(DocumentKind::Csv),
            "pdf" => Some(DocumentKind::Pdf),
            "txt" | "eml" => Some(DocumentKind::EmailBody),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Workbook => "workbook",
            DocumentKind::Csv => "csv",
            DocumentKind::Pdf => "pdf",
            DocumentKind::EmailBody => "email_body",
        };
        f.write_str(name)
    }
}

/// One document handed to the pipeline.
#[derive(Debug, Clone)]
pub enum InputDocument {
    /// A file on disk.
    File { path: PathBuf, kind: DocumentKind },
    /// An already decoded email body.
    EmailBody { label: String, text: String },
}

impl InputDocument {
    /// Wrap a path, detecting its kind from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ExtractionError> {
        let path = path.into();
        let kind = DocumentKind::from_path(&path)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(path.display().to_string()))?;
        Ok(InputDocument::File { path, kind })
    }

    pub fn email_body(label: impl Into<String>, text: impl Into<String>) -> Self {
        InputDocument::EmailBody {
            label: label.into(),
            text: text.into(),
        }
    }

    /// Name used in logs and reports.
    pub fn name(&self) -> String {
        match self {
            InputDocument::File { path, .. } => path.display().to_string(),
            InputDocument::EmailBody { label, .. } => label.clone(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            InputDocument::File { kind, .. } => *kind,
            InputDocument::EmailBody { .. } => DocumentKind::EmailBody,
        }
    }
}

/// Everything one document produced.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtraction {
    /// Raw rows keyed by the source kind they count as.
    pub rows: BTreeMap<SourceKind, Vec<RawRow>>,
    pub findings: Vec<TextFinding>,
    pub warnings: Vec<String>,
    /// Whether the text came from OCR.
    pub ocr_used: bool,
}

impl DocumentExtraction {
    /// Append rows under a source kind.
    pub fn push_rows(&mut self, source: SourceKind, rows: Vec<RawRow>) {
        if !rows.is_empty() {
            self.rows.entry(source).or_default().extend(rows);
        }
    }

    /// Fold a table extraction in, keeping its warnings.
    pub fn absorb_table(&mut self, source: SourceKind, mut table: TableExtraction) {
        self.warnings.append(&mut table.warnings);
        self.push_rows(source, table.rows);
    }

    pub fn row_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("quote.XLSX")), Some(DocumentKind::Workbook));
        assert_eq!(DocumentKind::from_path(Path::new("a/b/quote.ods")), Some(DocumentKind::Workbook));
        assert_eq!(DocumentKind::from_path(Path::new("quote.csv")), Some(DocumentKind::Csv));
        assert_eq!(DocumentKind::from_path(Path::new("scan.pdf")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("body.txt")), Some(DocumentKind::EmailBody));
        assert_eq!(DocumentKind::from_path(Path::new("mail.msg")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_unsupported_input_is_rejected() {
        let err = InputDocument::from_path("mail.msg").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_empty_row_sets_are_not_recorded() {
        let mut extraction = DocumentExtraction::default();
        extraction.push_rows(SourceKind::Pdf, Vec::new());
        extraction.push_rows(SourceKind::Pdf, vec![RawRow::new("A", "Alpha", 1)]);
        extraction.push_rows(SourceKind::Pdf, vec![RawRow::new("B", "Beta", 1)]);

        assert_eq!(extraction.rows.len(), 1);
        assert_eq!(extraction.row_count(), 2);
    }
}
