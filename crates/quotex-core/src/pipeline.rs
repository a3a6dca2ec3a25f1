//! End-to-end pipeline: documents in, validated products out.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{ExtractionError, Result};
use crate::extract::TextFinding;
use crate::models::{QuotexConfig, RawRow, SourceKind, UnifiedProduct, ValidationError};
use crate::ocr::{create_recognizer, TextRecognizer};
use crate::sources::{
    DocumentExtraction, DocumentKind, EmailSource, InputDocument, PdfSource, SpreadsheetSource,
};
use crate::unify::{unify_collections, Unification, Validator};

/// What happened to one input document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub name: String,
    pub kind: DocumentKind,
    /// Raw rows extracted, before unification.
    pub rows: usize,
    pub ocr_used: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Set when the document failed as a whole.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentSummary {
    fn extracted(document: &InputDocument, extraction: &DocumentExtraction) -> Self {
        Self {
            name: document.name(),
            kind: document.kind(),
            rows: extraction.row_count(),
            ocr_used: extraction.ocr_used,
            warnings: extraction.warnings.clone(),
            error: None,
        }
    }

    fn failed(document: &InputDocument, error: String) -> Self {
        Self {
            name: document.name(),
            kind: document.kind(),
            rows: 0,
            ocr_used: false,
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Valid, deduplicated products.
    pub products: Vec<UnifiedProduct>,
    /// Products rejected by validation.
    pub errors: Vec<ValidationError>,
    /// One summary per input document, in input order.
    pub documents: Vec<DocumentSummary>,
    /// Free-text findings, reported but never turned into products.
    pub findings: Vec<TextFinding>,
    pub generated_at: DateTime<Utc>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionReport {
    /// Sum of the known line totals.
    pub fn priced_total(&self) -> rust_decimal::Decimal {
        self.products.iter().filter_map(|p| p.total_price).sum()
    }
}

/// Runs documents through extraction, unification, deduplication and
/// validation.
pub struct QuotePipeline {
    config: QuotexConfig,
    validator: Validator,
    recognizer: Option<Box<dyn TextRecognizer>>,
}

impl QuotePipeline {
    /// Create a pipeline without OCR.
    pub fn new(config: QuotexConfig) -> Self {
        Self {
            validator: Validator::from_config(&config.extraction),
            config,
            recognizer: None,
        }
    }

    /// Create a pipeline, loading the OCR recognizer when the fallback is
    /// enabled. A recognizer that fails to load leaves OCR unavailable.
    pub fn from_config(config: QuotexConfig) -> Self {
        let recognizer = if config.pdf.ocr_fallback {
            create_recognizer(&config.ocr).unwrap_or_else(|e| {
                warn!("OCR recognizer unavailable: {}", e);
                None
            })
        } else {
            None
        };

        let pipeline = Self::new(config);
        match recognizer {
            Some(recognizer) => pipeline.with_recognizer(recognizer),
            None => pipeline,
        }
    }

    /// Use this recognizer for the PDF OCR fallback.
    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn config(&self) -> &QuotexConfig {
        &self.config
    }

    pub fn has_ocr(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Extract a single document.
    pub fn extract_document(&self, document: &InputDocument) -> Result<DocumentExtraction> {
        match document {
            InputDocument::EmailBody { label, text } => {
                Ok(EmailSource::new(&self.config.extraction).extract(text, label))
            }
            InputDocument::File { path, kind } => match kind {
                DocumentKind::Workbook | DocumentKind::Csv => {
                    SpreadsheetSource::new(&self.config.extraction).extract_path(path, *kind)
                }
                DocumentKind::Pdf => PdfSource::new(&self.config, self.recognizer.as_deref()).extract_path(path),
                DocumentKind::EmailBody => {
                    let text = std::fs::read_to_string(path)?;
                    Ok(EmailSource::new(&self.config.extraction).extract(&text, &path.display().to_string()))
                }
            },
        }
    }

    /// Process documents in order.
    pub fn process(&self, documents: &[InputDocument]) -> Result<ExtractionReport> {
        self.process_with(documents, |_| {})
    }

    /// Process documents in order, reporting each document once it is done.
    ///
    /// A failed document is recorded in its summary and the run continues,
    /// unless the failure is fatal. Zero valid products is an error.
    pub fn process_with<F>(&self, documents: &[InputDocument], mut on_document: F) -> Result<ExtractionReport>
    where
        F: FnMut(&DocumentSummary),
    {
        let start = Instant::now();
        let mut collections: BTreeMap<SourceKind, Vec<RawRow>> = BTreeMap::new();
        let mut summaries = Vec::with_capacity(documents.len());
        let mut findings = Vec::new();

        for document in documents {
            let summary = match self.extract_document(document) {
                Ok(mut extraction) => {
                    let summary = DocumentSummary::extracted(document, &extraction);
                    for (source, mut rows) in std::mem::take(&mut extraction.rows) {
                        collections.entry(source).or_default().append(&mut rows);
                    }
                    findings.append(&mut extraction.findings);
                    summary
                }
                Err(e) if e.is_fatal() => {
                    error!("Aborting on {}: {}", document.name(), e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to extract {}: {}", document.name(), e);
                    DocumentSummary::failed(document, e.to_string())
                }
            };
            on_document(&summary);
            summaries.push(summary);
        }

        let ordered = SourceKind::ALL
            .iter()
            .map(|kind| (*kind, collections.remove(kind).unwrap_or_default()));
        let Unification { products, errors } = unify_collections(ordered, &self.validator);

        if products.is_empty() {
            return Err(ExtractionError::NoValidProducts { rejected: errors.len() }.into());
        }

        let report = ExtractionReport {
            products,
            errors,
            documents: summaries,
            findings,
            generated_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Extracted {} products ({} rejected) from {} documents in {}ms",
            report.products.len(),
            report.errors.len(),
            report.documents.len(),
            report.processing_time_ms
        );
        Ok(report)
    }

    /// Unify, deduplicate and validate pre-extracted collections, in the
    /// order given.
    pub fn unify_collections<I>(&self, collections: I) -> Unification
    where
        I: IntoIterator<Item = (SourceKind, Vec<RawRow>)>,
    {
        unify_collections(collections, &self.validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuotexError;
    use pretty_assertions::assert_eq;

    fn pipeline() -> QuotePipeline {
        QuotePipeline::new(QuotexConfig::default())
    }

    #[test]
    fn test_zero_valid_products_is_fatal() {
        let documents = [InputDocument::email_body("mail", "Thanks, we will get back to you.")];
        let err = pipeline().process(&documents).unwrap_err();

        assert!(matches!(
            err,
            QuotexError::Extraction(ExtractionError::NoValidProducts { rejected: 0 })
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_failed_document_is_recorded_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let documents = [
            InputDocument::from_path(&missing).unwrap(),
            InputDocument::email_body("mail", "SKU | Description | Qty\nA-1 | Cable kit | 2\n"),
        ];

        let mut seen = Vec::new();
        let report = pipeline()
            .process_with(&documents, |summary| seen.push(summary.name.clone()))
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert!(report.documents[0].error.is_some());
        assert_eq!(report.documents[1].rows, 1);
        assert_eq!(report.products[0].source, SourceKind::InlineTable);
    }

    #[test]
    fn test_no_recognizer_without_fallback() {
        let mut config = QuotexConfig::default();
        config.pdf.ocr_fallback = false;
        assert!(!QuotePipeline::from_config(config).has_ocr());
    }
}
