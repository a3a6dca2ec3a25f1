//! Plain-text email bodies: inline tables and free text.

use tracing::info;

use super::DocumentExtraction;
use crate::extract::{split_text_tables, FreeTextExtractor, TableExtractor};
use crate::models::{ExtractionConfig, SourceKind};

/// Extracts inline tables and free-text findings from an email body.
pub struct EmailSource {
    tables: TableExtractor,
    text: FreeTextExtractor,
}

impl EmailSource {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            tables: TableExtractor::new(config),
            text: FreeTextExtractor::new(),
        }
    }

    /// Tables become `inline_table` rows; the text around them is scanned
    /// for `email_text` findings.
    pub fn extract(&self, body: &str, label: &str) -> DocumentExtraction {
        let split = split_text_tables(body, label);
        let mut extraction = DocumentExtraction::default();

        for grid in &split.tables {
            extraction.absorb_table(SourceKind::InlineTable, self.tables.extract_grid(grid, Some(label)));
        }
        extraction.findings = self
            .text
            .extract(&split.remainder, SourceKind::EmailText, Some(label));

        info!(
            "Email {}: {} inline tables, {} rows, {} findings",
            label,
            split.tables.len(),
            extraction.row_count(),
            extraction.findings.len()
        );
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FindingValue;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const BODY: &str = "Hi,\n\
        please find our offer below.\n\
        \n\
        מק\"ט | תיאור | כמות | מחיר\n\
        NET-24 | Switch 24 ports managed | 3 | 1,850\n\
        \n\
        We can also add 2x DAC cables, cost 45 USD each.\n\
        Regards";

    #[test]
    fn test_inline_table_rows_and_text_findings() {
        let extraction = EmailSource::new(&ExtractionConfig::default()).extract(BODY, "offer.txt");

        let rows = &extraction.rows[&SourceKind::InlineTable];
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "NET-24");
        assert_eq!(rows[0].quantity, 3);
        assert_eq!(rows[0].unit_price, Some(Decimal::from(1850)));
        assert_eq!(rows[0].source_file.as_deref(), Some("offer.txt"));
        assert!(!extraction.rows.contains_key(&SourceKind::EmailText));

        assert!(extraction.findings.iter().all(|f| f.source == SourceKind::EmailText));
        assert!(extraction
            .findings
            .iter()
            .any(|f| matches!(&f.value, FindingValue::Quantity(q) if q.quantity == 2)));
        // the table's own price is not reported again as free text
        assert!(!extraction.findings.iter().any(|f| f.text.contains("1,850")));
    }

    #[test]
    fn test_body_without_tables_has_no_rows() {
        let extraction =
            EmailSource::new(&ExtractionConfig::default()).extract("Please quote 5 units of the usual.", "mail");
        assert_eq!(extraction.row_count(), 0);
        assert_eq!(extraction.findings.len(), 1);
    }
}
