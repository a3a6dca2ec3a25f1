//! Line item models: raw candidates, unified products and validation output.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::grid::CellValue;

/// Kind of source a line item came from.
///
/// The declaration order is the order collections are merged in, which
/// decides merge outcomes on confidence ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Spreadsheet attachment (any sheet).
    Excel,
    /// PDF attachment, text layer or OCR.
    Pdf,
    /// Table embedded in an email body.
    InlineTable,
    /// Free text of an email body.
    EmailText,
}

impl SourceKind {
    /// All kinds in merge order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Excel,
        SourceKind::Pdf,
        SourceKind::InlineTable,
        SourceKind::EmailText,
    ];

    /// Stable tag used in reports and metadata.
    pub fn tag(&self) -> &'static str {
        match self {
            SourceKind::Excel => "excel",
            SourceKind::Pdf => "pdf",
            SourceKind::InlineTable => "inline_table",
            SourceKind::EmailText => "email_text",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One candidate line item produced by an extractor, before unification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Vendor SKU / part number as written in the source.
    pub sku: String,

    /// Product description.
    pub description: String,

    /// Quantity; 1 when the source cell was unparsable. Non-positive values
    /// are kept so validation can flag them.
    pub quantity: i64,

    /// Unit price, `None` when no price could be located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Line total, when present in or derivable from the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,

    /// Source-local position (1-based physical row).
    pub row_number: usize,

    /// Original cell values keyed by header, for audit.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub raw_data: BTreeMap<String, CellValue>,

    /// Originating file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Product category, when the source carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RawRow {
    /// Minimal row with no price; mostly useful for callers feeding rows
    /// directly into the unifier.
    pub fn new(sku: impl Into<String>, description: impl Into<String>, quantity: i64) -> Self {
        Self {
            sku: sku.into(),
            description: description.into(),
            quantity,
            unit_price: None,
            total_price: None,
            row_number: 0,
            raw_data: BTreeMap::new(),
            source_file: None,
            category: None,
        }
    }

    /// Set the unit price.
    pub fn with_unit_price(mut self, price: Decimal) -> Self {
        self.unit_price = Some(price);
        self
    }

    /// Set the line total.
    pub fn with_total_price(mut self, total: Decimal) -> Self {
        self.total_price = Some(total);
        self
    }

    /// Set the source row number.
    pub fn with_row_number(mut self, row_number: usize) -> Self {
        self.row_number = row_number;
        self
    }

    /// Set the originating file.
    pub fn with_source_file(mut self, path: impl Into<String>) -> Self {
        self.source_file = Some(path.into());
        self
    }
}

/// Unification metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    /// Source tags of every record merged into this one, in order of first
    /// appearance.
    #[serde(default)]
    pub sources: Vec<SourceKind>,

    /// Row number of the first record.
    pub row_number: usize,

    /// Category consumed by downstream pricing rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Canonical, source-tagged product after unification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedProduct {
    pub sku: String,
    pub description: String,
    pub quantity: i64,

    /// Unit price; zero means "unpriced", negative is invalid.
    pub unit_price: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,

    /// Source of the first record with this identity.
    pub source: SourceKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub raw_data: BTreeMap<String, CellValue>,

    /// Extraction certainty (0.0 - 1.0).
    pub confidence: f32,

    pub metadata: ProductMetadata,
}

impl UnifiedProduct {
    /// Whether a positive unit price is known.
    pub fn is_priced(&self) -> bool {
        self.unit_price > Decimal::ZERO
    }
}

/// A product rejected by validation, with every rule it broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// SKU of the offending product (may be empty).
    pub product: String,
    /// Human-readable descriptions of the violated rules.
    pub reasons: Vec<String>,
    /// Source tag of the offending product.
    pub source: SourceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&SourceKind::InlineTable).unwrap(),
            "\"inline_table\""
        );
        assert_eq!(SourceKind::EmailText.to_string(), "email_text");
        assert!(SourceKind::Excel < SourceKind::Pdf);
    }

    #[test]
    fn test_raw_row_builder() {
        let row = RawRow::new("X1", "Widget", 2)
            .with_unit_price(Decimal::new(1050, 2))
            .with_row_number(4);
        assert_eq!(row.unit_price, Some(Decimal::new(1050, 2)));
        assert_eq!(row.total_price, None);
        assert_eq!(row.row_number, 4);
    }
}
