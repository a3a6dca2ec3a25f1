//! Free-text extraction: table-like blocks inside text, and best-effort
//! findings (quantities, prices, product phrases, specifications).

use serde::Serialize;

use super::rules::patterns::{CELL_SEPARATOR, MULTI_SPACE};
use super::rules::{
    FieldExtractor, PriceExtractor, PriceMention, ProductPhraseExtractor, QuantityExtractor,
    QuantityMention, SpecExtractor,
};
use crate::models::{CellValue, Grid, SourceKind};

/// Upper bound on free-text confidence; structured rows always score 1.0.
pub const MAX_TEXT_CONFIDENCE: f32 = 0.8;

/// What a free-text finding holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingValue {
    Quantity(QuantityMention),
    Price(PriceMention),
    Product { phrase: String },
    Specification { spec: String },
}

/// A weak, free-text signal reported next to the extracted products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFinding {
    #[serde(flatten)]
    pub value: FindingValue,
    /// Matched text.
    pub text: String,
    pub confidence: f32,
    pub source: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

/// Output of splitting a text block.
#[derive(Debug, Clone, Default)]
pub struct SplitText {
    /// Table-like blocks, one grid each.
    pub tables: Vec<Grid>,
    /// Lines that were not part of any table.
    pub remainder: String,
}

/// Whether a line looks like a row of a text table.
fn is_table_line(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    let separated = line.contains('\t') || line.contains('|') || MULTI_SPACE.find_iter(line).count() >= 2;
    separated && split_cells(line).iter().filter(|c| !c.is_empty()).count() >= 2
}

/// Cells of a table line. Pipe-delimited lines keep their empty cells so
/// columns stay aligned; outer pipes are dropped.
fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    if line.contains('|') {
        let inner = line
            .strip_prefix('|')
            .and_then(|l| l.strip_suffix('|'))
            .unwrap_or(line);
        return inner.split('|').map(|c| c.trim().to_string()).collect();
    }

    CELL_SEPARATOR
        .split(line)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split text into table-like blocks and remaining prose.
///
/// Consecutive table lines form one table; a block needs at least two lines
/// (header and one row), otherwise its line stays in the remainder.
pub fn split_text_tables(text: &str, label: &str) -> SplitText {
    let mut split = SplitText::default();
    let mut block: Vec<&str> = Vec::new();
    let mut remainder: Vec<&str> = Vec::new();

    for line in text.lines() {
        if is_table_line(line) {
            block.push(line);
        } else {
            flush_block(&mut block, &mut remainder, &mut split.tables, label);
            remainder.push(line);
        }
    }
    flush_block(&mut block, &mut remainder, &mut split.tables, label);

    split.remainder = remainder.join("\n");
    split
}

fn flush_block<'t>(
    block: &mut Vec<&'t str>,
    remainder: &mut Vec<&'t str>,
    tables: &mut Vec<Grid>,
    label: &str,
) {
    if block.len() >= 2 {
        let rows = block
            .iter()
            .map(|line| split_cells(line).into_iter().map(CellValue::from).collect())
            .collect();
        tables.push(Grid::new(format!("{} table {}", label, tables.len() + 1), rows));
        block.clear();
    } else {
        remainder.append(block);
    }
}

/// Regex and heuristic scan over unstructured text.
#[derive(Default)]
pub struct FreeTextExtractor {
    quantities: QuantityExtractor,
    prices: PriceExtractor,
    phrases: ProductPhraseExtractor,
    specs: SpecExtractor,
}

impl FreeTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect findings from `text`, tagged with their source.
    pub fn extract(&self, text: &str, source: SourceKind, source_file: Option<&str>) -> Vec<TextFinding> {
        let finding = |value: FindingValue, text: &str, confidence: f32| TextFinding {
            value,
            text: text.trim().to_string(),
            confidence: confidence.min(MAX_TEXT_CONFIDENCE),
            source,
            source_file: source_file.map(str::to_string),
        };

        let mut findings = Vec::new();
        findings.extend(
            self.quantities
                .extract_all(text)
                .into_iter()
                .map(|m| finding(FindingValue::Quantity(m.value), &m.source, m.confidence)),
        );
        findings.extend(
            self.prices
                .extract_all(text)
                .into_iter()
                .map(|m| finding(FindingValue::Price(m.value), &m.source, m.confidence)),
        );
        findings.extend(
            self.phrases
                .extract_all(text)
                .into_iter()
                .map(|m| finding(FindingValue::Product { phrase: m.value }, &m.source, m.confidence)),
        );
        findings.extend(
            self.specs
                .extract_all(text)
                .into_iter()
                .map(|m| finding(FindingValue::Specification { spec: m.value }, &m.source, m.confidence)),
        );
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_tab_and_pipe_tables() {
        let text = "Hi team,\nplease quote:\nSKU\tDescription\tQty\nX1\tWidget\t2\n\nthanks\n| SKU | Desc |\n| Y2 | Gadget |";
        let split = split_text_tables(text, "body");

        assert_eq!(split.tables.len(), 2);
        assert_eq!(split.tables[0].name, "body table 1");
        assert_eq!(
            split.tables[0].rows[1],
            vec![CellValue::from("X1"), CellValue::from("Widget"), CellValue::from("2")]
        );
        assert_eq!(split.tables[1].rows[1], vec![CellValue::from("Y2"), CellValue::from("Gadget")]);
        assert_eq!(split.remainder, "Hi team,\nplease quote:\n\nthanks");
    }

    #[test]
    fn test_pipe_rows_keep_empty_cells() {
        let split = split_text_tables("SKU | Description | Qty\n | Widget | 1", "body");
        assert_eq!(
            split.tables[0].rows[1],
            vec![CellValue::from(""), CellValue::from("Widget"), CellValue::from("1")]
        );
    }

    #[test]
    fn test_single_table_line_stays_in_remainder() {
        let split = split_text_tables("Price  list  2024\nsee you", "body");
        assert!(split.tables.is_empty());
        assert_eq!(split.remainder, "Price  list  2024\nsee you");
    }

    #[test]
    fn test_space_aligned_table() {
        let text = "SKU     Description     Qty\nA-1     Patch cord      10";
        let split = split_text_tables(text, "page 1");
        assert_eq!(split.tables.len(), 1);
        assert_eq!(split.tables[0].rows[0].len(), 3);
    }

    #[test]
    fn test_findings_are_weak_and_tagged() {
        let text = "We need 2x R750 servers, budget $25,000.\n2U server with 512 GB RAM and dual CPU";
        let findings = FreeTextExtractor::new().extract(text, SourceKind::EmailText, None);

        assert!(!findings.is_empty());
        assert!(findings.iter().all(|f| f.confidence < 1.0));
        assert!(findings.iter().all(|f| f.source == SourceKind::EmailText));
        assert!(findings.iter().any(|f| matches!(
            &f.value,
            FindingValue::Price(p) if p.amount == rust_decimal::Decimal::from(25_000)
        )));
        assert!(findings
            .iter()
            .any(|f| matches!(&f.value, FindingValue::Quantity(q) if q.quantity == 2)));
    }

    #[test]
    fn test_finding_serialization() {
        let finding = TextFinding {
            value: FindingValue::Product {
                phrase: "2U server".to_string(),
            },
            text: "2U server".to_string(),
            confidence: 0.5,
            source: SourceKind::Pdf,
            source_file: None,
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "product");
        assert_eq!(json["phrase"], "2U server");
        assert_eq!(json["source"], "pdf");
    }
}
