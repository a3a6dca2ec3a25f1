//! Turns per-source raw rows into tagged, unified products.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{ProductMetadata, RawRow, SourceKind, UnifiedProduct};

/// Confidence given to every unified row.
pub const UNIFIED_CONFIDENCE: f32 = 1.0;

/// Converts source collections into one flat product list.
#[derive(Debug, Clone, Default)]
pub struct Unifier;

impl Unifier {
    pub fn new() -> Self {
        Self
    }

    /// Unify collections in the order given. One product per raw row; no
    /// merging happens here.
    pub fn unify<I>(&self, collections: I) -> Vec<UnifiedProduct>
    where
        I: IntoIterator<Item = (SourceKind, Vec<RawRow>)>,
    {
        let mut products = Vec::new();
        for (source, rows) in collections {
            debug!(%source, rows = rows.len(), "Unifying source collection");
            products.extend(rows.into_iter().map(|row| self.unify_row(row, source)));
        }
        products
    }

    /// Tag a single raw row.
    pub fn unify_row(&self, row: RawRow, source: SourceKind) -> UnifiedProduct {
        UnifiedProduct {
            sku: row.sku,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price.unwrap_or(Decimal::ZERO),
            total_price: row.total_price,
            source,
            source_file: row.source_file,
            raw_data: row.raw_data,
            confidence: UNIFIED_CONFIDENCE,
            metadata: ProductMetadata {
                sources: vec![source],
                row_number: row.row_number,
                category: row.category,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unify_tags_every_row_in_order() {
        let products = Unifier::new().unify(vec![
            (SourceKind::Excel, vec![RawRow::new("A", "Alpha", 1), RawRow::new("B", "Beta", 2)]),
            (SourceKind::Pdf, vec![RawRow::new("A", "Alpha", 3).with_unit_price(Decimal::TEN)]),
        ]);

        let tags: Vec<(&str, SourceKind)> = products.iter().map(|p| (p.sku.as_str(), p.source)).collect();
        assert_eq!(
            tags,
            vec![("A", SourceKind::Excel), ("B", SourceKind::Excel), ("A", SourceKind::Pdf)]
        );
        assert_eq!(products[0].unit_price, Decimal::ZERO);
        assert_eq!(products[2].unit_price, Decimal::TEN);
        assert!(products.iter().all(|p| p.confidence == 1.0));
        assert_eq!(products[2].metadata.sources, vec![SourceKind::Pdf]);
    }
}
