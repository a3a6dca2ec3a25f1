//! Structural validation of unified products.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{ExtractionConfig, UnifiedProduct, ValidationError};

/// Partitions products into valid ones and validation errors.
#[derive(Debug, Clone)]
pub struct Validator {
    min_description_len: usize,
}

impl Validator {
    pub fn new(min_description_len: usize) -> Self {
        Self { min_description_len }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.min_description_len)
    }

    /// Every rule the product breaks; empty when it is valid.
    pub fn check(&self, product: &UnifiedProduct) -> Vec<String> {
        let mut reasons = Vec::new();

        if product.sku.trim().is_empty() {
            reasons.push("Missing SKU".to_string());
        }
        if product.description.trim().chars().count() < self.min_description_len {
            reasons.push("Missing or too short description".to_string());
        }
        if product.quantity <= 0 {
            reasons.push(format!("Invalid quantity: {}", product.quantity));
        }
        if product.unit_price < Decimal::ZERO {
            reasons.push(format!("Invalid unit price: {}", product.unit_price));
        }

        reasons
    }

    /// Split products into `(valid, errors)`, keeping the relative order of
    /// the valid ones.
    pub fn validate(&self, products: Vec<UnifiedProduct>) -> (Vec<UnifiedProduct>, Vec<ValidationError>) {
        let mut valid = Vec::with_capacity(products.len());
        let mut errors = Vec::new();

        for product in products {
            let reasons = self.check(&product);
            if reasons.is_empty() {
                valid.push(product);
            } else {
                warn!("Rejected product '{}': {}", product.sku, reasons.join("; "));
                errors.push(ValidationError {
                    product: product.sku,
                    reasons,
                    source: product.source,
                });
            }
        }

        (valid, errors)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawRow, SourceKind};
    use crate::unify::Unifier;
    use pretty_assertions::assert_eq;

    fn unified(row: RawRow) -> UnifiedProduct {
        Unifier::new().unify_row(row, SourceKind::Excel)
    }

    #[test]
    fn test_every_violation_is_reported() {
        let product = unified(RawRow::new("", "Widget", -1).with_unit_price(Decimal::from(-5)));
        let reasons = Validator::default().check(&product);
        assert_eq!(
            reasons,
            vec![
                "Missing SKU".to_string(),
                "Invalid quantity: -1".to_string(),
                "Invalid unit price: -5".to_string(),
            ]
        );
    }

    #[test]
    fn test_zero_price_is_valid() {
        let product = unified(RawRow::new("A", "Widget", 1));
        assert!(Validator::default().check(&product).is_empty());
    }

    #[test]
    fn test_short_description_counts_characters() {
        let validator = Validator::default();
        assert_eq!(validator.check(&unified(RawRow::new("A", " ab ", 1))).len(), 1);
        // three Hebrew letters are three characters, not six bytes
        assert!(validator.check(&unified(RawRow::new("A", "כבל", 1))).is_empty());
    }

    #[test]
    fn test_partition_keeps_order() {
        let products = vec![
            unified(RawRow::new("A", "Alpha", 1)),
            unified(RawRow::new("B", "Beta", 0)),
            unified(RawRow::new("C", "Gamma", 2)),
        ];
        let (valid, errors) = Validator::default().validate(products);

        let skus: Vec<&str> = valid.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["A", "C"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].product, "B");
        assert_eq!(errors[0].source, SourceKind::Excel);
    }
}
