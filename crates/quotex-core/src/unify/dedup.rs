//! Cross-source identity resolution.
//!
//! Products are folded in input order into an accumulator keyed by the
//! normalized SKU. The first occurrence becomes the running record and later
//! ones merge into it, so the outcome depends on input order when
//! confidences tie.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::UnifiedProduct;

/// Identity key: trimmed, upper-cased SKU without spaces, hyphens or
/// underscores.
pub fn identity_key(sku: &str) -> String {
    sku.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Merge products sharing an identity. Output keeps first-appearance order.
pub fn deduplicate(products: Vec<UnifiedProduct>) -> Vec<UnifiedProduct> {
    let input = products.len();

    let (merged, _) = products.into_iter().fold(
        (Vec::<UnifiedProduct>::new(), HashMap::<String, usize>::new()),
        |(mut merged, mut index), product| {
            let key = identity_key(&product.sku);
            match index.get(&key) {
                Some(&i) => merge_into(&mut merged[i], product),
                None => {
                    index.insert(key, merged.len());
                    merged.push(product);
                }
            }
            (merged, index)
        },
    );

    debug!(input, output = merged.len(), "Deduplicated products");
    merged
}

/// Merge `incoming` into the running record.
pub fn merge_into(running: &mut UnifiedProduct, incoming: UnifiedProduct) {
    running.quantity = running.quantity.saturating_add(incoming.quantity);

    let replace_price = incoming.unit_price > Decimal::ZERO
        && (running.unit_price.is_zero() || incoming.confidence >= running.confidence);
    if replace_price {
        running.unit_price = incoming.unit_price;
    }

    if running.unit_price > Decimal::ZERO {
        running.total_price = Some(running.unit_price * Decimal::from(running.quantity));
    } else if let Some(total) = incoming.total_price.filter(|t| !t.is_zero()) {
        running.total_price = Some(total);
        if running.quantity > 0 {
            running.unit_price = total / Decimal::from(running.quantity);
        }
    }

    for source in incoming.metadata.sources {
        if !running.metadata.sources.contains(&source) {
            running.metadata.sources.push(source);
        }
    }
    if running.metadata.category.is_none() {
        running.metadata.category = incoming.metadata.category;
    }
    if running.source_file.is_none() {
        running.source_file = incoming.source_file;
    }
}
