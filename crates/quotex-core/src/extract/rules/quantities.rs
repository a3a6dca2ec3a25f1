//! Quantity mentions in running text ("2x Foo", "4 ports", "3 יחידות").

use regex::Regex;
use serde::Serialize;

use super::patterns::{QTY_ITEMS, QTY_PORTS, QTY_PORTS_HE, QTY_STORAGE, QTY_UNITS, QTY_UNITS_HE};
use super::{ExtractionMatch, FieldExtractor};

/// A quantity mentioned in free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityMention {
    pub quantity: i64,
    /// What is being counted ("ports", "units", "items", "storage").
    pub unit: String,
    /// The counted item, for `Nx ITEM` mentions.
    pub item: Option<String>,
}

/// Quantity mention extractor.
pub struct QuantityExtractor;

impl QuantityExtractor {
    pub fn new() -> Self {
        Self
    }

    fn patterns() -> [(&'static Regex, &'static str); 6] {
        [
            (&*QTY_PORTS_HE, "ports"),
            (&*QTY_PORTS, "ports"),
            (&*QTY_STORAGE, "storage"),
            (&*QTY_ITEMS, "items"),
            (&*QTY_UNITS_HE, "units"),
            (&*QTY_UNITS, "units"),
        ]
    }
}

impl Default for QuantityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for QuantityExtractor {
    type Output = ExtractionMatch<QuantityMention>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for (pattern, unit) in Self::patterns() {
            for caps in pattern.captures_iter(text) {
                let (Some(full), Ok(quantity)) = (caps.get(0), caps[1].parse::<i64>()) else {
                    continue;
                };
                let mention = QuantityMention {
                    quantity,
                    unit: unit.to_string(),
                    item: caps.get(2).map(|m| m.as_str().to_string()),
                };
                results.push(
                    ExtractionMatch::new(mention, 0.6, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quantity_mentions() {
        let text = "Need 2x R750 servers with 4 ports each, and 3 יחידות of switches";
        let found = QuantityExtractor::new().extract_all(text);

        let summary: Vec<(i64, &str)> = found
            .iter()
            .map(|m| (m.value.quantity, m.value.unit.as_str()))
            .collect();
        assert_eq!(summary, vec![(4, "ports"), (2, "items"), (3, "units")]);

        let items = found.iter().find(|m| m.value.unit == "items").unwrap();
        assert_eq!(items.value.item.as_deref(), Some("R750"));
    }

    #[test]
    fn test_no_mentions() {
        assert!(QuantityExtractor::new().extract("hello there").is_none());
    }
}
