//! Amount and quantity parsing, plus price mentions in running text.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use super::patterns::{
    BARE_AMOUNT, CURRENCY_MARK, PRICE_CURRENCY_PREFIX, PRICE_CURRENCY_SUFFIX, PRICE_LABELED,
};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;
use crate::models::CellValue;

/// A price mentioned in free text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMention {
    pub amount: Decimal,
    /// ISO code when the mention carried a currency mark.
    pub currency: Option<String>,
}

/// Price mention extractor.
pub struct PriceExtractor;

impl PriceExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PriceExtractor {
    type Output = ExtractionMatch<PriceMention>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        let mut push = |m: regex::Match, amount: &str, currency: Option<&str>, confidence: f32| {
            let overlaps = results.iter().any(|r| {
                r.position
                    .is_some_and(|(start, end)| m.start() < end && start < m.end())
            });
            if overlaps {
                return;
            }
            if let Some(amount) = parse_amount(amount) {
                let mention = PriceMention {
                    amount,
                    currency: currency.and_then(currency_code).map(str::to_string),
                };
                results.push(
                    ExtractionMatch::new(mention, confidence, m.as_str())
                        .with_position(m.start(), m.end()),
                );
            }
        };

        for caps in PRICE_LABELED.captures_iter(text) {
            if let Some(m) = caps.get(0) {
                push(m, &caps[1], None, 0.75);
            }
        }
        for caps in PRICE_CURRENCY_PREFIX.captures_iter(text) {
            if let Some(m) = caps.get(0) {
                push(m, &caps[2], Some(&caps[1]), 0.7);
            }
        }
        for caps in PRICE_CURRENCY_SUFFIX.captures_iter(text) {
            if let Some(m) = caps.get(0) {
                push(m, &caps[1], Some(&caps[2]), 0.7);
            }
        }

        results.sort_by_key(|r| r.position);
        results
    }
}

/// Map a currency mark to its ISO code.
fn currency_code(mark: &str) -> Option<&'static str> {
    match mark.to_uppercase().as_str() {
        "$" | "USD" | "דולר" => Some("USD"),
        "₪" | "ILS" | "NIS" | "ש\"ח" | "ש״ח" | "שקל" => Some("ILS"),
        "€" | "EUR" => Some("EUR"),
        _ => None,
    }
}

/// Parse a cell or token that holds nothing but an amount
/// (e.g. "1,250.00", "₪ 480", "$99", "1.234,56").
///
/// Returns `None` for anything with non-numeric content left over once
/// currency marks and whitespace are removed, so "Widget 2000" is not an
/// amount.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let stripped = CURRENCY_MARK.replace_all(s, "");
    let cleaned: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

    if !BARE_AMOUNT.is_match(&cleaned) {
        return None;
    }

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let value = Decimal::from_str(&normalize_separators(digits)?).ok()?;
    Some(if negative { -value } else { value })
}

/// Resolve thousands/decimal separators into a plain `1234.56` form.
fn normalize_separators(s: &str) -> Option<String> {
    let comma = s.rfind(',');
    let dot = s.rfind('.');

    match (comma, dot) {
        (None, None) => Some(s.to_string()),
        // Both present: whichever comes last is the decimal separator
        (Some(c), Some(d)) if c > d => Some(s.replace('.', "").replace(',', ".")),
        (Some(_), Some(_)) => Some(s.replace(',', "")),
        (Some(_), None) => resolve_single(s, ','),
        (None, Some(_)) => resolve_single(s, '.'),
    }
}

fn resolve_single(s: &str, sep: char) -> Option<String> {
    let groups: Vec<&str> = s.split(sep).collect();
    let grouped_thousands = groups.len() > 1
        && !groups[0].is_empty()
        && groups[0].len() <= 3
        && groups[1..].iter().all(|g| g.len() == 3);

    if groups.len() > 2 {
        // "1,234,567" / "1.234.567"
        return grouped_thousands.then(|| groups.concat());
    }

    match sep {
        // A single comma followed by exactly three digits is a thousands mark
        ',' if grouped_thousands => Some(groups.concat()),
        ',' => Some(s.replace(',', ".")),
        _ => Some(s.to_string()),
    }
}

/// Parse a quantity cell.
///
/// Empty or unparsable cells default to 1. Fractions are truncated.
/// Non-positive values are returned as-is for validation to flag.
pub fn parse_quantity(value: &CellValue) -> Result<i64, ExtractionError> {
    let number = match value {
        CellValue::Empty => return Ok(1),
        CellValue::Number(v) => *v,
        CellValue::Text(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            match cleaned.parse::<f64>() {
                Ok(v) => v,
                Err(_) => return Ok(1),
            }
        }
    };

    if number.is_nan() {
        return Ok(1);
    }

    let truncated = number.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return Err(ExtractionError::Parse {
            field: "quantity".to_string(),
            value: value.as_text(),
        });
    }

    Ok(truncated as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250.00"), Some(dec("1250.00")));
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("12,5"), Some(dec("12.5")));
        assert_eq!(parse_amount("1,250"), Some(dec("1250")));
        assert_eq!(parse_amount("1,234,567"), Some(dec("1234567")));
        assert_eq!(parse_amount("₪ 480"), Some(dec("480")));
        assert_eq!(parse_amount("$99.90"), Some(dec("99.90")));
        assert_eq!(parse_amount("250 USD"), Some(dec("250")));
        assert_eq!(parse_amount("-5"), Some(dec("-5")));
    }

    #[test]
    fn test_parse_amount_rejects_text() {
        assert_eq!(parse_amount("Widget 2000"), None);
        assert_eq!(parse_amount("Total: 9999"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&CellValue::Empty).unwrap(), 1);
        assert_eq!(parse_quantity(&CellValue::Number(3.9)).unwrap(), 3);
        assert_eq!(parse_quantity(&"1,200".into()).unwrap(), 1200);
        assert_eq!(parse_quantity(&"n/a".into()).unwrap(), 1);
        assert_eq!(parse_quantity(&"-1".into()).unwrap(), -1);
        assert!(parse_quantity(&CellValue::Number(1e30)).is_err());
    }

    #[test]
    fn test_price_mentions() {
        let text = "Server price: 12,500 and license $300, delivery 450 ש\"ח";
        let prices = PriceExtractor::new().extract_all(text);

        let amounts: Vec<Decimal> = prices.iter().map(|p| p.value.amount).collect();
        assert_eq!(amounts, vec![dec("12500"), dec("300"), dec("450")]);
        assert_eq!(prices[0].value.currency, None);
        assert_eq!(prices[1].value.currency.as_deref(), Some("USD"));
        assert_eq!(prices[2].value.currency.as_deref(), Some("ILS"));
    }
}
