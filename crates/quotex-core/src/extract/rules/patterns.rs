//! Common regex patterns for quote line extraction (English and Hebrew).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Currency marks stripped from otherwise numeric cells
    pub static ref CURRENCY_MARK: Regex = Regex::new(
        r#"(?i)(?:USD|ILS|NIS|EUR|ש"ח|ש״ח|[$₪€])"#
    ).unwrap();

    // A cell that is nothing but a number once currency and whitespace are gone
    pub static ref BARE_AMOUNT: Regex = Regex::new(
        r"^-?\d[\d.,]*$"
    ).unwrap();

    // Prices in running text
    pub static ref PRICE_CURRENCY_PREFIX: Regex = Regex::new(
        r"([$₪€])\s?(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)"
    ).unwrap();

    pub static ref PRICE_CURRENCY_SUFFIX: Regex = Regex::new(
        r#"(?i)(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)\s?(USD|ILS|NIS|EUR|ש"ח|ש״ח|דולר|שקל|[$₪€])"#
    ).unwrap();

    pub static ref PRICE_LABELED: Regex = Regex::new(
        r#"(?i)(?:unit\s+price|price|cost|total|מחיר|עלות|סה"כ)\s*[:=\-]?\s*[$₪€]?\s?(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)"#
    ).unwrap();

    // Quantity mentions
    pub static ref QTY_PORTS_HE: Regex = Regex::new(
        r"(\d+)\s*פורטים?"
    ).unwrap();

    pub static ref QTY_PORTS: Regex = Regex::new(
        r"(?i)(\d+)\s+ports?\b"
    ).unwrap();

    pub static ref QTY_STORAGE: Regex = Regex::new(
        r"(?i)(\d+)\s*[GMT]B\b"
    ).unwrap();

    pub static ref QTY_ITEMS: Regex = Regex::new(
        r"(?i)(\d+)x\s+(\w+)"
    ).unwrap();

    pub static ref QTY_UNITS_HE: Regex = Regex::new(
        r"(\d+)\s*יחידות?"
    ).unwrap();

    pub static ref QTY_UNITS: Regex = Regex::new(
        r"(?i)(\d+)\s+(?:units?|pcs|pieces)\b"
    ).unwrap();

    // Product-like phrases
    pub static ref PHRASE_RACK_SERVER: Regex = Regex::new(
        r"(?im)\d+U?\s+server[^\n]{10,200}"
    ).unwrap();

    pub static ref PHRASE_CATEGORY: Regex = Regex::new(
        r"(?im)\b(?:server|storage|network|firewall|gpu)[^\n]{10,150}"
    ).unwrap();

    pub static ref PHRASE_MULTIPLIED: Regex = Regex::new(
        r"(?m)\d+x\s+[A-Z0-9][A-Za-z0-9\-]*[^\n]{5,100}"
    ).unwrap();

    pub static ref PHRASE_COMPONENT: Regex = Regex::new(
        r"(?im)\b(?:CPU|SSD|HDD|RAM)\b[^\n]{5,100}"
    ).unwrap();

    // Technical specifications
    pub static ref SPEC_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\d+\s*[GM]B?\s+(?:RAM|Memory|DDR\d?)").unwrap(),
        Regex::new(r"(?i)\d+\s*[GT]B?\s+(?:SSD|HDD|Storage|NVME)").unwrap(),
        Regex::new(r"(?i)\d+x\s+\d+(?:\.\d+)?\s*[GM]Hz").unwrap(),
        Regex::new(r"(?i)\b\d+U\s+server").unwrap(),
        Regex::new(r"(?i)\b(?:CPU|processor|Xeon|Intel|AMD)\b").unwrap(),
        Regex::new(r"(?i)\b(?:gigabit|10G|25G|40G|100G)\b").unwrap(),
    ];

    // Text table separators: tab, pipe, or a run of two or more spaces
    pub static ref MULTI_SPACE: Regex = Regex::new(
        r" {2,}"
    ).unwrap();

    pub static ref CELL_SEPARATOR: Regex = Regex::new(
        r"\t+| *\| *| {2,}"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_amount() {
        assert!(BARE_AMOUNT.is_match("1,250.00"));
        assert!(BARE_AMOUNT.is_match("-5"));
        assert!(!BARE_AMOUNT.is_match("12a"));
        assert!(!BARE_AMOUNT.is_match(".5"));
    }

    #[test]
    fn test_price_patterns() {
        let caps = PRICE_CURRENCY_PREFIX.captures("cost is $1,200.50 each").unwrap();
        assert_eq!(&caps[2], "1,200.50");

        let caps = PRICE_CURRENCY_SUFFIX.captures("המחיר 480 ש\"ח").unwrap();
        assert_eq!(&caps[1], "480");

        let caps = PRICE_LABELED.captures("Unit price: 99.90").unwrap();
        assert_eq!(&caps[1], "99.90");
    }

    #[test]
    fn test_cell_separator() {
        let cells: Vec<&str> = CELL_SEPARATOR.split("A1 | Widget |  2").collect();
        assert_eq!(cells, vec!["A1", "Widget", "2"]);
    }
}
