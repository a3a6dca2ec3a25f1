//! Product-like phrases and technical specifications in running text.

use super::patterns::{
    PHRASE_CATEGORY, PHRASE_COMPONENT, PHRASE_MULTIPLIED, PHRASE_RACK_SERVER, SPEC_PATTERNS,
};
use super::{ExtractionMatch, FieldExtractor};

/// Phrases shorter than this are noise.
const MIN_PHRASE_LEN: usize = 10;

/// Product phrase extractor ("2U server with ...", "2x R750 ...").
pub struct ProductPhraseExtractor;

impl ProductPhraseExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductPhraseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ProductPhraseExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for pattern in [
            &*PHRASE_RACK_SERVER,
            &*PHRASE_CATEGORY,
            &*PHRASE_MULTIPLIED,
            &*PHRASE_COMPONENT,
        ] {
            for m in pattern.find_iter(text) {
                let phrase = m.as_str().trim();
                if phrase.chars().count() <= MIN_PHRASE_LEN
                    || results.iter().any(|r| r.value == phrase)
                {
                    continue;
                }
                results.push(
                    ExtractionMatch::new(phrase.to_string(), 0.5, m.as_str())
                        .with_position(m.start(), m.end()),
                );
            }
        }

        results
    }
}

/// Technical specification extractor (RAM, disks, CPU, link speed).
pub struct SpecExtractor;

impl SpecExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpecExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SpecExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for pattern in SPEC_PATTERNS.iter() {
            for m in pattern.find_iter(text) {
                let spec = m.as_str().trim();
                if spec.is_empty() || results.iter().any(|r| r.value.eq_ignore_ascii_case(spec)) {
                    continue;
                }
                results.push(
                    ExtractionMatch::new(spec.to_string(), 0.6, m.as_str())
                        .with_position(m.start(), m.end()),
                );
            }
        }

        results.sort_by_key(|r| r.position);
        results
    }
}
