//! Keyword-proximity number extraction over raw document text.
//!
//! No language model is involved: for a keyword pattern we look at a window of
//! characters around every occurrence and pick the first plausible number.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

/// Optional currency/paren prefix, digit groups with separators, optional
/// decimals, optional percent/paren suffix.
static NUMBER_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([$£€(]?)\s*([0-9,]+\.?[0-9]*)\s*[%)]?").ok());

/// Integers in this range without a currency symbol are read as calendar years.
const YEAR_RANGE: std::ops::RangeInclusive<f64> = 1990.0..=2030.0;

pub const DEFAULT_CONTEXT_WINDOW: usize = 200;
pub const DEFAULT_SCAN_CHAR_BUDGET: usize = 100_000;

/// Bounds applied to every scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Characters inspected on either side of a keyword match
    pub context_window: usize,
    /// Document prefix (in characters) that is scanned at all
    pub max_chars: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            max_chars: DEFAULT_SCAN_CHAR_BUDGET,
        }
    }
}

pub struct NumericExtractor {
    text: String,
    context_window: usize,
    keywords: Mutex<HashMap<String, Option<Regex>>>,
}

impl NumericExtractor {
    pub fn new(raw_text: &str, settings: ScanSettings) -> Self {
        let truncated: String = raw_text.chars().take(settings.max_chars).collect();
        Self {
            text: truncated.to_lowercase(),
            context_window: settings.context_window,
            keywords: Mutex::new(HashMap::new()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Extract the first plausible number near `pattern`, using the configured window.
    pub fn extract_number(&self, pattern: &str) -> Option<f64> {
        self.extract_number_within(pattern, self.context_window)
    }

    /// Extract the first plausible number within `context_window` characters of
    /// any occurrence of `pattern`. Occurrences are visited in text order.
    pub fn extract_number_within(&self, pattern: &str, context_window: usize) -> Option<f64> {
        let keyword = self.keyword(pattern)?;

        let found = keyword.find_iter(&self.text).find_map(|m| {
            let (lo, hi) = char_window(&self.text, m.start(), m.end(), context_window);
            first_number_in(&self.text[lo..hi])
        });
        found
    }

    /// Compiled keyword pattern, cached per extractor. Invalid patterns are
    /// cached too so the warning is logged once.
    fn keyword(&self, pattern: &str) -> Option<Regex> {
        let Ok(mut cache) = self.keywords.lock() else {
            return compile_keyword(pattern);
        };
        let keyword = cache
            .entry(pattern.to_string())
            .or_insert_with(|| compile_keyword(pattern))
            .clone();
        keyword
    }

    #[cfg(test)]
    fn cached_patterns(&self) -> usize {
        self.keywords.lock().map_or(0, |cache| cache.len())
    }
}

fn compile_keyword(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Invalid keyword pattern {:?}: {}", pattern, e);
            None
        }
    }
}

fn first_number_in(context: &str) -> Option<f64> {
    let token = NUMBER_TOKEN.as_ref()?;
    token.captures_iter(context).find_map(|caps| {
        let prefix = caps.get(1).map_or("", |p| p.as_str());
        let digits = caps.get(2)?.as_str().replace(',', "");
        let value = digits.parse::<f64>().ok().filter(|v| v.is_finite())?;

        let has_currency = matches!(prefix, "$" | "£" | "€");
        if YEAR_RANGE.contains(&value) && value.fract() == 0.0 && !has_currency {
            return None;
        }

        Some(value)
    })
}

/// Byte bounds of `window` characters on either side of `[start, end)`.
fn char_window(text: &str, start: usize, end: usize, window: usize) -> (usize, usize) {
    let lo = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map_or(start, |(i, _)| i);
    let hi = text[end..]
        .char_indices()
        .nth(window)
        .map_or(text.len(), |(i, _)| end + i);
    (lo, hi)
}
