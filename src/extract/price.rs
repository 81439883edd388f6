use regex::Regex;

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, Result};

/// Price candidate located in a line, before plausibility checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceMatch<'t> {
    /// Integer part as printed, possibly with thousands separators
    pub amount: &'t str,
    pub fraction: Option<&'t str>,
    pub suffix: Option<&'t str>,
}

/// Locates price-like text: optional currency marker, grouped digits, optional decimals
/// and an optional trailing suffix word from the configured vocabulary.
#[derive(Debug, Clone)]
pub struct PricePattern {
    regex: Regex,
}

impl PricePattern {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let markers = alternation(&config.currency_markers);
        let suffixes = alternation(&config.price_suffixes);

        let marker_part = if markers.is_empty() {
            String::new()
        } else {
            format!(r"(?:(?:{markers})\.?\s*[.:]?\s*)?")
        };
        let suffix_part = if suffixes.is_empty() {
            String::new()
        } else {
            format!(r"(?:\s*(?P<suffix>{suffixes})\b)?")
        };

        // Western (1,500,000) or Indian (15,00,000) grouping, else a bare digit run
        let pattern = format!(
            r"(?i){marker_part}(?P<amount>\d{{1,3}}(?:,\d{{3}})+\b|\d{{1,2}}(?:,\d{{2}})*,\d{{3}}\b|\d+)(?:\.(?P<fraction>\d{{1,2}}))?{suffix_part}"
        );
        let regex = Regex::new(&pattern)
            .map_err(|e| ExtractError::Config(format!("Invalid price pattern: {e}")))?;
        Ok(Self { regex })
    }

    /// First price-like candidate in `text`, if any.
    pub fn find<'t>(&self, text: &'t str) -> Option<PriceMatch<'t>> {
        let caps = self.regex.captures(text)?;
        Some(PriceMatch {
            amount: caps.name("amount")?.as_str(),
            fraction: caps.name("fraction").map(|m| m.as_str()),
            suffix: caps.name("suffix").map(|m| m.as_str()),
        })
    }
}

/// Formats a price candidate, or rejects it when it is below `threshold` with no suffix.
///
/// `normalize_price("1,500", None, Some("onwards"), "₹", 50)` gives `"₹1,500 Onwards"`.
pub fn normalize_price(
    amount: &str,
    fraction: Option<&str>,
    suffix: Option<&str>,
    currency_symbol: &str,
    threshold: u64,
) -> Option<String> {
    let digits: String = amount.chars().filter(|c| c.is_ascii_digit()).collect();
    let value: u64 = digits.parse().ok()?;

    let suffix = suffix.map(str::trim).filter(|s| !s.is_empty());
    if value < threshold && suffix.is_none() {
        return None;
    }

    let mut out = String::from(currency_symbol);
    out.push_str(&group_thousands(value));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(&format!("{fraction:0<2}"));
    }
    if let Some(suffix) = suffix {
        out.push(' ');
        out.push_str(&title_case(suffix));
    }
    Some(out)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn title_case(words: &str) -> String {
    words
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Escaped regex alternation; multi-word entries match any run of whitespace.
fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| {
            w.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|")
}
