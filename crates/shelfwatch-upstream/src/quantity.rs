//! Stock-quantity disambiguation from free-text availability descriptions.
//!
//! Upstream availability text is written for humans ("There are 145 in
//! stock", "Price valid until 2026"), so a bare number scan produces false
//! positives. Contextual patterns anchored to stock phrasing are tried
//! first; the unanchored fallback only answers when exactly one plausible
//! candidate remains.

use std::sync::OnceLock;

use regex::Regex;

/// Inclusive range of 4-digit numbers treated as calendar years, never
/// stock counts, by the unanchored fallback.
const YEAR_RANGE: std::ops::RangeInclusive<u32> = 2000..=2100;

fn context_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)there\s+are\s+(\d+)",
            r"(?i)(\d+)\s+in\s+stock",
            r"(?i)(\d+)\s+available",
            r"(?i)(\d+)\s+left",
            r"(?i)in\s+stock:\s*(\d+)",
            r"(?i)stock:\s*(\d+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid quantity pattern"))
        .collect()
    })
}

fn token_pattern() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| Regex::new(r"\b\d+\b").expect("valid token pattern"))
}

/// Extracts a stock count from free text.
///
/// Contextual patterns are tried in order and the first match wins. When
/// none match, all standalone integer tokens are collected, calendar years
/// discarded, and the survivor returned only if it is unique — ambiguous
/// text yields `None` rather than a guess.
#[must_use]
pub fn resolve_quantity(text: Option<&str>) -> Option<u32> {
    let text = text?;

    for pattern in context_patterns() {
        if let Some(qty) = pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return Some(qty);
        }
    }

    let candidates: Vec<u32> = token_pattern()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| !YEAR_RANGE.contains(n))
        .collect();

    match candidates.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}
