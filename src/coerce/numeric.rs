//! Numeric coercion for amounts, percentages and counts.
//!
//! Monetary columns are expressed in lakh. A value written in crore is scaled
//! by 100 so that every amount in the consolidated table shares one unit.

use std::sync::LazyLock;

use regex::Regex;

use crate::cell::Cell;

use super::{SentinelScope, collapse_whitespace, is_sentinel};

const LAKH_PER_CRORE: f64 = 100.0;

static CURRENCY_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₹$€£¥]").expect("valid currency symbol regex"));
static CURRENCY_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:rs|inr|usd|eur|gbp)\b\.?").expect("valid currency token regex")
});
static LAKH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*lakhs?\s*").expect("valid lakh regex"));
static CRORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*crores?\s*").expect("valid crore regex"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.?\d+").expect("valid number regex"));

/// Parses a cell believed to hold a number. Returns `None` for blanks,
/// sentinels and anything with no recoverable digits.
pub fn coerce_numeric(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(value) => value.is_finite().then_some(*value),
        Cell::Text(raw) | Cell::DateLike(raw) => parse_numeric_str(raw),
    }
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() || is_sentinel(&collapsed, SentinelScope::Numeric) {
        return None;
    }

    let stripped = CURRENCY_SYMBOLS.replace_all(&collapsed, "");
    let stripped = CURRENCY_TOKENS.replace_all(&stripped, "");
    let mut value = stripped.trim().trim_end_matches('%').trim().replace(',', "");

    let lowered = value.to_lowercase();
    let mut scale = 1.0;
    if lowered.contains("lakh") {
        value = LAKH.replace_all(&value, "").trim().to_string();
    } else if lowered.contains("crore") {
        value = CRORE.replace_all(&value, "").trim().to_string();
        scale = LAKH_PER_CRORE;
    }

    parse_plain(&value).map(|parsed| parsed * scale)
}

fn parse_plain(value: &str) -> Option<f64> {
    let value = match value
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => format!("-{}", inner.trim()),
        None => value.to_string(),
    };
    // `f64::from_str` also accepts "inf" and "NaN"; those are not amounts.
    if let Ok(parsed) = value.parse::<f64>()
        && parsed.is_finite()
    {
        return Some(parsed);
    }
    FIRST_NUMBER
        .find(&value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
