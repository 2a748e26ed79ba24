//! Per-cell value coercion.
//!
//! Each coercer takes a [`Cell`](crate::cell::Cell) and resolves it to a typed
//! value or to "absent". None of them fail: a value that cannot be read as its
//! declared kind is data, not an error.
//!
//! The three coercers share a sentinel vocabulary of tokens that mean "no
//! data" even though the cell is not blank. The vocabularies nest: every text
//! sentinel is also a numeric sentinel, and every numeric sentinel is also a
//! date sentinel.

pub mod date;
pub mod numeric;
pub mod text;

use itertools::Itertools;

pub use date::{SerialConvention, coerce_date};
pub use numeric::coerce_numeric;
pub use text::normalize_text;

const TEXT_SENTINELS: &[&str] = &[
    "nil",
    "na",
    "n/a",
    "n.a.",
    "nan",
    "-",
    "--",
    "---",
    "null",
    "none",
    "not applicable",
];

const NUMERIC_SENTINELS: &[&str] = &["pending", "xxx"];

const DATE_SENTINELS: &[&str] = &[
    "awaited",
    "under process",
    "to be",
    "tbd",
    "not available",
    "0",
    "0.0",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SentinelScope {
    Text,
    Numeric,
    Date,
}

/// Checks an already trimmed, whitespace-collapsed token.
pub(crate) fn is_sentinel(token: &str, scope: SentinelScope) -> bool {
    let lowered = token.to_lowercase();
    let lowered = lowered.as_str();
    if TEXT_SENTINELS.contains(&lowered) {
        return true;
    }
    match scope {
        SentinelScope::Text => false,
        SentinelScope::Numeric => NUMERIC_SENTINELS.contains(&lowered),
        SentinelScope::Date => {
            NUMERIC_SENTINELS.contains(&lowered) || DATE_SENTINELS.contains(&lowered)
        }
    }
}

/// Trims and collapses every whitespace run (including newlines) to one space.
pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabularies_nest() {
        for token in TEXT_SENTINELS {
            assert!(is_sentinel(token, SentinelScope::Numeric), "{token}");
            assert!(is_sentinel(token, SentinelScope::Date), "{token}");
        }
        assert!(is_sentinel("Pending", SentinelScope::Date));
        assert!(!is_sentinel("pending", SentinelScope::Text));
        assert!(!is_sentinel("tbd", SentinelScope::Numeric));
    }

    #[test]
    fn collapse_whitespace_folds_newlines() {
        assert_eq!(collapse_whitespace("  Sd Amount\n(In  Lakh) "), "Sd Amount (In Lakh)");
    }
}
