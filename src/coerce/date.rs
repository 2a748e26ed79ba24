//! Date coercion across the conventions seen in spreadsheet exports.
//!
//! Resolution order:
//!
//! 1. blanks and sentinels (`pending`, `awaited`, `tbd`, ...) resolve to `None`;
//! 2. purely numeric values in `1..=60000` are spreadsheet serial day counts;
//! 3. an ordered list of explicit patterns, day-first before month-first;
//! 4. after stripping timezone suffixes, clock times and weekday names, a
//!    token-based parse that prefers day-before-month, then month-before-day.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;

use super::{SentinelScope, collapse_whitespace, is_sentinel};

const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 60000.0;
const SERIAL_PHANTOM_LEAP_DAY: f64 = 60.0;

/// Patterns tried in order. The flag marks four-digit-year patterns, which
/// must not accept a two-digit year.
const DATE_FORMATS: &[(&str, bool)] = &[
    ("%d.%m.%Y", true),
    ("%d.%m.%y", false),
    ("%d/%m/%Y", true),
    ("%d/%m/%y", false),
    ("%d-%m-%Y", true),
    ("%d-%m-%y", false),
    ("%Y-%m-%d", true),
    ("%Y/%m/%d", true),
    ("%d %b %Y", true),
    ("%d %B %Y", true),
    ("%b %d, %Y", true),
    ("%B %d, %Y", true),
    ("%m/%d/%Y", true),
    ("%m-%d-%Y", true),
    ("%Y.%m.%d", true),
    ("%d.%b.%Y", true),
    ("%d-%b-%Y", true),
    ("%d/%b/%Y", true),
    ("%Y%m%d", true),
    ("%d%m%Y", true),
];

const WEEKDAYS: &[&str] = &[
    "mon", "monday", "tue", "tues", "tuesday", "wed", "wednesday", "thu", "thur", "thurs",
    "thursday", "fri", "friday", "sat", "saturday", "sun", "sunday",
];

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static PURE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid serial regex"));
static TIMEZONE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:GMT|UTC)[+-]\d{2}:?\d{2}.*$|\s*\((?:[A-Za-z ]+)\)\s*$")
        .expect("valid timezone regex")
});
static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[T\s]+\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:\s*[ap]\.?m\.?)?(?:Z|[+-]\d{2}:?\d{2})?",
    )
    .expect("valid clock regex")
});
// Bare zone abbreviations are matched case-sensitively so lower-case words
// are never mistaken for zones.
static TRAILING_ZONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:Z|[A-Z]{2,5})$").expect("valid zone regex"));
static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid ordinal regex"));

/// How spreadsheet serial day counts map onto calendar dates.
///
/// Serial 60 names 1900-02-29, a day that never existed; both conventions
/// read it as 1900-02-28 in spreadsheet terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SerialConvention {
    /// Counts from 1899-12-30 for serials below 60, maps 60 onto serial 59's
    /// offset, and shifts serials from 61 on back one day. Every serial lands
    /// one day before the spreadsheet's own rendering (serial 1 is
    /// 1899-12-31). Matches the registers this tool was built for.
    #[default]
    Legacy,
    /// Agrees with how spreadsheet applications render serials
    /// (serial 1 is 1900-01-01, serial 61 is 1900-03-01).
    Spreadsheet,
}

impl SerialConvention {
    fn resolve(self, serial: f64) -> Option<NaiveDate> {
        if !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        let whole = serial.floor();
        // Offsets from the epoch as a spreadsheet renders them.
        let spreadsheet_days = if whole < SERIAL_PHANTOM_LEAP_DAY {
            whole + 1.0
        } else {
            whole
        };
        let days = match self {
            // TODO: decide with the register owners whether to switch the
            // default to `Spreadsheet` once existing extracts are re-run.
            SerialConvention::Legacy => spreadsheet_days - 1.0,
            SerialConvention::Spreadsheet => spreadsheet_days,
        };
        epoch.checked_add_signed(Duration::days(days as i64))
    }
}

/// Resolves a cell to a calendar date, or `None` when no reading succeeds.
pub fn coerce_date(cell: &Cell, convention: SerialConvention) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(value) => convention.resolve(*value),
        Cell::Text(raw) | Cell::DateLike(raw) => parse_date_str(raw, convention),
    }
}

fn parse_date_str(raw: &str, convention: SerialConvention) -> Option<NaiveDate> {
    let value = collapse_whitespace(raw);
    if value.is_empty() || is_sentinel(&value, SentinelScope::Date) {
        return None;
    }

    if PURE_NUMBER.is_match(&value) {
        if let Some(date) = value
            .parse::<f64>()
            .ok()
            .and_then(|serial| convention.resolve(serial))
        {
            return Some(date);
        }
    }

    if let Some(date) = parse_explicit(&value) {
        return Some(date);
    }

    let cleaned = strip_noise(&value);
    if cleaned != value
        && let Some(date) = parse_explicit(&cleaned)
    {
        return Some(date);
    }
    parse_tokens(&cleaned, true).or_else(|| parse_tokens(&cleaned, false))
}

fn parse_explicit(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|(fmt, four_digit_year)| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            .filter(|date| !four_digit_year || date.year() >= 1000)
    })
}

fn strip_noise(value: &str) -> String {
    let without_tz = TIMEZONE_SUFFIX.replace(value, "");
    let without_clock = CLOCK_TIME.replace_all(&without_tz, "");
    let without_zone = strip_trailing_zone(without_clock.trim());
    let without_ordinals = ORDINAL_SUFFIX.replace_all(without_zone, "$1");
    let spaced = without_ordinals.replace(',', " ");
    let mut tokens: Vec<&str> = spaced.split_whitespace().collect();
    if tokens.len() > 1 {
        let first = tokens[0].trim_end_matches('.').to_lowercase();
        if WEEKDAYS.contains(&first.as_str()) {
            tokens.remove(0);
        }
    }
    tokens.join(" ")
}

/// Drops a trailing zone abbreviation (`IST`, `GMT`, `Z`). A trailing
/// upper-case month name is left alone.
fn strip_trailing_zone(value: &str) -> &str {
    match TRAILING_ZONE.find(value) {
        Some(zone) if month_from_name(zone.as_str().trim()).is_none() => {
            value[..zone.start()].trim_end()
        }
        _ => value,
    }
}

enum Token {
    Number { value: u32, digits: usize },
    Month(u32),
}

fn month_from_name(name: &str) -> Option<u32> {
    if name.len() < 3 {
        return None;
    }
    let lowered = name.to_lowercase();
    MONTHS
        .iter()
        .position(|month| lowered.starts_with(month))
        .map(|idx| idx as u32 + 1)
}

fn tokenize(value: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    for part in value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
    {
        if part.chars().all(|c| c.is_ascii_digit()) {
            let number = part.parse().ok()?;
            tokens.push(Token::Number {
                value: number,
                digits: part.len(),
            });
        } else {
            tokens.push(Token::Month(month_from_name(part)?));
        }
    }
    Some(tokens)
}

fn expand_year(value: u32, digits: usize) -> Option<i32> {
    match digits {
        4 if value >= 1000 => Some(value as i32),
        1 | 2 if value < 70 => Some(2000 + value as i32),
        1 | 2 => Some(1900 + value as i32),
        _ => None,
    }
}

fn parse_tokens(value: &str, day_first: bool) -> Option<NaiveDate> {
    let tokens = tokenize(value)?;
    match tokens.as_slice() {
        [
            Token::Number { value: a, digits: 4 },
            Token::Number { value: m, .. },
            Token::Number { value: d, .. },
        ] => NaiveDate::from_ymd_opt(*a as i32, *m, *d),
        [
            Token::Number { value: a, .. },
            Token::Number { value: b, .. },
            Token::Number { value: y, digits },
        ] => {
            let year = expand_year(*y, *digits)?;
            let (day, month) = if day_first { (*a, *b) } else { (*b, *a) };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        [
            Token::Number { value: y, digits: 4 },
            Token::Month(m),
            Token::Number { value: d, .. },
        ] => NaiveDate::from_ymd_opt(expand_year(*y, 4)?, *m, *d),
        [
            Token::Number { value: d, .. },
            Token::Month(m),
            Token::Number { value: y, digits },
        ]
        | [
            Token::Month(m),
            Token::Number { value: d, .. },
            Token::Number { value: y, digits },
        ] => NaiveDate::from_ymd_opt(expand_year(*y, *digits)?, *m, *d),
        // Month and year only: the first of the month.
        [Token::Month(m), Token::Number { value: y, digits: 4 }] => {
            NaiveDate::from_ymd_opt(expand_year(*y, 4)?, *m, 1)
        }
        _ => None,
    }
}
