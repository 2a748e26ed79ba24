//! Header row detection.
//!
//! Spreadsheet exports often open with a title banner, a blank spacer or a
//! merged "Annexure" caption before the real column labels. Each of the first
//! `scan_rows` rows is scored by how many of its cells contain a header
//! keyword; the best-scoring row wins, the earliest one on ties.
//!
//! A weak match is not trusted: unless the best row scores strictly above
//! `min_score`, detection falls back to row 0.

use serde::{Deserialize, Serialize};

use crate::{cell::Cell, error::ConfigError};

const DEFAULT_SCAN_ROWS: usize = 10;
const DEFAULT_MIN_SCORE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDetection {
    pub keywords: Vec<String>,
    #[serde(default = "HeaderDetection::default_scan_rows")]
    pub scan_rows: usize,
    #[serde(default = "HeaderDetection::default_min_score")]
    pub min_score: usize,
}

impl HeaderDetection {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            scan_rows: DEFAULT_SCAN_ROWS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    pub const fn default_scan_rows() -> usize {
        DEFAULT_SCAN_ROWS
    }

    pub const fn default_min_score() -> usize {
        DEFAULT_MIN_SCORE
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::NoHeaderKeywords);
        }
        Ok(())
    }

    pub fn locator(&self) -> HeaderRowLocator {
        HeaderRowLocator {
            keywords: self
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            scan_rows: self.scan_rows.max(1),
            min_score: self.min_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch {
    pub row: usize,
    pub score: usize,
    /// True when a better-scoring later row was rejected as too weak.
    pub fell_back: bool,
}

#[derive(Debug, Clone)]
pub struct HeaderRowLocator {
    keywords: Vec<String>,
    scan_rows: usize,
    min_score: usize,
}

impl HeaderRowLocator {
    /// Number of cells in `row` containing at least one keyword.
    pub fn score_row(&self, row: &[Cell]) -> usize {
        row.iter()
            .filter(|cell| {
                let lowered = cell.as_text().to_lowercase();
                !lowered.trim().is_empty() && self.keywords.iter().any(|k| lowered.contains(k))
            })
            .count()
    }

    pub fn locate(&self, rows: &[Vec<Cell>]) -> HeaderMatch {
        let mut best_row = 0usize;
        let mut best_score = 0usize;
        for (idx, row) in rows.iter().take(self.scan_rows).enumerate() {
            let score = self.score_row(row);
            if score > best_score {
                best_score = score;
                best_row = idx;
            }
        }

        if best_row > 0 && best_score <= self.min_score {
            let first_score = rows.first().map(|row| self.score_row(row)).unwrap_or(0);
            return HeaderMatch {
                row: 0,
                score: first_score,
                fell_back: true,
            };
        }
        HeaderMatch {
            row: best_row,
            score: best_score,
            fell_back: false,
        }
    }
}
