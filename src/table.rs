//! Aligned plain-text tables for terminal reports.

use std::fmt::{self, Write as _};

use crate::coerce::collapse_whitespace;

const COLUMN_GAP: &str = "  ";
const MIN_RULE_WIDTH: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Adds a row. Cells past the header width are ignored, missing cells
    /// render blank.
    pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = self
            .headers
            .iter()
            .map(|h| cell_width(h).max(MIN_RULE_WIDTH))
            .collect::<Vec<_>>();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell_width(cell));
            }
        }
        widths
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
        write_line(f, &self.headers, &widths)?;
        write_line(f, &rule, &widths)?;
        for row in &self.rows {
            write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let mut line = String::new();
    for (idx, &width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str(COLUMN_GAP);
        }
        let cell = cells.get(idx).map(|c| single_line(c)).unwrap_or_default();
        let _ = write!(line, "{cell:<width$}");
    }
    writeln!(f, "{}", line.trim_end())
}

// Header labels often carry embedded line breaks.
fn single_line(value: &str) -> String {
    collapse_whitespace(value)
}

fn cell_width(value: &str) -> usize {
    single_line(value).chars().count()
}
