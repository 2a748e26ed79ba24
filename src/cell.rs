//! Untyped cell values and the per-source raw matrix.
//!
//! Readers hand the pipeline a [`RawTable`] per sheet or file. Cells arrive
//! already tagged with a [`Cell`] variant so each coercer can match on the
//! shape of the value instead of sniffing it at runtime.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    /// A value the reader already recognised as a date or timestamp, kept in
    /// its rendered form (for example `2023-07-28` or `2023-07-28 00:00:00`).
    DateLike(String),
}

impl Cell {
    /// Builds a cell from a delimited-text field. Blank fields become `Empty`.
    pub fn from_field(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) | Cell::DateLike(s) => s.trim().is_empty(),
            Cell::Number(f) => f.is_nan(),
        }
    }

    /// String form used by every text-oriented consumer. Whole numbers render
    /// without a fractional part so `1.0` from a spreadsheet reads as `1`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) | Cell::DateLike(s) => s.clone(),
            Cell::Number(f) => format_number(*f),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_field(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// One source's cell matrix, exactly as read. Rows may be ragged.
#[derive(Debug, Clone)]
pub struct RawTable {
    source: String,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    /// Convenience constructor for delimited text where every field is a string.
    pub fn from_text_rows<S: AsRef<str>>(source: impl Into<String>, rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|v| Cell::from_field(v.as_ref())).collect())
            .collect();
        Self::new(source, rows)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_become_empty_cells() {
        assert_eq!(Cell::from_field("   "), Cell::Empty);
        assert_eq!(Cell::from_field(" x "), Cell::Text(" x ".to_string()));
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(12.0).as_text(), "12");
        assert_eq!(Cell::Number(12.5).as_text(), "12.5");
        assert!(Cell::Number(f64::NAN).is_blank());
    }

    #[test]
    fn column_count_uses_widest_row() {
        let table = RawTable::from_text_rows("s", &[vec!["a"], vec!["a", "b", "c"]]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.source(), "s");
    }
}
