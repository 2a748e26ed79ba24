use crate::cell::Cell;

use super::{SentinelScope, collapse_whitespace, is_sentinel};

/// Cleans a text cell. Absent values and sentinel tokens become the empty
/// string; everything else is trimmed with internal whitespace collapsed.
///
/// Re-applying the function to its own output returns the same string.
pub fn normalize_text(cell: &Cell) -> String {
    if matches!(cell, Cell::Empty) {
        return String::new();
    }
    let collapsed = collapse_whitespace(&cell.as_text());
    if collapsed.is_empty() || is_sentinel(&collapsed, SentinelScope::Text) {
        return String::new();
    }
    collapsed
}
