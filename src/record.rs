//! Typed field values and canonical records.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    cell::{Cell, format_number},
    coerce::{SerialConvention, coerce_date, coerce_numeric, normalize_text},
    schema::ValueKind,
};

pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// A coerced value. Text is never null; an absent text value is the empty
/// string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    Date(Option<NaiveDate>),
}

impl FieldValue {
    pub fn null_for(kind: ValueKind) -> Self {
        match kind {
            kind if kind.is_textual() => FieldValue::Text(String::new()),
            ValueKind::Numeric => FieldValue::Number(None),
            _ => FieldValue::Date(None),
        }
    }

    pub fn coerce(cell: &Cell, kind: ValueKind, serials: SerialConvention) -> Self {
        match kind {
            kind if kind.is_textual() => FieldValue::Text(normalize_text(cell)),
            ValueKind::Numeric => FieldValue::Number(coerce_numeric(cell)),
            _ => FieldValue::Date(coerce_date(cell, serials)),
        }
    }

    /// Non-null, and for text, non-empty.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(value) => !value.is_empty(),
            FieldValue::Number(value) => value.is_some(),
            FieldValue::Date(value) => value.is_some(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => *value,
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(value) => *value,
            _ => None,
        }
    }

    /// Output form: dates as `YYYY-MM-DD`, whole numbers without a fraction,
    /// nulls as the empty string.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Number(Some(value)) => format_number(*value),
            FieldValue::Date(Some(date)) => date.format(DATE_OUTPUT_FORMAT).to_string(),
            FieldValue::Number(None) | FieldValue::Date(None) => String::new(),
        }
    }
}

/// One retained row, keyed by canonical field name. Only carries the fields
/// its own source exposed until the union merge fills in the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    source: String,
    values: BTreeMap<String, FieldValue>,
}

impl CanonicalRecord {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_values_per_kind() {
        assert!(ValueKind::Identifier.is_textual() && !ValueKind::Date.is_textual());
        assert_eq!(
            FieldValue::null_for(ValueKind::Identifier),
            FieldValue::Text(String::new())
        );
        assert!(!FieldValue::null_for(ValueKind::Numeric).is_present());
        assert_eq!(FieldValue::null_for(ValueKind::Date).render(), "");
    }

    #[test]
    fn coercion_follows_the_declared_kind() {
        let coerce = |cell: Cell, kind| FieldValue::coerce(&cell, kind, SerialConvention::Legacy);
        let date = coerce(Cell::from_field("28.07.2023"), ValueKind::Date);
        assert_eq!(date.render(), "2023-07-28");

        let text = coerce(Cell::from_field(" N/A "), ValueKind::Text);
        assert_eq!(text, FieldValue::Text(String::new()));

        let id = coerce(Cell::Number(7.0), ValueKind::Identifier);
        assert_eq!(id.render(), "7");

        let amount = coerce(Cell::from_field("2 crore"), ValueKind::Numeric);
        assert_eq!(amount.as_number(), Some(200.0));
        assert_eq!(amount.render(), "200");
    }

    #[test]
    fn record_tracks_source_and_fields() {
        let mut record = CanonicalRecord::new("sheet_a");
        record.insert("scheme_name", FieldValue::Text("Fencing".into()));
        assert_eq!(record.source(), "sheet_a");
        assert!(record.contains("scheme_name"));
        assert_eq!(record.get("scheme_name").and_then(FieldValue::as_text), Some("Fencing"));
        assert_eq!(record.len(), 1);
    }
}
