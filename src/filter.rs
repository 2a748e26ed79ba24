//! Row retention by data sufficiency.
//!
//! A row is kept when at least one of the configured importance fields carries
//! a value. Rows that only fill administrative columns (a serial number, a
//! budget head) are dropped.

use crate::{error::ConfigError, record::CanonicalRecord, schema::CanonicalSchema};

#[derive(Debug, Clone)]
pub struct RowValidityFilter {
    importance: Vec<String>,
}

impl RowValidityFilter {
    pub fn new<S: AsRef<str>>(
        importance: &[S],
        schema: &CanonicalSchema,
    ) -> Result<Self, ConfigError> {
        let importance = importance
            .iter()
            .map(|field| {
                let field = field.as_ref();
                if schema.contains(field) {
                    Ok(field.to_string())
                } else {
                    Err(ConfigError::UnknownImportanceField(field.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { importance })
    }

    pub fn importance(&self) -> &[String] {
        &self.importance
    }

    /// A record that carries none of the importance fields is dropped.
    pub fn keep(&self, record: &CanonicalRecord) -> bool {
        self.importance
            .iter()
            .filter_map(|field| record.get(field))
            .any(|value| value.is_present())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::FieldValue,
        schema::{FieldSpec, ValueKind},
    };

    fn filter() -> RowValidityFilter {
        let schema = CanonicalSchema::new(vec![
            FieldSpec::new("serial_no", ValueKind::Identifier),
            FieldSpec::new("scheme_name", ValueKind::Text),
            FieldSpec::new("work_site", ValueKind::Text),
            FieldSpec::new("sanctioned_amount", ValueKind::Numeric),
        ])
        .expect("valid schema");
        RowValidityFilter::new(&["scheme_name", "work_site", "sanctioned_amount"], &schema)
            .expect("valid importance")
    }

    fn record(scheme: &str, site: &str, amount: Option<f64>) -> CanonicalRecord {
        let mut record = CanonicalRecord::new("s");
        record.insert("serial_no", FieldValue::Text("1".into()));
        record.insert("scheme_name", FieldValue::Text(scheme.into()));
        record.insert("work_site", FieldValue::Text(site.into()));
        record.insert("sanctioned_amount", FieldValue::Number(amount));
        record
    }

    #[test]
    fn drops_rows_with_only_administrative_fields() {
        assert!(!filter().keep(&record("", "", None)));
    }

    #[test]
    fn keeps_rows_with_a_single_importance_field() {
        let filter = filter();
        assert!(filter.keep(&record("Fencing", "", None)));
        assert!(filter.keep(&record("", "", Some(0.0))));
    }

    #[test]
    fn records_without_any_importance_field_are_dropped() {
        let mut bare = CanonicalRecord::new("s");
        bare.insert("serial_no", FieldValue::Text("4".into()));
        assert!(!filter().keep(&bare));
    }

    #[test]
    fn unknown_importance_field_is_a_config_error() {
        let schema = CanonicalSchema::new(vec![FieldSpec::new("a", ValueKind::Text)])
            .expect("valid schema");
        let err = RowValidityFilter::new(&["b"], &schema).unwrap_err();
        assert_eq!(err, ConfigError::UnknownImportanceField("b".into()));
    }
}
