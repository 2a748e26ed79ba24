//! Canonical schema: the fixed, ordered vocabulary every source is mapped onto.
//!
//! Each [`FieldSpec`] carries a [`ValueKind`] that selects the coercer applied
//! to the field's cells. Declaration order is the output column order.

use std::{collections::HashMap, fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Numeric,
    Date,
    /// Administrative keys such as serial numbers. Normalized like text, but
    /// never chosen to stand in for a missing descriptive field.
    Identifier,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Numeric => "numeric",
            ValueKind::Date => "date",
            ValueKind::Identifier => "identifier",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["text", "numeric", "date", "identifier"]
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ValueKind::Text | ValueKind::Identifier)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(ValueKind::Text),
            "numeric" | "number" | "float" => Ok(ValueKind::Numeric),
            "date" => Ok(ValueKind::Date),
            "identifier" | "id" => Ok(ValueKind::Identifier),
            _ => Err(anyhow!(
                "Unknown value kind '{value}'. Supported kinds: {}",
                ValueKind::variants().join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: ValueKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct CanonicalSchema {
    fields: Vec<FieldSpec>,
    positions: HashMap<String, usize>,
}

impl CanonicalSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        let mut positions = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(ConfigError::BlankFieldName { position: idx + 1 });
            }
            if positions.insert(field.name.clone(), idx).is_some() {
                return Err(ConfigError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields, positions })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.position(name).map(|idx| self.fields[idx].kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldSpec>> for CanonicalSchema {
    type Error = ConfigError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        CanonicalSchema::new(fields)
    }
}

impl From<CanonicalSchema> for Vec<FieldSpec> {
    fn from(schema: CanonicalSchema) -> Self {
        schema.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new(vec![
            FieldSpec::new("serial_no", ValueKind::Identifier),
            FieldSpec::new("scheme_name", ValueKind::Text),
            FieldSpec::new("sanctioned_amount", ValueKind::Numeric),
        ])
        .expect("valid schema")
    }

    #[test]
    fn lookups_follow_declaration_order() {
        let schema = schema();
        assert_eq!(schema.position("scheme_name"), Some(1));
        assert_eq!(schema.kind_of("sanctioned_amount"), Some(ValueKind::Numeric));
        assert_eq!(schema.kind_of("missing"), None);
        assert_eq!(
            schema.names().collect::<Vec<_>>(),
            vec!["serial_no", "scheme_name", "sanctioned_amount"]
        );
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = CanonicalSchema::new(vec![
            FieldSpec::new("a", ValueKind::Text),
            FieldSpec::new("a", ValueKind::Date),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField(name) if name == "a"));
    }

    #[test]
    fn value_kind_parses_aliases() {
        assert_eq!("Number".parse::<ValueKind>().unwrap(), ValueKind::Numeric);
        assert_eq!("id".parse::<ValueKind>().unwrap(), ValueKind::Identifier);
        assert!("currency".parse::<ValueKind>().is_err());
    }

    #[test]
    fn schema_round_trips_through_yaml_as_a_list() {
        let yaml = serde_yaml::to_string(&schema()).expect("serialize");
        assert!(yaml.contains("kind: identifier"));
        let parsed: CanonicalSchema = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(parsed, schema());
    }
}
