//! Column superset across sources.
//!
//! Every source exposes its own subset of canonical columns plus whatever
//! undeclared columns its labels derived. The union lists declared columns in
//! schema order, then undeclared ones in the order they were first seen
//! (sources in input order, columns left to right). Discardable placeholder
//! columns never reach the union.

use std::collections::HashSet;

use itertools::Itertools;

use crate::{
    record::{CanonicalRecord, FieldValue},
    schema::{CanonicalSchema, ValueKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    pub name: String,
    pub kind: ValueKind,
    /// False for columns derived from labels the schema does not know.
    pub declared: bool,
}

/// A column as exposed by one source after mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    pub kind: ValueKind,
    pub discardable: bool,
}

/// One source's retained records with the columns it exposed.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub columns: Vec<SourceColumn>,
    pub records: Vec<CanonicalRecord>,
}

pub struct SchemaUnionMerger<'a> {
    schema: &'a CanonicalSchema,
}

impl<'a> SchemaUnionMerger<'a> {
    pub fn new(schema: &'a CanonicalSchema) -> Self {
        Self { schema }
    }

    pub fn columns(&self, batches: &[SourceBatch]) -> Vec<OutputColumn> {
        let exposed = batches
            .iter()
            .flat_map(|batch| batch.columns.iter())
            .filter(|column| !column.discardable)
            .collect_vec();
        let seen = exposed
            .iter()
            .map(|column| column.name.as_str())
            .collect::<HashSet<_>>();

        let mut columns = self
            .schema
            .fields()
            .iter()
            .filter(|field| seen.contains(field.name.as_str()))
            .map(|field| OutputColumn {
                name: field.name.clone(),
                kind: field.kind,
                declared: true,
            })
            .collect_vec();

        let mut undeclared = HashSet::new();
        for column in exposed {
            if self.schema.contains(&column.name) || !undeclared.insert(column.name.as_str()) {
                continue;
            }
            columns.push(OutputColumn {
                name: column.name.clone(),
                kind: column.kind,
                declared: false,
            });
        }
        columns
    }

    /// Gives `record` exactly the fields in `columns`, inserting nulls for the
    /// ones its source did not expose.
    pub fn expand(&self, mut record: CanonicalRecord, columns: &[OutputColumn]) -> CanonicalRecord {
        let mut expanded = CanonicalRecord::new(record.source());
        for column in columns {
            let value = record
                .remove(&column.name)
                .unwrap_or_else(|| FieldValue::null_for(column.kind));
            expanded.insert(column.name.clone(), value);
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new(vec![
            FieldSpec::new("x", ValueKind::Text),
            FieldSpec::new("y", ValueKind::Numeric),
            FieldSpec::new("z", ValueKind::Date),
        ])
        .expect("valid schema")
    }

    fn column(name: &str, kind: ValueKind) -> SourceColumn {
        SourceColumn {
            name: name.to_string(),
            kind,
            discardable: false,
        }
    }

    fn batch(source: &str, columns: Vec<SourceColumn>) -> SourceBatch {
        let mut record = CanonicalRecord::new(source);
        for column in &columns {
            let value = match column.kind {
                ValueKind::Numeric => FieldValue::Number(Some(1.0)),
                _ => FieldValue::Text(format!("{source}-{}", column.name)),
            };
            record.insert(column.name.clone(), value);
        }
        SourceBatch {
            source: source.to_string(),
            columns,
            records: vec![record],
        }
    }

    #[test]
    fn partial_schemas_union_in_declared_order() {
        let schema = schema();
        let merger = SchemaUnionMerger::new(&schema);
        let batches = vec![
            batch("a", vec![column("y", ValueKind::Numeric), column("x", ValueKind::Text)]),
            batch("b", vec![column("z", ValueKind::Date), column("y", ValueKind::Numeric)]),
        ];
        let columns = merger.columns(&batches);
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);

        let a = merger.expand(batches[0].records[0].clone(), &columns);
        assert_eq!(a.get("z"), Some(&FieldValue::Date(None)));
        let b = merger.expand(batches[1].records[0].clone(), &columns);
        assert_eq!(b.get("x"), Some(&FieldValue::Text(String::new())));
        assert_eq!(b.get("y").and_then(FieldValue::as_number), Some(1.0));
    }

    #[test]
    fn undeclared_columns_follow_in_first_seen_order() {
        let schema = schema();
        let merger = SchemaUnionMerger::new(&schema);
        let mut placeholder = column("unnamed_col_3", ValueKind::Text);
        placeholder.discardable = true;
        let batches = vec![
            batch(
                "a",
                vec![column("zeta", ValueKind::Text), column("x", ValueKind::Text), placeholder],
            ),
            batch(
                "b",
                vec![column("alpha", ValueKind::Text), column("zeta", ValueKind::Text)],
            ),
        ];
        let columns = merger.columns(&batches);
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["x", "zeta", "alpha"]);
        assert!(columns[0].declared && !columns[1].declared);

        let a = merger.expand(batches[0].records[0].clone(), &columns);
        assert!(!a.contains("unnamed_col_3"));
        assert_eq!(a.len(), 3);
    }
}
