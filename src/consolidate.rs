//! Per-source pipeline and final assembly.
//!
//! Each [`RawTable`] goes through admission, header location, column mapping,
//! cell coercion and row filtering on its own. Sources share nothing mutable,
//! so they run in parallel; results are collected back in input order before
//! the union merge so output never depends on scheduling.
//!
//! A source that cannot be used is skipped with a warning. Only a run in which
//! no source retains a single record is an error.

use log::{info, warn};
use rayon::prelude::*;

use crate::{
    cell::{Cell, RawTable},
    coerce::SerialConvention,
    config::{ConsolidationConfig, IdentityFallback},
    error::{ConsolidateError, SourceError},
    filter::RowValidityFilter,
    header::{HeaderMatch, HeaderRowLocator},
    mapping::{AliasTable, ColumnMapping, ColumnNameMapper, MatchPolicy, normalize_label},
    record::{CanonicalRecord, FieldValue},
    schema::{CanonicalSchema, ValueKind},
    union::{OutputColumn, SchemaUnionMerger, SourceBatch, SourceColumn},
};

/// Header location and column mapping for one source.
#[derive(Debug, Clone)]
pub struct SourceMapping {
    pub source: String,
    pub header: HeaderMatch,
    pub columns: Vec<ColumnMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub source: String,
    pub reason: SourceError,
}

#[derive(Debug, Clone)]
pub struct ConsolidatedTable {
    columns: Vec<OutputColumn>,
    records: Vec<CanonicalRecord>,
    skipped: Vec<SkippedSource>,
}

impl ConsolidatedTable {
    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn skipped(&self) -> &[SkippedSource] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records rendered in column order, one string per column.
    pub fn rendered_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(|record| {
            self.columns
                .iter()
                .map(|column| {
                    record
                        .get(&column.name)
                        .map(FieldValue::render)
                        .unwrap_or_default()
                })
                .collect()
        })
    }
}

pub struct Consolidator {
    schema: CanonicalSchema,
    aliases: AliasTable,
    policy: MatchPolicy,
    locator: HeaderRowLocator,
    filter: RowValidityFilter,
    fallback: Option<IdentityFallback>,
    serials: SerialConvention,
    min_rows: usize,
    min_columns: usize,
    source_column: String,
}

impl Consolidator {
    pub fn new(config: &ConsolidationConfig) -> Result<Self, ConsolidateError> {
        config.validate()?;
        Ok(Self {
            schema: config.schema.clone(),
            aliases: config.alias_table()?,
            policy: config.match_policy,
            locator: config.header.locator(),
            filter: config.row_filter()?,
            fallback: config.identity_fallback.clone(),
            serials: config.serial_dates,
            min_rows: config.min_rows,
            min_columns: config.min_columns,
            source_column: config.source_column.clone(),
        })
    }

    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    /// Admission, header location and label mapping, without touching data.
    pub fn map_source(&self, table: &RawTable) -> Result<SourceMapping, SourceError> {
        let rows = table.row_count();
        let width = table.column_count();
        if rows == 0 || rows < self.min_rows || width < self.min_columns {
            return Err(SourceError::InsufficientData {
                rows,
                columns: width,
            });
        }

        let header = self.locator.locate(table.rows());
        let labels = header_labels(&table.rows()[header.row], width);
        if labels.iter().all(|label| label.trim().is_empty()) {
            return Err(SourceError::EmptyHeader { row: header.row });
        }
        let columns = ColumnNameMapper::new(&self.aliases, self.policy)
            .reserve(&self.source_column)
            .map_header(&labels);
        Ok(SourceMapping {
            source: table.source().to_string(),
            header,
            columns,
        })
    }

    pub fn process_source(&self, table: &RawTable) -> Result<SourceBatch, SourceError> {
        let mapping = self.map_source(table)?;
        let header_row = mapping.header.row;
        if header_row + 1 >= table.row_count() {
            return Err(SourceError::NoDataRows { row: header_row });
        }
        info!(
            "Source '{}': header at row {} (score {}){}",
            mapping.source,
            header_row,
            mapping.header.score,
            if mapping.header.fell_back {
                ", low-confidence match ignored"
            } else {
                ""
            }
        );

        let width = table.column_count();
        let header_key = row_key(&table.rows()[header_row], width);
        let mut columns = mapping
            .columns
            .iter()
            .map(|column| SourceColumn {
                name: column.name.clone(),
                kind: self.kind_of(&column.name),
                discardable: column.is_discardable(),
            })
            .collect::<Vec<_>>();
        let donor = self.fallback_donor(&mapping);
        if let (Some(fallback), Some(donor)) = (&self.fallback, donor) {
            warn!(
                "Source '{}' has no '{}' column; filling it from '{}' (label '{}')",
                mapping.source, fallback.field, donor.name, donor.label
            );
            columns.push(SourceColumn {
                name: fallback.field.clone(),
                kind: ValueKind::Text,
                discardable: false,
            });
        }

        let mut blank = 0usize;
        let mut repeated = 0usize;
        let mut dropped = 0usize;
        let mut records = Vec::new();
        for row in &table.rows()[header_row + 1..] {
            if row.iter().all(Cell::is_blank) {
                blank += 1;
                continue;
            }
            if row_key(row, width) == header_key {
                repeated += 1;
                continue;
            }
            let mut record = self.coerce_row(&mapping, row);
            if let (Some(fallback), Some(donor)) = (&self.fallback, donor) {
                let value = record
                    .get(&donor.name)
                    .cloned()
                    .unwrap_or_else(|| FieldValue::null_for(ValueKind::Text));
                record.insert(fallback.field.clone(), value);
            }
            if self.filter.keep(&record) {
                records.push(record);
            } else {
                dropped += 1;
            }
        }

        if records.is_empty() {
            return Err(SourceError::NothingRetained);
        }
        info!(
            "Source '{}': {} record(s) retained ({} blank, {} repeated header, {} insufficient)",
            mapping.source,
            records.len(),
            blank,
            repeated,
            dropped
        );
        Ok(SourceBatch {
            source: mapping.source,
            columns,
            records,
        })
    }

    /// Runs every source and unions the results.
    pub fn consolidate(&self, tables: &[RawTable]) -> Result<ConsolidatedTable, ConsolidateError> {
        let outcomes = tables
            .par_iter()
            .map(|table| self.process_source(table))
            .collect::<Vec<_>>();

        let mut batches = Vec::new();
        let mut skipped = Vec::new();
        for (table, outcome) in tables.iter().zip(outcomes) {
            match outcome {
                Ok(batch) => {
                    info!("✓ Consolidated '{}'", batch.source);
                    batches.push(batch);
                }
                Err(reason) => {
                    warn!("Skipping source '{}': {reason}", table.source());
                    skipped.push(SkippedSource {
                        source: table.source().to_string(),
                        reason,
                    });
                }
            }
        }

        if batches.is_empty() {
            return Err(ConsolidateError::NoData {
                sources: tables.len(),
                skipped: skipped.len(),
            });
        }

        let merger = SchemaUnionMerger::new(&self.schema);
        let columns = merger.columns(&batches);
        let records = batches
            .into_iter()
            .flat_map(|batch| batch.records)
            .map(|record| merger.expand(record, &columns))
            .collect::<Vec<_>>();
        info!(
            "Consolidated {} record(s) across {} column(s) from {} of {} source(s)",
            records.len(),
            columns.len(),
            tables.len() - skipped.len(),
            tables.len()
        );
        Ok(ConsolidatedTable {
            columns,
            records,
            skipped,
        })
    }

    fn kind_of(&self, name: &str) -> ValueKind {
        self.schema.kind_of(name).unwrap_or(ValueKind::Text)
    }

    fn coerce_row(&self, mapping: &SourceMapping, row: &[Cell]) -> CanonicalRecord {
        let mut record = CanonicalRecord::new(mapping.source.as_str());
        for column in mapping.columns.iter().filter(|c| !c.is_discardable()) {
            let cell = row.get(column.position).unwrap_or(&Cell::Empty);
            let value = FieldValue::coerce(cell, self.kind_of(&column.name), self.serials);
            record.insert(column.name.clone(), value);
        }
        record
    }

    /// First mapped text column that can stand in for the missing identity
    /// field, if the fallback is configured and actually needed.
    fn fallback_donor<'m>(&self, mapping: &'m SourceMapping) -> Option<&'m ColumnMapping> {
        let fallback = self.fallback.as_ref()?;
        if mapping.columns.iter().any(|c| c.name == fallback.field) {
            return None;
        }
        mapping.columns.iter().find(|column| {
            !column.is_discardable()
                && matches!(self.schema.kind_of(&column.name), None | Some(ValueKind::Text))
        })
    }
}

fn header_labels(row: &[Cell], width: usize) -> Vec<String> {
    (0..width)
        .map(|idx| row.get(idx).map(Cell::as_text).unwrap_or_default())
        .collect()
}

fn row_key(row: &[Cell], width: usize) -> Vec<String> {
    header_labels(row, width)
        .iter()
        .map(|label| normalize_label(label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consolidator() -> Consolidator {
        Consolidator::new(&ConsolidationConfig::default()).expect("default config")
    }

    fn table(source: &str, rows: &[&[&str]]) -> RawTable {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        RawTable::from_text_rows(source, &rows)
    }

    const HEADER: &[&str] = &[
        "S No",
        "Name of Scheme",
        "Name of Work/Site",
        "Sd Amount (In Lakh)",
        "Date of TS",
    ];

    #[test]
    fn header_found_below_a_title_row() {
        let source = table(
            "b",
            &[
                &["Status of Works 2024-25", "", "", "", ""],
                HEADER,
                &["1", "Fencing", "BOP Alpha", "12.5", "28.07.2023"],
            ],
        );
        let mapping = consolidator().map_source(&source).expect("mapped");
        assert_eq!(mapping.header.row, 1);
        let names: Vec<_> = mapping.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["serial_no", "scheme_name", "work_site", "sanctioned_amount", "date_ts"]
        );
    }

    #[test]
    fn coerces_by_kind_and_drops_noise_rows() {
        let source = table(
            "a",
            &[
                HEADER,
                &["1", "Fencing", "BOP Alpha", "1.5 crore", "28.07.2023"],
                &["", "", "", "", ""],
                HEADER,
                &["2", "nil", "-", "NA", "pending"],
                &["3", " Road   repair ", "", "", "45000"],
            ],
        );
        let batch = consolidator().process_source(&source).expect("batch");
        assert_eq!(batch.records.len(), 2);
        let first = &batch.records[0];
        assert_eq!(first.get("sanctioned_amount").and_then(FieldValue::as_number), Some(150.0));
        assert_eq!(first.get("date_ts").map(FieldValue::render).as_deref(), Some("2023-07-28"));
        let second = &batch.records[1];
        assert_eq!(second.get("scheme_name").and_then(FieldValue::as_text), Some("Road repair"));
        assert_eq!(second.get("date_ts").map(FieldValue::render).as_deref(), Some("2023-03-14"));
    }

    #[test]
    fn narrow_or_short_sources_are_insufficient() {
        let narrow = table("n", &[&["Scheme", "Amount"], &["x", "1"]]);
        assert_eq!(
            consolidator().process_source(&narrow).unwrap_err(),
            SourceError::InsufficientData { rows: 2, columns: 2 }
        );
        let short = table("s", &[HEADER]);
        assert!(matches!(
            consolidator().process_source(&short).unwrap_err(),
            SourceError::InsufficientData { rows: 1, .. }
        ));
    }

    #[test]
    fn identity_fallback_fills_missing_field() {
        let mut config = ConsolidationConfig::default();
        config.identity_fallback = Some(IdentityFallback {
            field: "scheme_name".into(),
        });
        let consolidator = Consolidator::new(&config).expect("config");
        let source = table(
            "f",
            &[
                &["S No", "Project Title", "Sd Amount", "Date of TS", "Remarks"],
                &["1", "Boundary wall", "10", "01.04.2023", "ok"],
            ],
        );
        let batch = consolidator.process_source(&source).expect("batch");
        let record = &batch.records[0];
        assert_eq!(record.get("scheme_name").and_then(FieldValue::as_text), Some("Boundary wall"));
        assert!(batch.columns.iter().any(|c| c.name == "scheme_name"));
    }

    #[test]
    fn fallback_is_off_by_default() {
        let source = table(
            "f",
            &[
                &["S No", "Project Title", "Sd Amount", "Date of TS", "Remarks"],
                &["1", "Boundary wall", "10", "01.04.2023", "ok"],
            ],
        );
        let batch = consolidator().process_source(&source).expect("batch");
        assert!(!batch.records[0].contains("scheme_name"));
    }

    #[test]
    fn bad_sources_are_skipped_and_order_is_kept() {
        let tables = vec![
            table("first", &[HEADER, &["1", "Fencing", "", "", ""]]),
            table("broken", &[&["x"]]),
            table("second", &[HEADER, &["1", "Road", "", "", ""]]),
        ];
        let result = consolidator().consolidate(&tables).expect("table");
        let sources: Vec<_> = result.records().iter().map(|r| r.source()).collect();
        assert_eq!(sources, vec!["first", "second"]);
        assert_eq!(result.skipped().len(), 1);
        assert_eq!(result.skipped()[0].source, "broken");
    }

    #[test]
    fn nothing_retained_is_no_data() {
        let tables = vec![table("a", &[HEADER, &["1", "", "", "", ""]])];
        let err = consolidator().consolidate(&tables).unwrap_err();
        assert_eq!(err, ConsolidateError::NoData { sources: 1, skipped: 1 });
    }
}
