//! Run configuration: vocabulary, policies and admission thresholds.
//!
//! Everything has a built-in default, so a YAML file only needs the keys it
//! overrides. `validate` is run on load and again before every run.

use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    coerce::SerialConvention,
    error::ConfigError,
    filter::RowValidityFilter,
    header::HeaderDetection,
    mapping::{AliasEntry, AliasTable, MatchPolicy},
    schema::{CanonicalSchema, ValueKind},
    vocabulary,
};

const DEFAULT_MIN_ROWS: usize = 2;
const DEFAULT_MIN_COLUMNS: usize = 5;
const DEFAULT_SOURCE_COLUMN: &str = "source_sheet";

/// Fills a missing identity field from another text column of the same
/// source. Off unless configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFallback {
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub schema: CanonicalSchema,
    pub aliases: Vec<AliasEntry>,
    pub importance: Vec<String>,
    pub header: HeaderDetection,
    pub match_policy: MatchPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_fallback: Option<IdentityFallback>,
    pub serial_dates: SerialConvention,
    pub min_rows: usize,
    pub min_columns: usize,
    pub source_column: String,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            aliases: vocabulary::default_aliases(),
            importance: vocabulary::default_importance(),
            header: HeaderDetection::new(&vocabulary::default_header_keywords()),
            match_policy: MatchPolicy::default(),
            identity_fallback: None,
            serial_dates: SerialConvention::default(),
            min_rows: DEFAULT_MIN_ROWS,
            min_columns: DEFAULT_MIN_COLUMNS,
            source_column: DEFAULT_SOURCE_COLUMN.to_string(),
        }
    }
}

fn default_schema() -> CanonicalSchema {
    CanonicalSchema::new(vocabulary::default_fields())
        .expect("built-in field list has unique, non-blank names")
}

impl ConsolidationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config
            .validate()
            .with_context(|| format!("Validating config {path:?}"))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_yaml_string()?;
        let mut file =
            File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        file.write_all(serialized.as_bytes())
            .with_context(|| format!("Writing config file {path:?}"))?;
        file.flush()?;
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing config to YAML")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.header.validate()?;
        self.alias_table()?;
        self.row_filter()?;
        let source_column = self.source_column.trim();
        if source_column.is_empty() || self.schema.contains(source_column) {
            return Err(ConfigError::SourceColumnClash(self.source_column.clone()));
        }
        if let Some(fallback) = &self.identity_fallback {
            match self.schema.kind_of(&fallback.field) {
                None => return Err(ConfigError::UnknownFallbackField(fallback.field.clone())),
                Some(ValueKind::Text) => {}
                Some(_) => return Err(ConfigError::NonTextFallbackField(fallback.field.clone())),
            }
        }
        Ok(())
    }

    pub fn alias_table(&self) -> Result<AliasTable, ConfigError> {
        AliasTable::new(self.aliases.iter().cloned(), &self.schema)
    }

    pub fn row_filter(&self) -> Result<RowValidityFilter, ConfigError> {
        RowValidityFilter::new(&self.importance, &self.schema)
    }
}
