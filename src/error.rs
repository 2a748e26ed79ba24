//! Error taxonomy.
//!
//! Cell-level coercion never fails, so there is no cell error type. A source
//! that cannot be used is reported with [`SourceError`] and skipped; a run
//! that retains nothing at all ends in [`ConsolidateError::NoData`].

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Canonical schema must declare at least one field")]
    EmptySchema,
    #[error("Canonical field at position {position} has a blank name")]
    BlankFieldName { position: usize },
    #[error("Canonical field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("Alias '{alias}' targets undeclared field '{field}'")]
    UnknownAliasTarget { alias: String, field: String },
    #[error("Alias for field '{0}' is blank after normalization")]
    BlankAlias(String),
    #[error("Importance field '{0}' is not declared in the schema")]
    UnknownImportanceField(String),
    #[error("Identity fallback field '{0}' is not declared in the schema")]
    UnknownFallbackField(String),
    #[error("Identity fallback field '{0}' must be a text field")]
    NonTextFallbackField(String),
    #[error("Header detection needs at least one keyword")]
    NoHeaderKeywords,
    #[error("Source column '{0}' is blank or collides with a canonical field")]
    SourceColumnClash(String),
}

/// Why a single source was left out of the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("insufficient data: {rows} row(s) x {columns} column(s)")]
    InsufficientData { rows: usize, columns: usize },
    #[error("header row {row} has no labels")]
    EmptyHeader { row: usize },
    #[error("no data rows below header row {row}")]
    NoDataRows { row: usize },
    #[error("no rows retained after filtering")]
    NothingRetained,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsolidateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("No data: none of {sources} source(s) yielded a retained record ({skipped} skipped)")]
    NoData { sources: usize, skipped: usize },
}
