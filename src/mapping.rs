//! Header label to canonical field mapping.
//!
//! A raw label is normalized (trimmed, whitespace collapsed, casefolded) and
//! looked up in the [`AliasTable`]. Exact hits win outright. Otherwise a
//! substring match is attempted under the configured [`MatchPolicy`], and a
//! label that still matches nothing is slugified into a derived field name.
//!
//! Names are unique per table: [`ColumnNameMapper`] keeps the set of names it
//! has handed out and suffixes repeats with `_1`, `_2`, ... A fresh mapper is
//! created for every source, so the counter never leaks across sources.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::LazyLock,
};

use clap::ValueEnum;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{coerce::collapse_whitespace, error::ConfigError, schema::CanonicalSchema};

const UNNAMED_PREFIX: &str = "unnamed";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]+").expect("valid non-word regex"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid underscore regex"));

/// How a label that has no exact alias is matched by substring.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// First alias, in declaration order, that contains or is contained by
    /// the label. A short alias declared early ("pdc") shadows a longer, more
    /// specific one declared later ("revised pdc").
    DeclarationOrder,
    /// Aliases found inside the label rank first and the longest wins;
    /// failing that, the shortest alias containing the label wins. Ties fall
    /// back to declaration order.
    #[default]
    LongestAlias,
    /// No substring matching at all.
    ExactOnly,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPolicy::DeclarationOrder => "declaration-order",
            MatchPolicy::LongestAlias => "longest-alias",
            MatchPolicy::ExactOnly => "exact-only",
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub field: String,
}

impl AliasEntry {
    pub fn new(alias: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            field: field.into(),
        }
    }
}

/// Ordered alias to field lookup. Declaration order is significant for
/// [`MatchPolicy::DeclarationOrder`] and for breaking ties under
/// [`MatchPolicy::LongestAlias`].
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    exact: HashMap<String, usize>,
}

impl AliasTable {
    /// Normalizes every alias and checks its target against `schema`. A later
    /// duplicate of an alias is ignored. Each canonical field name is appended
    /// as an exact alias for itself unless already declared.
    pub fn new<I>(entries: I, schema: &CanonicalSchema) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = AliasEntry>,
    {
        let mut table = Self {
            entries: Vec::new(),
            exact: HashMap::new(),
        };
        for entry in entries {
            if !schema.contains(&entry.field) {
                return Err(ConfigError::UnknownAliasTarget {
                    alias: entry.alias,
                    field: entry.field,
                });
            }
            let alias = normalize_label(&entry.alias);
            if alias.is_empty() {
                return Err(ConfigError::BlankAlias(entry.field));
            }
            table.push(alias, entry.field);
        }
        for name in schema.names() {
            table.push(normalize_label(name), name.to_string());
        }
        Ok(table)
    }

    fn push(&mut self, alias: String, field: String) {
        if self.exact.contains_key(&alias) {
            return;
        }
        self.exact.insert(alias.clone(), self.entries.len());
        self.entries.push(AliasEntry { alias, field });
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup_exact(&self, normalized: &str) -> Option<&AliasEntry> {
        self.exact.get(normalized).map(|&idx| &self.entries[idx])
    }

    pub fn lookup_fuzzy(&self, normalized: &str, policy: MatchPolicy) -> Option<&AliasEntry> {
        if normalized.is_empty() {
            return None;
        }
        match policy {
            MatchPolicy::ExactOnly => None,
            MatchPolicy::DeclarationOrder => self.entries.iter().find(|entry| {
                normalized.contains(entry.alias.as_str()) || entry.alias.contains(normalized)
            }),
            MatchPolicy::LongestAlias => {
                // `max_by_key` keeps the last maximum; iterate in reverse so
                // the earliest declaration wins ties.
                let contained = self
                    .entries
                    .iter()
                    .rev()
                    .filter(|entry| normalized.contains(entry.alias.as_str()))
                    .max_by_key(|entry| entry.alias.chars().count());
                contained.or_else(|| {
                    self.entries
                        .iter()
                        .filter(|entry| entry.alias.contains(normalized))
                        .min_by_key(|entry| entry.alias.chars().count())
                })
            }
        }
    }
}

/// Trim, collapse whitespace runs (newlines included), casefold.
pub fn normalize_label(raw: &str) -> String {
    collapse_whitespace(raw).to_lowercase()
}

/// Turns a normalized label into an identifier: every run of non-word
/// characters becomes one underscore and edge underscores are trimmed.
pub fn slugify(normalized: &str) -> String {
    let replaced = NON_WORD.replace_all(normalized, "_");
    let collapsed = UNDERSCORE_RUN.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Derived,
    /// Empty or reader-generated placeholder label; the column is dropped.
    Unnamed,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::Derived => "derived",
            MatchKind::Unnamed => "unnamed",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Zero-based column position in the source.
    pub position: usize,
    pub label: String,
    pub name: String,
    pub kind: MatchKind,
    /// Alias that produced the match, for exact and fuzzy hits.
    pub alias: Option<String>,
}

impl ColumnMapping {
    pub fn is_discardable(&self) -> bool {
        self.kind == MatchKind::Unnamed
    }
}

pub struct ColumnNameMapper<'a> {
    aliases: &'a AliasTable,
    policy: MatchPolicy,
    used: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl<'a> ColumnNameMapper<'a> {
    pub fn new(aliases: &'a AliasTable, policy: MatchPolicy) -> Self {
        Self {
            aliases,
            policy,
            used: HashSet::new(),
            next_suffix: HashMap::new(),
        }
    }

    /// Marks `name` as taken, so a column whose label resolves to it is
    /// given a suffixed name instead.
    pub fn reserve(mut self, name: &str) -> Self {
        self.used.insert(name.to_string());
        self
    }

    pub fn map_label(&mut self, position: usize, label: &str) -> ColumnMapping {
        let normalized = normalize_label(label);
        let (base, kind, alias) = self.resolve(position, &normalized);
        let name = self.claim(base);
        debug!("Column {position} '{normalized}' -> '{name}' ({kind})");
        ColumnMapping {
            position,
            label: label.to_string(),
            name,
            kind,
            alias,
        }
    }

    /// Maps a whole header row, left to right.
    pub fn map_header<S: AsRef<str>>(&mut self, labels: &[S]) -> Vec<ColumnMapping> {
        labels
            .iter()
            .enumerate()
            .map(|(position, label)| self.map_label(position, label.as_ref()))
            .collect()
    }

    fn resolve(&self, position: usize, normalized: &str) -> (String, MatchKind, Option<String>) {
        if normalized.is_empty() || normalized.starts_with(UNNAMED_PREFIX) {
            return (unnamed_name(position), MatchKind::Unnamed, None);
        }
        if let Some(entry) = self.aliases.lookup_exact(normalized) {
            return (entry.field.clone(), MatchKind::Exact, Some(entry.alias.clone()));
        }
        if let Some(entry) = self.aliases.lookup_fuzzy(normalized, self.policy) {
            return (entry.field.clone(), MatchKind::Fuzzy, Some(entry.alias.clone()));
        }
        let slug = slugify(normalized);
        if slug.is_empty() {
            (unnamed_name(position), MatchKind::Unnamed, None)
        } else {
            (slug, MatchKind::Derived, None)
        }
    }

    fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let counter = self.next_suffix.entry(base.clone()).or_insert(1);
        loop {
            let candidate = format!("{base}_{counter}");
            *counter += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

fn unnamed_name(position: usize) -> String {
    format!("unnamed_col_{position}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, ValueKind};

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new(vec![
            FieldSpec::new("serial_no", ValueKind::Identifier),
            FieldSpec::new("scheme_name", ValueKind::Text),
            FieldSpec::new("sanctioned_amount", ValueKind::Numeric),
            FieldSpec::new("pdc_agreement", ValueKind::Date),
            FieldSpec::new("revised_pdc", ValueKind::Date),
            FieldSpec::new("remarks", ValueKind::Text),
        ])
        .expect("valid schema")
    }

    fn aliases() -> AliasTable {
        AliasTable::new(
            vec![
                AliasEntry::new("S No", "serial_no"),
                AliasEntry::new("name of scheme", "scheme_name"),
                AliasEntry::new("Sd Amount\n(In Lakh)", "sanctioned_amount"),
                AliasEntry::new("pdc", "pdc_agreement"),
                AliasEntry::new("revised pdc", "revised_pdc"),
                AliasEntry::new("remarks", "remarks"),
                AliasEntry::new("remarks", "scheme_name"),
            ],
            &schema(),
        )
        .expect("valid aliases")
    }

    #[test]
    fn aliases_are_normalized_and_first_declaration_wins() {
        let table = aliases();
        assert_eq!(
            table.lookup_exact("sd amount (in lakh)").map(|e| e.field.as_str()),
            Some("sanctioned_amount")
        );
        assert_eq!(
            table.lookup_exact("remarks").map(|e| e.field.as_str()),
            Some("remarks")
        );
        assert_eq!(
            table.lookup_exact("scheme_name").map(|e| e.field.as_str()),
            Some("scheme_name")
        );
    }

    #[test]
    fn unknown_alias_target_is_rejected() {
        let err = AliasTable::new(vec![AliasEntry::new("x", "nope")], &schema()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAliasTarget { field, .. } if field == "nope"));
    }

    #[test]
    fn declaration_order_lets_short_alias_shadow_longer_one() {
        let table = aliases();
        let mut mapper = ColumnNameMapper::new(&table, MatchPolicy::DeclarationOrder);
        let mapping = mapper.map_label(0, "Revised PDC, if date of original PDC lapsed");
        assert_eq!(mapping.name, "pdc_agreement");
        assert_eq!(mapping.kind, MatchKind::Fuzzy);
    }

    #[test]
    fn longest_alias_prefers_the_more_specific_match() {
        let table = aliases();
        let mut mapper = ColumnNameMapper::new(&table, MatchPolicy::LongestAlias);
        let mapping = mapper.map_label(0, "Revised PDC, if date of original PDC lapsed");
        assert_eq!(mapping.name, "revised_pdc");
        assert_eq!(mapping.alias.as_deref(), Some("revised pdc"));
    }

    #[test]
    fn longest_alias_falls_back_to_shortest_containing_alias() {
        let table = aliases();
        let mut mapper = ColumnNameMapper::new(&table, MatchPolicy::LongestAlias);
        assert_eq!(mapper.map_label(0, "sd amount").name, "sanctioned_amount");
    }

    #[test]
    fn exact_only_derives_unmatched_labels() {
        let table = aliases();
        let mut mapper = ColumnNameMapper::new(&table, MatchPolicy::ExactOnly);
        let mapping = mapper.map_label(2, "Revised PDC, if date lapsed");
        assert_eq!(mapping.name, "revised_pdc_if_date_lapsed");
        assert_eq!(mapping.kind, MatchKind::Derived);
    }

    #[test]
    fn reserved_names_are_never_handed_out() {
        let table = aliases();
        let mut mapper =
            ColumnNameMapper::new(&table, MatchPolicy::LongestAlias).reserve("source_sheet");
        let mappings = mapper.map_header(&["Name of Scheme", "Source Sheet"]);
        assert_eq!(mappings[0].name, "scheme_name");
        assert_eq!(mappings[1].name, "source_sheet_1");
    }

    #[test]
    fn placeholders_become_discardable_unnamed_columns() {
        let table = aliases();
        let mut mapper = ColumnNameMapper::new(&table, MatchPolicy::LongestAlias);
        let mappings = mapper.map_header(&["", "Unnamed: 4", "###"]);
        let names: Vec<_> = mappings.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["unnamed_col_0", "unnamed_col_1", "unnamed_col_2"]);
        assert!(mappings.iter().all(ColumnMapping::is_discardable));
    }

    #[test]
    fn repeated_names_get_per_table_suffixes() {
        let table = aliases();
        let mut mapper = ColumnNameMapper::new(&table, MatchPolicy::LongestAlias);
        let names: Vec<_> = mapper
            .map_header(&["Remarks", "remarks ", "REMARKS", "remarks_1"])
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["remarks", "remarks_1", "remarks_2", "remarks_3"]);

        let mut fresh = ColumnNameMapper::new(&table, MatchPolicy::LongestAlias);
        assert_eq!(fresh.map_label(0, "Remarks").name, "remarks");
    }

    #[test]
    fn canonical_names_map_to_themselves() {
        let table = aliases();
        let schema = schema();
        let mut mapper = ColumnNameMapper::new(&table, MatchPolicy::DeclarationOrder);
        for name in schema.names() {
            let mapping = mapper.map_label(0, name);
            assert_eq!(mapping.name, name);
            assert_eq!(mapping.kind, MatchKind::Exact);
        }
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("aa&es pending (shq/ftr)"), "aa_es_pending_shq_ftr");
        assert_eq!(slugify("--"), "");
    }
}
