//! Built-in vocabulary for engineering works status registers.
//!
//! Registers are kept per formation, one sheet each, and every office lays
//! its columns out a little differently. These tables describe the canonical
//! shape they are reconciled into. A YAML config can replace any of them.

use crate::{
    mapping::AliasEntry,
    schema::{FieldSpec, ValueKind},
};

const FIELDS: &[(&str, ValueKind)] = &[
    ("serial_no", ValueKind::Identifier),
    ("budget_head", ValueKind::Text),
    ("scheme_name", ValueKind::Text),
    ("ftr_hq", ValueKind::Text),
    ("shq", ValueKind::Text),
    ("work_site", ValueKind::Text),
    ("executive_agency", ValueKind::Text),
    ("aa_es_ref", ValueKind::Text),
    ("sanctioned_amount", ValueKind::Numeric),
    ("date_ts", ValueKind::Date),
    ("date_tender", ValueKind::Date),
    ("date_acceptance", ValueKind::Date),
    ("date_award", ValueKind::Date),
    ("time_allowed_days", ValueKind::Numeric),
    ("pdc_agreement", ValueKind::Date),
    ("revised_pdc", ValueKind::Date),
    ("actual_completion_date", ValueKind::Date),
    ("firm_name", ValueKind::Text),
    ("physical_progress", ValueKind::Numeric),
    ("progress_status", ValueKind::Text),
    ("expdr_upto_31mar25", ValueKind::Numeric),
    ("expdr_cfy", ValueKind::Numeric),
    ("total_expdr", ValueKind::Numeric),
    ("percent_expdr", ValueKind::Numeric),
    ("remarks", ValueKind::Text),
    ("aa_es_pending_with", ValueKind::Text),
];

// Order matters under declaration-order matching.
const ALIASES: &[(&str, &str)] = &[
    ("s no", "serial_no"),
    ("s/no", "serial_no"),
    ("s.no", "serial_no"),
    ("sr no", "serial_no"),
    ("sr.no", "serial_no"),
    ("sl no", "serial_no"),
    ("sl.no", "serial_no"),
    ("serial no", "serial_no"),
    ("serial number", "serial_no"),
    ("sno", "serial_no"),
    ("budget head", "budget_head"),
    ("budgethead", "budget_head"),
    ("budget", "budget_head"),
    ("name of scheme", "scheme_name"),
    ("scheme name", "scheme_name"),
    ("name_of_scheme", "scheme_name"),
    ("schemename", "scheme_name"),
    ("scheme", "scheme_name"),
    ("name of ftr hq", "ftr_hq"),
    ("name of ftr", "ftr_hq"),
    ("ftr hq", "ftr_hq"),
    ("ftrhq", "ftr_hq"),
    ("name_of_ftr_hq", "ftr_hq"),
    ("name of shq", "shq"),
    ("name_of_shq", "shq"),
    ("s.h.q", "shq"),
    ("name of work/site", "work_site"),
    ("name of work site", "work_site"),
    ("work site", "work_site"),
    ("work/site", "work_site"),
    ("name_of_work_site", "work_site"),
    ("worksite", "work_site"),
    ("work", "work_site"),
    ("executive agency", "executive_agency"),
    ("exec agency", "executive_agency"),
    ("executiveagency", "executive_agency"),
    ("executing agency", "executive_agency"),
    ("agency", "executive_agency"),
    ("ref of aa/es", "aa_es_ref"),
    ("ref of aa&es", "aa_es_ref"),
    ("aa/es ref", "aa_es_ref"),
    ("aa&es ref", "aa_es_ref"),
    ("reference of aa/es", "aa_es_ref"),
    ("aa/es", "aa_es_ref"),
    ("aa&es", "aa_es_ref"),
    ("sd amount", "sanctioned_amount"),
    ("sd amount (in lakh)", "sanctioned_amount"),
    ("sanctioned amount", "sanctioned_amount"),
    ("sanction amount", "sanctioned_amount"),
    ("sd_amount", "sanctioned_amount"),
    ("sdamount", "sanctioned_amount"),
    ("amount", "sanctioned_amount"),
    (
        "if aa&es not issued then, pending with hq (shq/ftr/ command/ fhq)",
        "aa_es_pending_with",
    ),
    ("if aa&es not issued then pending with hq", "aa_es_pending_with"),
    ("aa&es pending with", "aa_es_pending_with"),
    ("pending with hq", "aa_es_pending_with"),
    ("pending with", "aa_es_pending_with"),
    ("date of ts", "date_ts"),
    ("ts date", "date_ts"),
    ("dt of ts", "date_ts"),
    ("date of tender", "date_tender"),
    ("tender date", "date_tender"),
    ("dt of tender", "date_tender"),
    ("date of acceptance", "date_acceptance"),
    ("acceptance date", "date_acceptance"),
    ("dt of acceptance", "date_acceptance"),
    ("date of award", "date_award"),
    ("award date", "date_award"),
    ("dt of award", "date_award"),
    ("time allowed (in days)", "time_allowed_days"),
    ("time allowed", "time_allowed_days"),
    ("timeallowed", "time_allowed_days"),
    ("days allowed", "time_allowed_days"),
    ("pdc as per agreement", "pdc_agreement"),
    ("pdc per agreement", "pdc_agreement"),
    ("pdc agreement", "pdc_agreement"),
    ("pdc", "pdc_agreement"),
    ("revised pdc, if date of original pdc lapsed", "revised_pdc"),
    ("revised pdc if date of original pdc lapsed", "revised_pdc"),
    ("revised pdc", "revised_pdc"),
    ("rev pdc", "revised_pdc"),
    ("actual date of completion", "actual_completion_date"),
    ("actual completion date", "actual_completion_date"),
    ("completion date", "actual_completion_date"),
    ("date of completion", "actual_completion_date"),
    ("name of firm", "firm_name"),
    ("firm name", "firm_name"),
    ("firmname", "firm_name"),
    ("contractor", "firm_name"),
    ("contractor name", "firm_name"),
    ("physical progress (%)", "physical_progress"),
    ("physical progress", "physical_progress"),
    ("progress (%)", "physical_progress"),
    ("progress %", "physical_progress"),
    ("% progress", "physical_progress"),
    ("progress", "physical_progress"),
    ("whether progress is one time of slow", "progress_status"),
    ("whether progress is on time of slow", "progress_status"),
    ("progress status", "progress_status"),
    ("status", "progress_status"),
    ("expdr booked upto 31.03.25", "expdr_upto_31mar25"),
    ("expdr booked upto 31.03.24", "expdr_upto_31mar25"),
    ("expdr booked upto 31 03 25", "expdr_upto_31mar25"),
    ("expenditure booked upto 31.03.25", "expdr_upto_31mar25"),
    ("expdr upto 31.03.25", "expdr_upto_31mar25"),
    ("expdr booked during cfy", "expdr_cfy"),
    ("expenditure booked during cfy", "expdr_cfy"),
    ("expdr during cfy", "expdr_cfy"),
    ("cfy expdr", "expdr_cfy"),
    ("total expd booked", "total_expdr"),
    ("total expdr booked", "total_expdr"),
    ("total expenditure", "total_expdr"),
    ("total expdr", "total_expdr"),
    ("%age of expdr", "percent_expdr"),
    ("percentage of expdr", "percent_expdr"),
    ("% of expdr", "percent_expdr"),
    ("expdr %", "percent_expdr"),
    ("expdr percentage", "percent_expdr"),
    ("remark", "remarks"),
    ("comments", "remarks"),
    ("notes", "remarks"),
    ("observation", "remarks"),
];

const HEADER_KEYWORDS: &[&str] = &[
    "s no",
    "s/no",
    "serial",
    "budget",
    "scheme",
    "name",
    "work",
    "agency",
    "amount",
    "date",
    "progress",
    "remarks",
    "aa/es",
    "pdc",
    "completion",
    "firm",
    "expdr",
    "ftr",
    "shq",
    "site",
];

const IMPORTANCE: &[&str] = &["scheme_name", "work_site", "sanctioned_amount"];

pub fn default_fields() -> Vec<FieldSpec> {
    FIELDS
        .iter()
        .map(|(name, kind)| FieldSpec::new(*name, *kind))
        .collect()
}

pub fn default_aliases() -> Vec<AliasEntry> {
    ALIASES
        .iter()
        .map(|(alias, field)| AliasEntry::new(*alias, *field))
        .collect()
}

pub fn default_header_keywords() -> Vec<String> {
    HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

pub fn default_importance() -> Vec<String> {
    IMPORTANCE.iter().map(|f| f.to_string()).collect()
}
