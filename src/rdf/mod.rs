//! Per-table mapping from export records to Turtle statements.
//!
//! The exports carry no headers, so every mapper addresses cells by
//! position. [`TABLES`] lists which source file feeds which mapper and which
//! Turtle file it produces.

pub mod areas;
pub mod charity;
pub mod classes;
pub mod objectives;
pub mod returns;
pub mod sir;

use crate::models::Record;
use crate::turtle::Statement;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Converts records of one table into statements.
///
/// Mappers may hold state across records (e.g. objectives split over
/// several rows); `finish` emits whatever is still pending once the input is
/// exhausted.
pub trait RecordMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()>;

    fn finish(&mut self, _out: &mut Vec<Statement>) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Bcp,
    Sir,
}

#[derive(Serialize)]
pub struct TableSpec {
    pub source: &'static str,
    pub output: &'static str,
    pub format: SourceFormat,
    pub description: &'static str,
    #[serde(skip)]
    pub mapper: fn() -> Box<dyn RecordMapper>,
}

impl TableSpec {
    pub fn new_mapper(&self) -> Box<dyn RecordMapper> {
        (self.mapper)()
    }
}

/// Tables converted in RDF mode, in processing order. Trustee names are
/// personal data and are not published.
pub static TABLES: &[TableSpec] = &[
    TableSpec {
        source: "extract_acct_submit.bcp",
        output: "acct_submit.ttl",
        format: SourceFormat::Bcp,
        description: "Accounts submissions",
        mapper: returns::account_submissions,
    },
    TableSpec {
        source: "extract_aoo_ref.bcp",
        output: "aoo_ref.ttl",
        format: SourceFormat::Bcp,
        description: "Area of operation reference data",
        mapper: areas::area_reference,
    },
    TableSpec {
        source: "extract_ar_submit.bcp",
        output: "ar_submit.ttl",
        format: SourceFormat::Bcp,
        description: "Annual return submissions",
        mapper: returns::annual_return_submissions,
    },
    TableSpec {
        source: "extract_charity.bcp",
        output: "charity.ttl",
        format: SourceFormat::Bcp,
        description: "Registered charities and subsidiaries",
        mapper: charity::charities,
    },
    TableSpec {
        source: "extract_charity_aoo.bcp",
        output: "charity_aoo.ttl",
        format: SourceFormat::Bcp,
        description: "Charity areas of operation",
        mapper: areas::charity_areas,
    },
    TableSpec {
        source: "extract_class.bcp",
        output: "class.ttl",
        format: SourceFormat::Bcp,
        description: "Charity classifications",
        mapper: classes::classifications,
    },
    TableSpec {
        source: "extract_class_ref.bcp",
        output: "class_ref.ttl",
        format: SourceFormat::Bcp,
        description: "Classification reference data",
        mapper: classes::class_reference,
    },
    TableSpec {
        source: "extract_financial.bcp",
        output: "financial.ttl",
        format: SourceFormat::Bcp,
        description: "Financial year summaries",
        mapper: returns::financial_summaries,
    },
    TableSpec {
        source: "extract_main_charity.bcp",
        output: "main_charity.ttl",
        format: SourceFormat::Bcp,
        description: "Main charity details",
        mapper: charity::main_charities,
    },
    TableSpec {
        source: "extract_name.bcp",
        output: "name.ttl",
        format: SourceFormat::Bcp,
        description: "Charity names",
        mapper: charity::names,
    },
    TableSpec {
        source: "extract_objects.bcp",
        output: "objectives.ttl",
        format: SourceFormat::Bcp,
        description: "Charitable objects",
        mapper: objectives::objectives,
    },
    TableSpec {
        source: "extract_partb.bcp",
        output: "partb.ttl",
        format: SourceFormat::Bcp,
        description: "Annual return part B financials",
        mapper: returns::part_b,
    },
    TableSpec {
        source: "extract_registration.bcp",
        output: "registration.ttl",
        format: SourceFormat::Bcp,
        description: "Registration and removal history",
        mapper: charity::registrations,
    },
    TableSpec {
        source: "extract_remove_ref.bcp",
        output: "remove_ref.ttl",
        format: SourceFormat::Bcp,
        description: "Removal reason reference data",
        mapper: charity::removal_reasons,
    },
    TableSpec {
        source: "sir_data.bcp",
        output: "sir_data.ttl",
        format: SourceFormat::Sir,
        description: "Summary information returns",
        mapper: sir::summary_information,
    },
];

pub fn find_table(source: &str) -> Option<&'static TableSpec> {
    TABLES.iter().find(|t| t.source == source)
}

/// Cell that must be present for the record to be mapped.
pub(crate) fn required<'a>(record: &'a Record, index: usize, field: &str) -> Result<&'a str> {
    record
        .cell(index)
        .with_context(|| format!("Missing {} in column {}", field, index))
}

/// True for a non-empty run of ASCII digits.
pub(crate) fn is_digits(s: &str) -> bool {
    DIGITS_REGEX.is_match(s)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_sources_are_unique() {
        let mut sources: Vec<_> = TABLES.iter().map(|t| t.source).collect();
        sources.sort_unstable();
        sources.dedup();
        assert_eq!(sources.len(), TABLES.len());
    }

    #[test]
    fn trustee_table_not_published() {
        assert!(find_table("extract_trustee.bcp").is_none());
    }

    #[test]
    fn only_sir_table_uses_sir_format() {
        let sir: Vec<_> = TABLES
            .iter()
            .filter(|t| t.format == SourceFormat::Sir)
            .map(|t| t.source)
            .collect();
        assert_eq!(sir, vec!["sir_data.bcp"]);
    }

    #[test]
    fn catalogue_serializes_without_mapper() {
        let json = serde_json::to_value(find_table("extract_name.bcp").unwrap()).unwrap();
        assert_eq!(json["output"], "name.ttl");
        assert_eq!(json["format"], "bcp");
        assert!(json.get("mapper").is_none());
    }

    #[test]
    fn required_reports_column() {
        let r = test_support::record(&[Some("1"), None]);
        assert_eq!(required(&r, 0, "regno").unwrap(), "1");
        let err = required(&r, 1, "subno").unwrap_err();
        assert!(err.to_string().contains("column 1"));
    }

    #[test]
    fn digits_check() {
        assert!(is_digits("01234"));
        assert!(!is_digits(""));
        assert!(!is_digits("SC01234"));
        assert!(!is_digits("12 34"));
    }
}
