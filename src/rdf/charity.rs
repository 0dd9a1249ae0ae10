//! Charity-centred tables: the register itself, main charity details,
//! names, and registration history.

use super::{is_digits, required, RecordMapper};
use crate::dates::{day_iri, lenient_day_iri, xsd_datetime, DateFormat};
use crate::models::Record;
use crate::turtle::{charity_iri, literal, typed_literal, Statement};
use anyhow::Result;
use sha1::{Digest, Sha1};
use std::fmt::Write;

fn curie(regno: &str) -> String {
    format!("charity:{}", regno)
}

/// `extract_charity`: one statement per charity or subsidiary.
///
/// Columns 9-17 hold the correspondence name, address, postcode, phone and
/// fax. They are never read.
#[derive(Default)]
pub struct CharityMapper;

pub fn charities() -> Box<dyn RecordMapper> {
    Box::new(CharityMapper)
}

impl RecordMapper for CharityMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;

        let mut st = match record.cell(1).filter(|sub| *sub != "0") {
            Some(_) => {
                let sub = charity_iri(regno, record.cell(1));
                out.push(Statement::new(curie(regno)).with("s:childOrganization", sub.clone()));
                Statement::new(sub)
                    .a("s:Organization")
                    .a("ont:Charity")
                    .with("s:parentOrganization", curie(regno))
            }
            None => Statement::new(curie(regno)).a("s:Organization").a("ont:Charity"),
        };

        st.add_literal("s:name", record.cell(2));
        if let Some(status) = record.cell(3) {
            let status = if status == "R" { "REGISTERED" } else { "REMOVED" };
            st.add("ont:registerStatus", format!("reg:{}", status));
        }
        st.add_literal("ont:governingDocument", record.cell(4));
        st.add_literal("ont:areaOfBenefit", record.cell(5));
        if record.cell(7) == Some("T") {
            st.add_type("ont:NhsCharity");
        }
        st.add_literal("ont:housingAssociationNumber", record.cell(8));

        out.push(st);
        Ok(())
    }
}

/// `extract_main_charity`: company link, financial year end, income, and
/// contact points.
#[derive(Default)]
pub struct MainCharityMapper;

pub fn main_charities() -> Box<dyn RecordMapper> {
    Box::new(MainCharityMapper)
}

fn hex_sha1(bytes: &[u8]) -> String {
    let digest = Sha1::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// `foaf:mbox_sha1sum` value: lowercase hex SHA-1 of `mailto:<address>`.
pub fn mbox_sha1sum(email: &str) -> String {
    hex_sha1(format!("mailto:{}", email.trim()).as_bytes())
}

impl RecordMapper for MainCharityMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let mut st = Statement::new(curie(regno)).a("ont:Charity");

        if let Some(company_no) = record.cell(1).map(str::trim).filter(|c| is_digits(c)) {
            st.add("owl:sameAs", format!("oc:{}", company_no));
        }

        // DDMM
        if let Some(fyend) = record.cell(3) {
            let day: String = fyend.chars().take(2).collect();
            let month: String = fyend.chars().skip(2).collect();
            if is_digits(&day) {
                st.add("ont:financialYearEndDayOfMonth", day);
            }
            if is_digits(&month) {
                st.add("ont:financialYearEndMonthOfYear", month);
            }
        }

        if let Some(income_day) = record.cell(5).and_then(lenient_day_iri) {
            st.add("ont:latestIncomeDate", income_day);
        }
        if let Some(income) = record.cell(6).filter(|i| is_digits(i)) {
            st.add("ont:latestIncome", typed_literal(income, "xsd:integer"));
        }

        if let Some(email) = record.cell(8) {
            st.add("foaf:mbox_sha1sum", literal(&mbox_sha1sum(email)));
        }
        if let Some(web) = record.cell(9) {
            st.add("s:url", typed_literal(web, "s:URL"));
        }

        out.push(st);
        Ok(())
    }
}

/// `extract_name`: working names of charities and subsidiaries.
#[derive(Default)]
pub struct NameMapper;

pub fn names() -> Box<dyn RecordMapper> {
    Box::new(NameMapper)
}

impl RecordMapper for NameMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let Some(name) = record.cell(3) else {
            return Ok(());
        };
        let name = literal(name);
        out.push(
            Statement::new(charity_iri(regno, record.cell(1)))
                .with("rdfs:label", name.clone())
                .with("s:name", name),
        );
        Ok(())
    }
}

/// `extract_registration`: registration and optional removal dates.
#[derive(Default)]
pub struct RegistrationMapper;

pub fn registrations() -> Box<dyn RecordMapper> {
    Box::new(RegistrationMapper)
}

impl RecordMapper for RegistrationMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let registered = required(record, 2, "registration date")?;

        let mut st = Statement::new(charity_iri(regno, record.cell(1))).a("ont:Charity");
        st.add(
            "ont:registrationDate",
            day_iri(registered, DateFormat::Seconds)?,
        );
        st.add(
            "ont:registrationDateTimestamp",
            typed_literal(
                &xsd_datetime(registered, DateFormat::Seconds)?,
                "xsd:dateTime",
            ),
        );
        if let Some(removed) = record.cell(3) {
            st.add("ont:removalDate", day_iri(removed, DateFormat::Seconds)?);
            st.add(
                "ont:removalDateTimestamp",
                typed_literal(&xsd_datetime(removed, DateFormat::Seconds)?, "xsd:dateTime"),
            );
            if let Some(code) = record.cell(4) {
                st.add("ont:removalReason", format!("rem:{}", code));
            }
        }

        out.push(st);
        Ok(())
    }
}

/// `extract_remove_ref`: removal reason codes.
#[derive(Default)]
pub struct RemovalReasonMapper;

pub fn removal_reasons() -> Box<dyn RecordMapper> {
    Box::new(RemovalReasonMapper)
}

impl RecordMapper for RemovalReasonMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let code = required(record, 0, "removal code")?;
        let mut st = Statement::new(format!("rem:{}", code)).a("ont:RemovalReason");
        st.add_literal("rdfs:label", record.cell(1));
        out.push(st);
        Ok(())
    }
}
