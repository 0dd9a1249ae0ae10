//! Accounts, annual returns and financial figures.
//!
//! Every date in these tables is required; a malformed one fails the record.

use super::{required, RecordMapper};
use crate::dates::{day_iri, parse_datetime, xsd_datetime, DateFormat};
use crate::models::Record;
use crate::turtle::{charity_iri, charity_resource, literal, typed_literal, Statement};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap());

/// Adds the day identifier and timestamp pair for one date column.
fn add_date(
    st: &mut Statement,
    day_predicate: &str,
    timestamp_predicate: &str,
    value: &str,
    format: DateFormat,
) -> Result<()> {
    st.add(day_predicate, day_iri(value, format)?);
    st.add(
        timestamp_predicate,
        typed_literal(&xsd_datetime(value, format)?, "xsd:dateTime"),
    );
    Ok(())
}

fn return_cycle(cycle: &str) -> String {
    charity_resource(&format!("returnCycle/{}", cycle))
}

/// `extract_acct_submit`: only rows with every column filled are mapped.
#[derive(Default)]
pub struct AccountSubmissionMapper;

pub fn account_submissions() -> Box<dyn RecordMapper> {
    Box::new(AccountSubmissionMapper)
}

impl RecordMapper for AccountSubmissionMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        if !record.is_complete() {
            return Ok(());
        }
        let regno = record.text(0);
        let submitted = record.text(1);
        let cycle = record.text(2);
        let accounts = charity_resource(&format!("{}/accounts/{}", regno, cycle));

        let mut submission =
            Statement::new(charity_resource(&format!("{}/accounts/{}/submission", regno, cycle)))
                .a("ont:AccountsSubmission");
        add_date(
            &mut submission,
            "ont:submissionDate",
            "ont:submissionTimestamp",
            submitted,
            DateFormat::Seconds,
        )?;
        submission.add("ont:submittedAccounts", accounts.clone());
        out.push(submission);

        out.push(
            Statement::new(accounts)
                .a("ont:FinancialAccounts")
                .with("ont:returnCycle", return_cycle(cycle)),
        );
        Ok(())
    }
}

/// `extract_ar_submit`: only rows with every column filled are mapped.
#[derive(Default)]
pub struct AnnualReturnSubmissionMapper;

pub fn annual_return_submissions() -> Box<dyn RecordMapper> {
    Box::new(AnnualReturnSubmissionMapper)
}

impl RecordMapper for AnnualReturnSubmissionMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        if !record.is_complete() {
            return Ok(());
        }
        let regno = record.text(0);
        let cycle = record.text(1);
        let submitted = record.text(2);
        let annual_return = charity_resource(&format!("{}/annualReturn/{}", regno, cycle));

        let mut submission = Statement::new(charity_resource(&format!(
            "{}/annualReturn/{}/submission",
            regno, cycle
        )))
        .a("ont:AnnualReturnSubmission");
        add_date(
            &mut submission,
            "ont:submissionDate",
            "ont:submissionTimestamp",
            submitted,
            DateFormat::Seconds,
        )?;
        submission.add("ont:submittedReturn", annual_return.clone());
        out.push(submission);

        out.push(
            Statement::new(annual_return)
                .a("ont:AnnualReturn")
                .with("ont:returnCycle", return_cycle(cycle)),
        );
        Ok(())
    }
}

/// `extract_financial`: one summary per charity and financial year end.
#[derive(Default)]
pub struct FinancialSummaryMapper;

pub fn financial_summaries() -> Box<dyn RecordMapper> {
    Box::new(FinancialSummaryMapper)
}

impl RecordMapper for FinancialSummaryMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let start = required(record, 1, "financial year start")?;
        let end = required(record, 2, "financial year end")?;
        let end_year = parse_datetime(end, DateFormat::Seconds)?.year();
        let summary = charity_resource(&format!("{}/financialSummary/{}", regno, end_year));

        let mut st = Statement::new(summary.clone()).a("ont:FinancialSummary");
        add_date(
            &mut st,
            "ont:financialYearStart",
            "ont:financialYearStartTimestamp",
            start,
            DateFormat::Seconds,
        )?;
        add_date(
            &mut st,
            "ont:financialYearEnd",
            "ont:financialYearEndTimestamp",
            end,
            DateFormat::Seconds,
        )?;
        if let Some(income) = record.cell(3) {
            st.add("ont:income", typed_literal(income, "xsd:integer"));
        }
        if let Some(expenditure) = record.cell(4) {
            st.add("ont:expenditure", typed_literal(expenditure, "xsd:integer"));
        }
        out.push(st);

        out.push(
            Statement::new(charity_iri(regno, None)).with("ont:financialSummary", summary),
        );
        Ok(())
    }
}

/// Part B figures, in column order starting at column 4.
pub const PART_B_FIGURES: &[&str] = &[
    "ont:legaciesIncome",
    "ont:endowmentsIncome",
    "ont:voluntaryIncome",
    "ont:activitiesGeneratingFunds",
    "ont:charitableActivitiesIncome",
    "ont:investmentIncome",
    "ont:otherIncome",
    "ont:totalIncome",
    "ont:investmentGain",
    "ont:assetGain",
    "ont:pensionGain",
    "ont:voluntaryIncomeCosts",
    "ont:fundraisingTradingCosts",
    "ont:investmentManagementCosts",
    "ont:grantsToInstitutions",
    "ont:charitableActivitiesCosts",
    "ont:governanceCosts",
    "ont:otherExpenditure",
    "ont:totalExpenditure",
    "ont:supportCosts",
    "ont:depreciation",
    "ont:reserves",
    "ont:fixedAssetsYearStart",
    "ont:fixedAssets",
    "ont:fixedInvestmentsAssets",
    "ont:fixedInvestmentsAssetsYearStart",
    "ont:currentInvestmentsAssets",
    "ont:cashAssets",
    "ont:currentAssets",
    "ont:creditors",
    "ont:longTermCreditors",
    "ont:pensionAssets",
    "ont:totalAssets",
    "ont:endowmentFunds",
    "ont:restrictedFunds",
    "ont:unrestrictedFunds",
    "ont:totalFunds",
    "ont:employees",
    "ont:volunteers",
];

const PART_B_FIRST_FIGURE: usize = 4;
const PART_B_CONSOLIDATED: usize = 42;
const PART_B_CHARITY_ONLY: usize = 43;

/// `extract_partb`: detailed annual return financials.
///
/// The figure columns are declared as text but hold integers, so numeric
/// values are written unquoted.
#[derive(Default)]
pub struct PartBMapper;

pub fn part_b() -> Box<dyn RecordMapper> {
    Box::new(PartBMapper)
}

impl RecordMapper for PartBMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let cycle = required(record, 1, "return cycle")?;
        let start = required(record, 2, "financial year start")?;
        let end = required(record, 3, "financial year end")?;

        let mut st = Statement::new(charity_resource(&format!(
            "{}/annualReturn/{}",
            regno, cycle
        )))
        .a("ont:AnnualReturn");
        st.add("ont:submittedBy", charity_iri(regno, None));
        add_date(
            &mut st,
            "ont:financialYearStart",
            "ont:financialYearStartTimestamp",
            start,
            DateFormat::Fractional,
        )?;
        add_date(
            &mut st,
            "ont:financialYearEnd",
            "ont:financialYearEndTimestamp",
            end,
            DateFormat::Fractional,
        )?;

        for (i, predicate) in PART_B_FIGURES.iter().enumerate() {
            if let Some(value) = record.cell(PART_B_FIRST_FIGURE + i) {
                if NUMBER_REGEX.is_match(value) {
                    st.add(predicate, value);
                } else {
                    st.add(predicate, literal(value));
                }
            }
        }

        let flag = |index| {
            if record.cell(index) == Some("T") {
                "true"
            } else {
                "false"
            }
        };
        st.add("ont:consolidatedAccounts", flag(PART_B_CONSOLIDATED));
        st.add("ont:charityOnlyAccounts", flag(PART_B_CHARITY_ONLY));

        out.push(st);
        Ok(())
    }
}
