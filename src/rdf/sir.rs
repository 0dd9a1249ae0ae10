//! Summary Information Return answers from the tab-separated SIR export.

use super::RecordMapper;
use crate::models::Record;
use crate::turtle::{charity_iri, charity_resource, Statement};
use anyhow::Result;
use rustc_hash::FxHashSet;
use tracing::warn;

const MIN_CELLS: usize = 6;
const MAX_CELLS: usize = 7;

/// Columns: 0 regno, 1 charity name (unused), 2 return cycle, 3 question
/// number, 4 question text, 5 response, 6 response overflow.
#[derive(Default)]
pub struct SummaryInformationMapper {
    last_return: Option<String>,
    described: FxHashSet<(String, String)>,
}

pub fn summary_information() -> Box<dyn RecordMapper> {
    Box::new(SummaryInformationMapper::default())
}

/// Response text, joining the overflow column back on with the CR it was
/// split at.
fn response_text(record: &Record) -> Option<String> {
    let first = record.text(5);
    let overflow = record.text(6);
    if !first.is_empty() {
        if record.len() == MIN_CELLS {
            Some(first.to_string())
        } else {
            Some(format!("{}\r{}", first, overflow))
        }
    } else if !overflow.is_empty() {
        Some(overflow.to_string())
    } else {
        None
    }
}

impl RecordMapper for SummaryInformationMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        if record.len() < MIN_CELLS || record.len() > MAX_CELLS {
            warn!(
                cells = record.len(),
                "Skipping row with unexpected number of columns (expected 6 or 7)"
            );
            return Ok(());
        }

        let regno = record.text(0);
        let cycle = record.text(2);
        let question_no = record.text(3);

        let return_id = charity_resource(&format!("{}/summaryInformationReturn/{}", regno, cycle));
        if self.last_return.as_deref() != Some(return_id.as_str()) {
            out.push(
                Statement::new(return_id.clone())
                    .a("ont:SummaryInformationReturn")
                    .with("ont:submittedBy", charity_iri(regno, None))
                    .with("ont:sirCycle", charity_resource(&format!("sirCycle/{}", cycle))),
            );
            self.last_return = Some(return_id);
        }

        let question_id = charity_resource(&format!(
            "summaryInformationQuestion/{}/{}",
            cycle, question_no
        ));
        if self
            .described
            .insert((cycle.to_string(), question_no.to_string()))
        {
            let mut question = Statement::new(question_id.clone()).a("ont:SummaryInformationQuestion");
            question.add_literal("ont:questionText", record.cell(4));
            out.push(question);
        }

        let mut response = Statement::new(charity_resource(&format!(
            "{}/summaryInformationResponse/{}/{}",
            regno, cycle, question_no
        )))
        .a("ont:SummaryInformationResponse")
        .with("ont:question", question_id);
        response.add_literal("ont:responseText", response_text(record).as_deref());
        out.push(response);
        Ok(())
    }
}
