//! Charitable objects, which the export splits across numbered rows.

use super::{required, RecordMapper};
use crate::config::MAX_OBJECTIVE_CHUNKS;
use crate::models::Record;
use crate::turtle::{charity_iri, literal, Statement};
use anyhow::{bail, Context, Result};

/// Marker the export appends to every chunk that has a continuation.
const CONTINUATION_SUFFIX: &str = "0001";

/// Concatenates chunks in order, dropping the continuation marker from all
/// but the last chunk.
pub fn join_continuation(chunks: &[String]) -> String {
    let Some((last, rest)) = chunks.split_last() else {
        return String::new();
    };
    let mut joined = String::with_capacity(chunks.iter().map(String::len).sum());
    for chunk in rest {
        joined.push_str(chunk.strip_suffix(CONTINUATION_SUFFIX).unwrap_or(chunk));
    }
    joined.push_str(last);
    joined
}

/// `extract_objects`: rows for one charity arrive consecutively and their
/// sequence numbers place each chunk. The objective is emitted when the
/// charity changes and once more at end of input.
#[derive(Default)]
pub struct ObjectivesMapper {
    current: Option<String>,
    chunks: Vec<String>,
}

pub fn objectives() -> Box<dyn RecordMapper> {
    Box::new(ObjectivesMapper::default())
}

impl ObjectivesMapper {
    fn flush(&mut self, out: &mut Vec<Statement>) {
        if let Some(charity) = self.current.take() {
            if !self.chunks.is_empty() {
                out.push(
                    Statement::new(charity)
                        .with("ont:objective", literal(&join_continuation(&self.chunks))),
                );
            }
        }
        self.chunks.clear();
    }
}

impl RecordMapper for ObjectivesMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let charity = charity_iri(regno, record.cell(1));
        if self.current.as_deref() != Some(charity.as_str()) {
            self.flush(out);
            self.current = Some(charity);
        }

        let seq = required(record, 2, "sequence number")?;
        let index: usize = seq
            .trim()
            .parse()
            .with_context(|| format!("Invalid objective sequence number '{}'", seq))?;
        if index >= MAX_OBJECTIVE_CHUNKS {
            bail!(
                "Objective sequence number {} exceeds the limit of {} chunks",
                index,
                MAX_OBJECTIVE_CHUNKS
            );
        }
        if self.chunks.len() <= index {
            self.chunks.resize(index + 1, String::new());
        }
        self.chunks[index] = record.text(3).to_string();
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        self.flush(out);
        Ok(())
    }
}
