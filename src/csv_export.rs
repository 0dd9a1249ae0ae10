//! Flat CSV rendition of the exports, one row per record.

use crate::bcp::BcpReader;
use crate::config::CSV_FLUSH_INTERVAL;
use crate::models::Record;
use crate::sir::SirReader;
use anyhow::Result;
use csv::{Terminator, WriterBuilder};
use std::io::{Read, Write};
use tracing::debug;

/// Writes every record as a CSV row and returns the number of rows written.
///
/// Absent cells are written as empty fields. Rows may differ in width, which
/// the SIR export produces for lines it could not repair.
pub fn write_csv<I, E, W>(records: I, writer: W) -> Result<u64>
where
    I: IntoIterator<Item = Result<Record, E>>,
    E: Into<anyhow::Error>,
    W: Write,
{
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::CRLF)
        .from_writer(writer);

    let mut rows = 0u64;
    for record in records {
        let record = record.map_err(Into::<anyhow::Error>::into)?;
        writer.write_record(record.cells().iter().map(|c| c.as_deref().unwrap_or("")))?;
        rows += 1;
        if rows % CSV_FLUSH_INTERVAL == 0 {
            writer.flush()?;
            debug!(rows, "Flushed CSV output");
        }
    }

    writer.flush()?;
    Ok(rows)
}

pub fn bcp_to_csv<R: Read, W: Write>(reader: R, writer: W) -> Result<u64> {
    write_csv(BcpReader::new(reader), writer)
}

pub fn sir_to_csv<R: Read, W: Write>(reader: R, writer: W) -> Result<u64> {
    write_csv(SirReader::new(reader).map(|r| r.map(Record::from)), writer)
}
