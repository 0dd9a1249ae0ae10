//! Streaming tokenizer for BCP exports.
//!
//! Cells are separated by `@**@` and rows terminated by `*@@*`. Both `@` and
//! `*` are also legal in the data, so each one triggers a three-byte
//! look-ahead; when the look-ahead does not complete a sentinel the bytes are
//! pushed back and re-scanned as ordinary text.
//!
//! Bytes are decoded as ISO-8859-1, which maps every byte to the Unicode
//! scalar of the same value.

use crate::config::READ_BUFFER_SIZE;
use crate::models::{Cell, Record};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{trace, warn};

const CELL_BREAK: [u8; 3] = *b"**@";
const ROW_BREAK: [u8; 3] = *b"@@*";

#[derive(Debug, Error)]
pub enum BcpError {
    #[error(
        "Unexpected cell count on row. Expected {expected} cells, got {actual}. Currently at byte {offset}"
    )]
    CellCount {
        expected: usize,
        actual: usize,
        offset: u64,
    },
    #[error("Failed to read BCP stream")]
    Io(#[from] io::Error),
}

/// Lazily yields one [`Record`] per `*@@*` terminated row.
///
/// The first row fixes the cell count for the stream; a later row of a
/// different width yields [`BcpError::CellCount`] and ends iteration. Content
/// after the last row terminator is discarded.
pub struct BcpReader<R: Read> {
    reader: BufReader<R>,
    pushback: VecDeque<u8>,
    cell: String,
    row: Vec<Cell>,
    expected_cells: usize,
    offset: u64,
    done: bool,
}

impl BcpReader<File> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> BcpReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, inner),
            pushback: VecDeque::with_capacity(3),
            cell: String::new(),
            row: Vec::new(),
            expected_cells: 0,
            offset: 0,
            done: false,
        }
    }

    /// Bytes consumed from the underlying stream so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushback.pop_front() {
            return Ok(Some(b));
        }
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let Some(&b) = buf.first() else {
                return Ok(None);
            };
            self.reader.consume(1);
            self.offset += 1;
            return Ok(Some(b));
        }
    }

    /// Reads up to three bytes; fewer are returned only at end of stream.
    fn look_ahead(&mut self) -> io::Result<([u8; 3], usize)> {
        let mut ahead = [0u8; 3];
        let mut len = 0;
        while len < ahead.len() {
            match self.next_byte()? {
                Some(b) => {
                    ahead[len] = b;
                    len += 1;
                }
                None => break,
            }
        }
        Ok((ahead, len))
    }

    fn unread(&mut self, bytes: &[u8]) {
        for &b in bytes.iter().rev() {
            self.pushback.push_front(b);
        }
    }

    fn close_cell(&mut self) {
        let trimmed = self.cell.trim_end();
        let cell = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.row.push(cell);
        self.cell.clear();
    }

    fn close_row(&mut self) -> Result<Record, BcpError> {
        self.close_cell();
        let row = std::mem::take(&mut self.row);
        if self.expected_cells == 0 {
            self.expected_cells = row.len();
            trace!(cells = self.expected_cells, "Row width fixed by first row");
        } else if row.len() != self.expected_cells {
            return Err(BcpError::CellCount {
                expected: self.expected_cells,
                actual: row.len(),
                offset: self.offset,
            });
        }
        Ok(Record::new(row))
    }

    fn next_record(&mut self) -> Result<Option<Record>, BcpError> {
        while let Some(b) = self.next_byte()? {
            if b != b'@' && b != b'*' {
                self.cell.push(char::from(b));
                continue;
            }

            let (ahead, len) = self.look_ahead()?;
            if len == 3 && b == b'@' && ahead == CELL_BREAK {
                self.close_cell();
            } else if len == 3 && b == b'*' && ahead == ROW_BREAK {
                return self.close_row().map(Some);
            } else {
                self.unread(&ahead[..len]);
                self.cell.push(char::from(b));
            }
        }

        if !self.cell.is_empty() || !self.row.is_empty() {
            warn!(
                cells = self.row.len(),
                pending_chars = self.cell.chars().count(),
                offset = self.offset,
                "Discarding unterminated row at end of BCP stream"
            );
        }
        Ok(None)
    }
}

impl<R: Read> Iterator for BcpReader<R> {
    type Item = Result<Record, BcpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<Vec<Option<String>>> {
        BcpReader::new(input.as_bytes())
            .map(|r| r.unwrap().into_cells())
            .collect()
    }

    fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|c| c.map(str::to_string)).collect()
    }

    #[test]
    fn single_row() {
        assert_eq!(parse("A@**@B*@@*"), vec![row(&[Some("A"), Some("B")])]);
    }

    #[test]
    fn empty_cell_is_absent() {
        assert_eq!(
            parse("A@**@@**@B*@@*"),
            vec![row(&[Some("A"), None, Some("B")])]
        );
    }

    #[test]
    fn literal_star_kept_when_look_ahead_fails() {
        assert_eq!(
            parse("A*XYZ@**@B*@@*"),
            vec![row(&[Some("A*XYZ"), Some("B")])]
        );
    }

    #[test]
    fn trailing_star_before_cell_break() {
        assert_eq!(
            parse("PENLLYN PARISH*@**@@**@F@**@*@@*"),
            vec![row(&[Some("PENLLYN PARISH*"), None, Some("F"), None])]
        );
    }

    #[test]
    fn trailing_whitespace_trimmed() {
        assert_eq!(
            parse("200000@**@0@**@1961-06-08 00:00:00@**@1998-02-04 16:28:00@**@CE *@@*"),
            vec![row(&[
                Some("200000"),
                Some("0"),
                Some("1961-06-08 00:00:00"),
                Some("1998-02-04 16:28:00"),
                Some("CE"),
            ])]
        );
    }

    #[test]
    fn whitespace_only_cell_is_absent() {
        assert_eq!(parse("A@**@   *@@*"), vec![row(&[Some("A"), None])]);
    }

    #[test]
    fn leading_whitespace_kept() {
        assert_eq!(parse("  A *@@*"), vec![row(&[Some("  A")])]);
    }

    #[test]
    fn multiple_rows() {
        let input = "200002@**@0@**@1961-06-08 00:00:00@**@@**@*@@*\
                     200003@**@0@**@1961-06-08 00:00:00@**@2009-09-09 01:06:00@**@NO *@@*";
        assert_eq!(
            parse(input),
            vec![
                row(&[
                    Some("200002"),
                    Some("0"),
                    Some("1961-06-08 00:00:00"),
                    None,
                    None
                ]),
                row(&[
                    Some("200003"),
                    Some("0"),
                    Some("1961-06-08 00:00:00"),
                    Some("2009-09-09 01:06:00"),
                    Some("NO"),
                ]),
            ]
        );
    }

    #[test]
    fn lone_at_is_literal() {
        assert_eq!(
            parse("201415@**@1@**@1830.;@**@@@**@@**@F@**@*@@*"),
            vec![row(&[
                Some("201415"),
                Some("1"),
                Some("1830.;"),
                Some("@"),
                None,
                Some("F"),
                None,
            ])]
        );
    }

    #[test]
    fn star_semicolon_is_literal() {
        assert_eq!(
            parse("217855@**@AS VARIED BY SCHEME*;@**@PENLLYN PARISH*@@*"),
            vec![row(&[
                Some("217855"),
                Some("AS VARIED BY SCHEME*;"),
                Some("PENLLYN PARISH"),
            ])]
        );
    }

    #[test]
    fn overlapping_sentinel_prefix_rescanned() {
        // "@@**@" is a literal '@' followed by a cell break
        assert_eq!(parse("x@@**@y*@@*"), vec![row(&[Some("x@"), Some("y")])]);
        // "**@@*" is a literal '*' followed by a row break
        assert_eq!(parse("x**@@*"), vec![row(&[Some("x*")])]);
    }

    #[test]
    fn text_without_sentinels_yields_nothing() {
        assert!(parse("plain text with no markers").is_empty());
    }

    #[test]
    fn unterminated_final_row_is_dropped() {
        // Data after the last row terminator never reaches the caller.
        assert_eq!(parse("A@**@B*@@*C@**@D"), vec![row(&[Some("A"), Some("B")])]);
    }

    #[test]
    fn short_look_ahead_at_end_of_stream() {
        assert_eq!(parse("A*@@*B@*"), vec![row(&[Some("A")])]);
        assert_eq!(parse("A*@@"), Vec::<Vec<Option<String>>>::new());
    }

    #[test]
    fn latin1_bytes_decoded() {
        let bytes = b"caf\xe9 \xa35*@@*".to_vec();
        let rows: Vec<_> = BcpReader::new(bytes.as_slice())
            .map(|r| r.unwrap().into_cells())
            .collect();
        assert_eq!(rows, vec![row(&[Some("caf\u{e9} \u{a3}5")])]);
    }

    #[test]
    fn cell_count_mismatch_is_fatal() {
        let mut reader = BcpReader::new("A@**@B*@@*C*@@*D@**@E*@@*".as_bytes());
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(BcpError::CellCount {
                expected,
                actual,
                offset,
            })) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
                assert_eq!(offset, 15);
            }
            other => panic!("expected cell count error, got {:?}", other),
        }
        // Iteration stops after the error rather than skipping the bad row.
        assert!(reader.next().is_none());
    }

    #[test]
    fn wider_row_is_also_fatal() {
        let results: Vec<_> = BcpReader::new("A*@@*B@**@C*@@*".as_bytes()).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[1],
            Err(BcpError::CellCount {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn offset_counts_consumed_bytes() {
        let mut reader = BcpReader::new("AB*@@*".as_bytes());
        reader.next().unwrap().unwrap();
        assert_eq!(reader.offset(), 6);
    }
}
