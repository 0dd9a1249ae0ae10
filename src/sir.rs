//! Reader for the tab-separated SIR export.
//!
//! Only CRLF ends a line. The export carries bare CR and LF characters
//! inside response text, so splitting on either alone would break rows.

use crate::config::READ_BUFFER_SIZE;
use memchr::memchr_iter;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::warn;

pub struct SirReader<R: Read> {
    reader: BufReader<R>,
    line: Vec<u8>,
    expected_cells: usize,
    line_no: u64,
}

impl SirReader<File> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> SirReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, inner),
            line: Vec::new(),
            expected_cells: 0,
            line_no: 0,
        }
    }

    /// Fills `self.line` up to and including the next CRLF. Returns false at
    /// end of stream with nothing read.
    fn read_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        loop {
            let n = self.reader.read_until(b'\n', &mut self.line)?;
            if n == 0 || self.line.ends_with(b"\r\n") {
                return Ok(!self.line.is_empty());
            }
        }
    }

    fn merge_overflow(&self, mut cells: Vec<String>) -> Vec<String> {
        let expected = self.expected_cells;
        if cells.len() > expected {
            // Keep n - 1 leading cells so the repaired row is exactly as wide
            // as the first row. Keeping n - 2 would leave it one cell short.
            let merged = cells[expected - 1..].join("\t");
            cells.truncate(expected - 1);
            cells.push(merged);
        } else if cells.len() < expected {
            warn!(
                line = self.line_no,
                expected,
                actual = cells.len(),
                "Invalid line (there may be a bad CR/LF pair in preceding cell data)"
            );
        }
        cells
    }
}

/// Splits one raw line into right-trimmed cells, decoding ISO-8859-1.
pub fn split_line(line: &[u8]) -> Vec<String> {
    let end = line
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |i| i + 1);
    let line = &line[..end];

    let mut cells = Vec::new();
    let mut start = 0;
    for tab in memchr_iter(b'\t', line).chain(std::iter::once(line.len())) {
        cells.push(decode_cell(&line[start..tab]));
        start = tab + 1;
    }
    cells
}

fn decode_cell(bytes: &[u8]) -> String {
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    let trimmed_len = text.trim_end().len();
    let mut text = text;
    text.truncate(trimmed_len);
    text
}

impl<R: Read> Iterator for SirReader<R> {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_line() {
            Ok(false) => return None,
            Ok(true) => {}
            Err(e) => return Some(Err(e)),
        }
        self.line_no += 1;

        let cells = split_line(&self.line);
        if self.expected_cells == 0 {
            self.expected_cells = cells.len();
            return Some(Ok(cells));
        }
        Some(Ok(self.merge_overflow(cells)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> Vec<Vec<String>> {
        SirReader::new(input).map(|r| r.unwrap()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn splits_on_tab_and_crlf() {
        let rows = parse(b"a\tb\tc\r\nd\te\tf\r\n");
        assert_eq!(rows, vec![row(&["a", "b", "c"]), row(&["d", "e", "f"])]);
    }

    #[test]
    fn bare_cr_and_lf_stay_in_cell() {
        let rows = parse(b"a\tb\r\nc\rd\te\nf\r\n");
        assert_eq!(rows, vec![row(&["a", "b"]), row(&["c\rd", "e\nf"])]);
    }

    #[test]
    fn cells_right_trimmed() {
        let rows = parse(b"  a  \tb \r\n");
        assert_eq!(rows, vec![row(&["  a", "b"])]);
    }

    #[test]
    fn final_line_without_terminator() {
        let rows = parse(b"a\tb\r\nc\td");
        assert_eq!(rows, vec![row(&["a", "b"]), row(&["c", "d"])]);
    }

    #[test]
    fn overflow_cells_merged() {
        let rows = parse(b"h1\th2\th3\th4\r\na\tb\tc\td\te\tf\r\n");
        assert_eq!(rows[1], row(&["a", "b", "c", "d\te\tf"]));
        assert_eq!(rows[1].len(), 4);
    }

    #[test]
    fn short_row_passed_through() {
        let rows = parse(b"h1\th2\th3\r\na\tb\r\n");
        assert_eq!(rows[1], row(&["a", "b"]));
    }

    #[test]
    fn latin1_decoded() {
        let rows = parse(b"\xa3100\tna\xefve\r\n");
        assert_eq!(rows, vec![row(&["\u{a3}100", "na\u{ef}ve"])]);
    }

    #[test]
    fn split_line_strips_terminators() {
        assert_eq!(split_line(b"x\ty\r\n"), row(&["x", "y"]));
        assert_eq!(split_line(b"\r\n"), row(&[""]));
    }
}
