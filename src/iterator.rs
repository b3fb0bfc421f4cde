//! Constant-memory traversal of an ACH file, one entry at a time.
//!
//! The iterator only parses structure. It never computes hashes or totals
//! and never checks business rules, so it can scan files that would fail
//! validation. Memory use is bounded by one pending entry and one
//! lookahead line.

use crate::codes::{MIXED_DEBITS_AND_CREDITS, SecCode};
use crate::error::{FieldError, FileError, Result};
use crate::records::addenda::addenda_type_code;
use crate::records::iat_batch_header::is_iat_batch_header;
use crate::records::{
    record_type, Addenda02, Addenda05, Addenda98, Addenda99, BatchHeader, EntryDetail, ADDENDA,
    BATCH_CONTROL, BATCH_HEADER, ENTRY_DETAIL, FILE_CONTROL, FILE_HEADER,
};
use log::{debug, warn};
use std::io::BufRead;

enum State {
    /// No entry in progress.
    AwaitingLine,

    /// An entry is parsed and collecting its addenda.
    HaveEntry(Box<EntryDetail>),

    /// Source exhausted or failed.
    Done,
}

/// Yields `(batch header, entry)` pairs in file order.
///
/// IAT and ADV batches are skipped, since their entries use other
/// layouts. An entry found before any batch header is
/// paired with a synthesized PPD header so corrupt files can still be
/// scanned.
pub struct EntryIterator<R> {
    source: R,
    pushback: Option<String>,
    header: Option<BatchHeader>,
    skipping: bool,
    state: State,
    line_number: usize,
}

impl<R: BufRead> EntryIterator<R> {
    /// Creates an iterator positioned before the first line of `source`.
    pub fn new(source: R) -> Self {
        EntryIterator {
            source,
            pushback: None,
            header: None,
            skipping: false,
            state: State::AwaitingLine,
            line_number: 0,
        }
    }

    /// Returns the next entry with its batch header, or `None` once the
    /// source is exhausted.
    pub fn next_entry(&mut self) -> Result<Option<(BatchHeader, EntryDetail)>> {
        loop {
            if matches!(self.state, State::Done) {
                return Ok(None);
            }
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(self.finish()),
                Err(e) => {
                    self.state = State::Done;
                    return Err(e);
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match record_type(&line) {
                Some(FILE_HEADER) => {}
                Some(BATCH_HEADER) => {
                    if let Some(entry) = self.flush(line) {
                        return Ok(Some(entry));
                    }
                    let line = self.pushback.take().unwrap_or_default();
                    self.start_batch(&line)?;
                }
                Some(ENTRY_DETAIL) => {
                    if self.skipping {
                        continue;
                    }
                    if let Some(entry) = self.flush(line) {
                        return Ok(Some(entry));
                    }
                    let line = self.pushback.take().unwrap_or_default();
                    if self.header.is_none() {
                        warn!(
                            "line {}: entry detail before any batch header, assuming PPD",
                            self.line_number
                        );
                        self.header = Some(fallback_header());
                    }
                    let entry = EntryDetail::parse(&line).map_err(|e| self.record_error(e))?;
                    self.state = State::HaveEntry(Box::new(entry));
                }
                Some(ADDENDA) => {
                    if self.skipping {
                        continue;
                    }
                    self.attach_addenda(&line)?;
                }
                Some(BATCH_CONTROL) | Some(FILE_CONTROL) => {
                    if let Some(entry) = self.flush(line) {
                        return Ok(Some(entry));
                    }
                    let line = self.pushback.take().unwrap_or_default();
                    if record_type(&line) == Some(BATCH_CONTROL) {
                        self.header = None;
                        self.skipping = false;
                    }
                }
                Some(other) => {
                    warn!(
                        "line {}: unknown record type {:?} ignored",
                        self.line_number, other
                    );
                }
                None => {}
            }
        }
    }

    /// Reads the pushed-back line if there is one, else the next source line.
    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pushback.take() {
            return Ok(Some(line));
        }
        let mut line = String::new();
        if self.source.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Emits the pending entry, if any, pushing `line` back for the next
    /// call. Without a pending entry the line is parked in the pushback
    /// slot for the caller to take.
    fn flush(&mut self, line: String) -> Option<(BatchHeader, EntryDetail)> {
        self.pushback = Some(line);
        match std::mem::replace(&mut self.state, State::AwaitingLine) {
            State::HaveEntry(entry) => {
                let header = self.header.clone().unwrap_or_else(fallback_header);
                Some((header, *entry))
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    fn finish(&mut self) -> Option<(BatchHeader, EntryDetail)> {
        match std::mem::replace(&mut self.state, State::Done) {
            State::HaveEntry(entry) => {
                let header = self.header.clone().unwrap_or_else(fallback_header);
                Some((header, *entry))
            }
            _ => None,
        }
    }

    fn start_batch(&mut self, line: &str) -> Result<()> {
        if is_iat_batch_header(line) {
            warn!("line {}: skipping IAT batch", self.line_number);
            self.skipping = true;
            self.header = None;
            return Ok(());
        }
        let header = BatchHeader::parse(line).map_err(|e| self.record_error(e))?;
        if header.standard_entry_class_code.trim() == SecCode::Adv.as_str() {
            warn!("line {}: skipping ADV batch", self.line_number);
            self.skipping = true;
            self.header = None;
            return Ok(());
        }
        self.skipping = false;
        debug!(
            "line {}: batch {} ({})",
            self.line_number, header.batch_number, header.standard_entry_class_code
        );
        self.header = Some(header);
        Ok(())
    }

    fn attach_addenda(&mut self, line: &str) -> Result<()> {
        let line_number = self.line_number;
        let entry = match &mut self.state {
            State::HaveEntry(entry) => entry,
            _ => {
                warn!("line {}: addenda without an entry ignored", line_number);
                return Ok(());
            }
        };
        let record = |e: FieldError| FileError::Record {
            line: line_number,
            source: e,
        };
        match addenda_type_code(line) {
            "02" => entry.addenda02 = Some(Addenda02::parse(line).map_err(record)?),
            "05" => entry.addenda05.push(Addenda05::parse(line).map_err(record)?),
            "98" => entry.addenda98 = Some(Addenda98::parse(line).map_err(record)?),
            "99" => entry.addenda99 = Some(Addenda99::parse(line).map_err(record)?),
            other => warn!(
                "line {}: addenda type {:?} ignored",
                line_number, other
            ),
        }
        Ok(())
    }

    fn record_error(&self, source: FieldError) -> FileError {
        FileError::Record {
            line: self.line_number,
            source,
        }
    }
}

impl<R: BufRead> Iterator for EntryIterator<R> {
    type Item = Result<(BatchHeader, EntryDetail)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_entry() {
            Ok(entry) => entry.map(Ok),
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}

/// Header given to entries that appear outside any batch.
fn fallback_header() -> BatchHeader {
    BatchHeader {
        service_class_code: MIXED_DEBITS_AND_CREDITS,
        standard_entry_class_code: SecCode::Ppd.to_string(),
        ..BatchHeader::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::mock_header;
    use crate::codes::{AUTOMATED_ACCOUNTING_ADVICES, DEBIT_FOR_CREDITS_ORIGINATED};
    use crate::file::tests::mock_file;
    use crate::records::{AdvBatchControl, AdvEntryDetail};
    use crate::writer::file_lines;
    use std::io::Cursor;

    fn collect(text: &str) -> Vec<(BatchHeader, EntryDetail)> {
        EntryIterator::new(Cursor::new(text.to_string()))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_yields_each_entry_once() {
        let text = file_lines(&mock_file()).join("\n");
        let entries = collect(&text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0.batch_number, 1);
        assert_eq!(entries[1].0.batch_number, 2);
        assert_eq!(entries[1].1.transaction_code, 27);
    }

    #[test]
    fn test_entry_before_header_gets_fallback() {
        let file = mock_file();
        let entry_line = file.batches()[0].entries()[0].to_string();
        let entries = collect(&format!("\n{}\n   \n", entry_line));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.standard_entry_class_code, "PPD");
        assert_eq!(entries[0].1.amount, 100_000);
    }

    #[test]
    fn test_addenda_attach_before_emit() {
        let file = mock_file();
        let batch = &file.batches()[0];
        let mut entry = batch.entries()[0].clone();
        entry.addenda05.push(Addenda05 {
            payment_related_information: "memo".to_string(),
            sequence_number: 1,
            entry_detail_sequence_number: 1,
        });
        let mut lines = vec![batch.header().to_string()];
        lines.extend(entry.lines());
        lines.push(batch.control().to_string());
        let entries = collect(&lines.join("\r\n"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.addenda05[0].payment_related_information, "memo");
    }

    #[test]
    fn test_adv_batches_are_skipped() {
        let mut header = mock_header("ADV");
        header.service_class_code = AUTOMATED_ACCOUNTING_ADVICES;
        header.batch_number = 3;
        let advice = AdvEntryDetail::new(
            DEBIT_FOR_CREDITS_ORIGINATED,
            "231380104",
            "744-5678-99",
            12_345_678_901,
        );
        let mut lines = vec![
            header.to_string(),
            advice.to_string(),
            AdvBatchControl::default().to_string(),
        ];
        lines.extend(file_lines(&mock_file()).into_iter().skip(1));

        let entries = collect(&lines.join("\n"));
        let batches: Vec<u32> = entries.iter().map(|(h, _)| h.batch_number).collect();
        assert_eq!(batches, vec![1, 2]);
        assert!(entries.iter().all(|(_, e)| e.amount == 100_000));
    }

    #[test]
    fn test_malformed_numeric_is_reported_with_line() {
        let mut line = mock_file().batches()[0].entries()[0].to_string();
        line.replace_range(29..39, "12345abcde");
        let mut iter = EntryIterator::new(Cursor::new(line));
        match iter.next() {
            Some(Err(crate::error::AchError::File(FileError::Record { line, source }))) => {
                assert_eq!(line, 1);
                assert_eq!(source.field_name, "Amount");
            }
            _ => panic!("expected a record error"),
        }
        assert!(iter.next().is_none());
    }
}
