//! Parses NACHA text into a [`File`].
//!
//! The reader enforces record structure (order, nesting, lengths) and
//! field syntax. It does not validate: call `File::validate` on the
//! result to check controls and business rules.

use crate::batch::Batch;
use crate::codec::RECORD_LENGTH;
use crate::error::{AchError, FieldError, FileError, Result};
use crate::file::File;
use crate::iat_batch::IatBatch;
use crate::records::addenda::addenda_type_code;
use crate::records::iat_batch_header::is_iat_batch_header;
use crate::records::{
    record_type, Addenda02, Addenda05, Addenda10, Addenda11, Addenda12, Addenda13, Addenda14,
    Addenda15, Addenda16, Addenda17, Addenda18, Addenda98, Addenda99, AdvBatchControl,
    AdvEntryDetail, AdvFileControl, BatchControl, BatchHeader, EntryDetail, FileControl,
    FileHeader, IatBatchHeader, IatEntryDetail, ADDENDA, BATCH_CONTROL, BATCH_HEADER,
    ENTRY_DETAIL, FILE_CONTROL, FILE_HEADER,
};
use log::debug;
use std::io::BufRead;

/// The batch currently between its header and control.
enum OpenBatch {
    Standard(Batch),
    Iat(IatBatch),
}

pub struct Reader<R> {
    source: R,
    line_number: usize,
    file: Option<File>,
    open: Option<OpenBatch>,
    control_seen: bool,
}

impl<R: BufRead> Reader<R> {
    /// Creates a reader over a line source.
    pub fn new(source: R) -> Self {
        Reader {
            source,
            line_number: 0,
            file: None,
            open: None,
            control_seen: false,
        }
    }

    /// Reads the whole source into a [`File`].
    ///
    /// Lines must be exactly 94 characters. A line whose length is a
    /// multiple of 94 is taken as unbroken records and split. Block filler
    /// after the file control is skipped.
    pub fn read(mut self) -> Result<File> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.source.read_line(&mut line)? == 0 {
                break;
            }
            self.line_number += 1;
            let text = line.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                continue;
            }
            if text.len() % RECORD_LENGTH != 0 || !text.is_ascii() {
                return Err(FileError::RecordLength {
                    line: self.line_number,
                    length: text.chars().count(),
                }
                .into());
            }
            let records: Vec<String> = text
                .as_bytes()
                .chunks(RECORD_LENGTH)
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect();
            for record in records {
                self.record(&record)?;
            }
        }
        self.finish()
    }

    fn record(&mut self, line: &str) -> Result<()> {
        if self.control_seen {
            if is_filler(line) {
                return Ok(());
            }
            return Err(self.structure("record after the file control"));
        }
        let record_type = record_type(line).unwrap_or(' ');
        if self.file.is_none() && record_type != FILE_HEADER {
            return Err(self.structure("file header must be the first record"));
        }
        match record_type {
            FILE_HEADER => {
                if self.file.is_some() {
                    return Err(self.structure("duplicate file header"));
                }
                let header = FileHeader::parse(line).map_err(|e| self.record_error(e))?;
                self.file = Some(File::new(header));
            }
            BATCH_HEADER => self.batch_header(line)?,
            ENTRY_DETAIL => self.entry(line)?,
            ADDENDA => self.addenda(line)?,
            BATCH_CONTROL => self.batch_control(line)?,
            FILE_CONTROL => self.file_control(line)?,
            other => {
                return Err(self.structure(format!("unknown record type {:?}", other)));
            }
        }
        Ok(())
    }

    fn batch_header(&mut self, line: &str) -> Result<()> {
        if self.open.is_some() {
            return Err(self.structure("batch header inside an open batch"));
        }
        let open = if is_iat_batch_header(line) {
            let header = IatBatchHeader::parse(line).map_err(|e| self.record_error(e))?;
            OpenBatch::Iat(IatBatch::new(header)?)
        } else {
            let header = BatchHeader::parse(line).map_err(|e| self.record_error(e))?;
            OpenBatch::Standard(Batch::new(header)?)
        };
        debug!("line {}: batch opened", self.line_number);
        self.open = Some(open);
        Ok(())
    }

    fn entry(&mut self, line: &str) -> Result<()> {
        let line_number = self.line_number;
        let record = |e: FieldError| FileError::Record {
            line: line_number,
            source: e,
        };
        match self.open.as_mut() {
            Some(OpenBatch::Standard(batch)) if batch.is_adv() => {
                batch.add_adv_entry(AdvEntryDetail::parse(line).map_err(record)?);
            }
            Some(OpenBatch::Standard(batch)) => {
                batch.add_entry(EntryDetail::parse(line).map_err(record)?);
            }
            Some(OpenBatch::Iat(batch)) => {
                batch.add_entry(IatEntryDetail::parse(line).map_err(record)?);
            }
            None => return Err(self.structure("entry detail outside a batch")),
        }
        Ok(())
    }

    fn addenda(&mut self, line: &str) -> Result<()> {
        let line_number = self.line_number;
        let record = |e: FieldError| FileError::Record {
            line: line_number,
            source: e,
        };
        let type_code = addenda_type_code(line);
        let attached = match self.open.as_mut() {
            Some(OpenBatch::Standard(batch)) if !batch.is_adv() => {
                match batch.entries_mut().last_mut() {
                    Some(entry) => match type_code {
                        "02" => {
                            entry.addenda02 = Some(Addenda02::parse(line).map_err(record)?);
                            true
                        }
                        "05" => {
                            entry.addenda05.push(Addenda05::parse(line).map_err(record)?);
                            true
                        }
                        "98" => {
                            entry.addenda98 = Some(Addenda98::parse(line).map_err(record)?);
                            true
                        }
                        "99" => {
                            entry.addenda99 = Some(Addenda99::parse(line).map_err(record)?);
                            true
                        }
                        _ => false,
                    },
                    None => return Err(self.structure("addenda without an entry detail")),
                }
            }
            Some(OpenBatch::Iat(batch)) => match batch.entries_mut().last_mut() {
                Some(entry) => {
                    attach_iat_addenda(entry, type_code, line).map_err(record)?
                }
                None => return Err(self.structure("addenda without an entry detail")),
            },
            Some(OpenBatch::Standard(_)) => false,
            None => return Err(self.structure("addenda outside a batch")),
        };
        if !attached {
            return Err(self.structure(format!("unexpected addenda type code {:?}", type_code)));
        }
        Ok(())
    }

    fn batch_control(&mut self, line: &str) -> Result<()> {
        let line_number = self.line_number;
        let record = |e: FieldError| FileError::Record {
            line: line_number,
            source: e,
        };
        let Some(open) = self.open.take() else {
            return Err(self.structure("batch control without a batch header"));
        };
        match (open, self.file.as_mut()) {
            (OpenBatch::Standard(mut batch), Some(file)) => {
                if batch.is_adv() {
                    *batch.adv_control_mut() = AdvBatchControl::parse(line).map_err(record)?;
                } else {
                    *batch.control_mut() = BatchControl::parse(line).map_err(record)?;
                }
                file.add_batch(batch);
            }
            (OpenBatch::Iat(mut batch), Some(file)) => {
                *batch.control_mut() = BatchControl::parse(line).map_err(record)?;
                file.add_iat_batch(batch);
            }
            (_, None) => return Err(self.structure("file header must be the first record")),
        }
        Ok(())
    }

    fn file_control(&mut self, line: &str) -> Result<()> {
        if is_filler(line) {
            return Err(self.structure("block filler before the file control"));
        }
        if self.open.is_some() {
            return Err(self.structure("file control inside an open batch"));
        }
        let line_number = self.line_number;
        let record = |e: FieldError| FileError::Record {
            line: line_number,
            source: e,
        };
        if let Some(file) = self.file.as_mut() {
            if file.is_adv() {
                *file.adv_control_mut() = AdvFileControl::parse(line).map_err(record)?;
            } else {
                *file.control_mut() = FileControl::parse(line).map_err(record)?;
            }
        }
        self.control_seen = true;
        Ok(())
    }

    fn finish(mut self) -> Result<File> {
        if self.open.is_some() {
            return Err(self.structure("batch is missing its batch control"));
        }
        let Some(file) = self.file.take() else {
            return Err(self.structure("file header must be the first record"));
        };
        if !self.control_seen {
            return Err(self.structure("missing file control"));
        }
        debug!(
            "read {} batches, {} IAT batches",
            file.batches().len(),
            file.iat_batches().len()
        );
        Ok(file)
    }

    fn structure(&self, message: impl Into<String>) -> AchError {
        FileError::Structure {
            line: self.line_number,
            message: message.into(),
        }
        .into()
    }

    fn record_error(&self, source: FieldError) -> FileError {
        FileError::Record {
            line: self.line_number,
            source,
        }
    }
}

/// Attaches an addenda line to an IAT entry. Returns `false` for a type
/// code IAT entries cannot carry.
fn attach_iat_addenda(
    entry: &mut IatEntryDetail,
    type_code: &str,
    line: &str,
) -> std::result::Result<bool, FieldError> {
    match type_code {
        "10" => entry.addenda10 = Some(Addenda10::parse(line)?),
        "11" => entry.addenda11 = Some(Addenda11::parse(line)?),
        "12" => entry.addenda12 = Some(Addenda12::parse(line)?),
        "13" => entry.addenda13 = Some(Addenda13::parse(line)?),
        "14" => entry.addenda14 = Some(Addenda14::parse(line)?),
        "15" => entry.addenda15 = Some(Addenda15::parse(line)?),
        "16" => entry.addenda16 = Some(Addenda16::parse(line)?),
        "17" => entry.addenda17.push(Addenda17::parse(line)?),
        "18" => entry.addenda18.push(Addenda18::parse(line)?),
        "98" => entry.addenda98 = Some(Addenda98::parse(line)?),
        "99" => entry.addenda99 = Some(Addenda99::parse(line)?),
        _ => return Ok(false),
    }
    Ok(true)
}

/// A record of nothing but nines pads the last block.
fn is_filler(line: &str) -> bool {
    line.bytes().all(|b| b == b'9')
}
