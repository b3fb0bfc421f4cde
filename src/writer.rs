//! Serializes a [`File`] to NACHA text.

use crate::codec::RECORD_LENGTH;
use crate::error::Result;
use crate::file::{File, BLOCKING_FACTOR};
use std::io::Write;

/// Writes files as newline-terminated 94-character records.
pub struct Writer<W: Write> {
    inner: W,
    pad_blocks: bool,
}

impl<W: Write> Writer<W> {
    /// Creates a writer that pads output to whole 10-record blocks.
    pub fn new(inner: W) -> Self {
        Writer {
            inner,
            pad_blocks: true,
        }
    }

    /// Creates a writer that omits block filler.
    pub fn without_padding(inner: W) -> Self {
        Writer {
            inner,
            pad_blocks: false,
        }
    }

    /// Writes every record of `file`. Controls are written as stored, so
    /// call `File::build` first for derived totals.
    pub fn write(&mut self, file: &File) -> Result<()> {
        let mut lines = file_lines(file);
        if self.pad_blocks {
            let filler = "9".repeat(RECORD_LENGTH);
            while lines.len() % BLOCKING_FACTOR != 0 {
                lines.push(filler.clone());
            }
        }
        for line in &lines {
            writeln!(self.inner, "{}", line)?;
        }
        self.inner.flush()?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Records of `file` in order, without block filler.
pub fn file_lines(file: &File) -> Vec<String> {
    let mut lines = vec![file.header().to_string()];
    for batch in file.batches() {
        lines.push(batch.header().to_string());
        if batch.is_adv() {
            lines.extend(batch.adv_entries().iter().map(ToString::to_string));
            lines.push(batch.adv_control().to_string());
        } else {
            lines.extend(batch.entries().iter().flat_map(|e| e.lines()));
            lines.push(batch.control().to_string());
        }
    }
    for batch in file.iat_batches() {
        lines.push(batch.header().to_string());
        lines.extend(batch.entries().iter().flat_map(|e| e.lines()));
        lines.push(batch.control().to_string());
    }
    if file.is_adv() {
        lines.push(file.adv_control().to_string());
    } else {
        lines.push(file.control().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::tests::mock_file;

    #[test]
    fn test_output_is_blocked() {
        let mut writer = Writer::new(Vec::new());
        writer.write(&mock_file()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.len() == RECORD_LENGTH));
        assert!(lines[0].starts_with('1'));
        assert!(lines[7].starts_with("9000002"));
        assert_eq!(lines[8], "9".repeat(RECORD_LENGTH));
    }

    #[test]
    fn test_without_padding() {
        let mut writer = Writer::without_padding(Vec::new());
        writer.write(&mock_file()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 8);
    }
}
