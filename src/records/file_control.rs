//! File Control record (type 9) and its ADV variant with 20-digit totals.

use crate::codec::{check_width, is_parseable, numeric_field, Fields};
use crate::error::FieldError;
use log::debug;
use std::fmt;

/// Totals over every batch in the file. Derived by `File::build`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileControl {
    pub batch_count: u32,

    /// Number of 10-record blocks, including filler.
    pub block_count: u32,

    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit_entry_dollar_amount_in_file: u64,
    pub total_credit_entry_dollar_amount_in_file: u64,
}

impl FileControl {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("file control has length {}, leaving defaults", line.len());
            return Ok(FileControl::default());
        }
        let mut f = Fields::new(line);
        Ok(FileControl {
            batch_count: f.numeric("BatchCount", 6)? as u32,
            block_count: f.numeric("BlockCount", 6)? as u32,
            entry_addenda_count: f.numeric("EntryAddendaCount", 8)? as u32,
            entry_hash: f.numeric("EntryHash", 10)?,
            total_debit_entry_dollar_amount_in_file: f.numeric("TotalDebitEntryDollarAmountInFile", 12)?,
            total_credit_entry_dollar_amount_in_file: f.numeric("TotalCreditEntryDollarAmountInFile", 12)?,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_width("BatchCount", u64::from(self.batch_count), 6)?;
        check_width("BlockCount", u64::from(self.block_count), 6)?;
        check_width("EntryAddendaCount", u64::from(self.entry_addenda_count), 8)?;
        check_width(
            "TotalDebitEntryDollarAmountInFile",
            self.total_debit_entry_dollar_amount_in_file,
            12,
        )?;
        check_width(
            "TotalCreditEntryDollarAmountInFile",
            self.total_credit_entry_dollar_amount_in_file,
            12,
        )
    }
}

impl fmt::Display for FileControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "9{}{}{}{}{}{}{:39}",
            numeric_field(u64::from(self.batch_count), 6),
            numeric_field(u64::from(self.block_count), 6),
            numeric_field(u64::from(self.entry_addenda_count), 8),
            numeric_field(self.entry_hash, 10),
            numeric_field(self.total_debit_entry_dollar_amount_in_file, 12),
            numeric_field(self.total_credit_entry_dollar_amount_in_file, 12),
            "",
        )
    }
}

/// File control for files made of ADV batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvFileControl {
    pub batch_count: u32,
    pub block_count: u32,
    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit_entry_dollar_amount_in_file: u64,
    pub total_credit_entry_dollar_amount_in_file: u64,
}

impl AdvFileControl {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("ADV file control has length {}, leaving defaults", line.len());
            return Ok(AdvFileControl::default());
        }
        let mut f = Fields::new(line);
        Ok(AdvFileControl {
            batch_count: f.numeric("BatchCount", 6)? as u32,
            block_count: f.numeric("BlockCount", 6)? as u32,
            entry_addenda_count: f.numeric("EntryAddendaCount", 8)? as u32,
            entry_hash: f.numeric("EntryHash", 10)?,
            total_debit_entry_dollar_amount_in_file: f.numeric("TotalDebitEntryDollarAmountInFile", 20)?,
            total_credit_entry_dollar_amount_in_file: f.numeric("TotalCreditEntryDollarAmountInFile", 20)?,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_width("BatchCount", u64::from(self.batch_count), 6)?;
        check_width("BlockCount", u64::from(self.block_count), 6)?;
        check_width("EntryAddendaCount", u64::from(self.entry_addenda_count), 8)
    }
}

impl fmt::Display for AdvFileControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "9{}{}{}{}{}{}{:23}",
            numeric_field(u64::from(self.batch_count), 6),
            numeric_field(u64::from(self.block_count), 6),
            numeric_field(u64::from(self.entry_addenda_count), 8),
            numeric_field(self.entry_hash, 10),
            numeric_field(self.total_debit_entry_dollar_amount_in_file, 20),
            numeric_field(self.total_credit_entry_dollar_amount_in_file, 20),
            "",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let control = FileControl {
            batch_count: 1,
            block_count: 1,
            entry_addenda_count: 2,
            entry_hash: 23_138_010,
            total_debit_entry_dollar_amount_in_file: 0,
            total_credit_entry_dollar_amount_in_file: 100_000,
        };
        let line = control.to_string();
        assert_eq!(line.len(), 94);
        assert!(line.starts_with("9000001000001000000020023138010"));
        assert_eq!(FileControl::parse(&line).unwrap(), control);
    }

    #[test]
    fn test_adv_round_trip() {
        let control = AdvFileControl {
            batch_count: 1,
            block_count: 1,
            entry_addenda_count: 1,
            entry_hash: 23_138_010,
            total_debit_entry_dollar_amount_in_file: 50_000,
            total_credit_entry_dollar_amount_in_file: 0,
        };
        let line = control.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(AdvFileControl::parse(&line).unwrap(), control);
    }

    #[test]
    fn test_malformed_digits_are_a_parse_error() {
        let mut line = FileControl::default().to_string();
        line.replace_range(1..2, "X");
        let err = FileControl::parse(&line).unwrap_err();
        assert_eq!(err.field_name, "BatchCount");
    }
}
