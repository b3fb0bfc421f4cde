//! A complete ACH file: header, batches, IAT batches and the file control
//! derived from them.

use crate::batch::{Batch, ValidateOpts};
use crate::codec::truncate_digits;
use crate::error::{FileError, Result};
use crate::iat_batch::IatBatch;
use crate::records::{AdvFileControl, FileControl, FileHeader};

/// Records per block.
pub const BLOCKING_FACTOR: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    header: FileHeader,
    batches: Vec<Batch>,
    iat_batches: Vec<IatBatch>,
    control: FileControl,
    adv_control: AdvFileControl,
}

/// Values a file control must carry, derived from the batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FileTotals {
    batch_count: u32,
    block_count: u32,
    entry_addenda_count: u32,
    entry_hash: u64,
    total_debit: u64,
    total_credit: u64,
}

impl File {
    /// Creates an empty file. Add batches, then call `create`.
    pub fn new(header: FileHeader) -> Self {
        File {
            header,
            batches: Vec::new(),
            iat_batches: Vec::new(),
            control: FileControl::default(),
            adv_control: AdvFileControl::default(),
        }
    }

    /// Returns the file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns the file header for editing.
    pub fn header_mut(&mut self) -> &mut FileHeader {
        &mut self.header
    }

    /// Returns the standard and ADV batches in file order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Returns the standard and ADV batches for editing.
    pub fn batches_mut(&mut self) -> &mut Vec<Batch> {
        &mut self.batches
    }

    /// Returns the IAT batches in file order.
    pub fn iat_batches(&self) -> &[IatBatch] {
        &self.iat_batches
    }

    /// Returns the IAT batches for editing.
    pub fn iat_batches_mut(&mut self) -> &mut Vec<IatBatch> {
        &mut self.iat_batches
    }

    /// Returns the file control as last built or read.
    pub fn control(&self) -> &FileControl {
        &self.control
    }

    /// Returns the file control for editing.
    pub fn control_mut(&mut self) -> &mut FileControl {
        &mut self.control
    }

    /// Returns the ADV file control as last built or read.
    pub fn adv_control(&self) -> &AdvFileControl {
        &self.adv_control
    }

    /// Returns the ADV file control for editing.
    pub fn adv_control_mut(&mut self) -> &mut AdvFileControl {
        &mut self.adv_control
    }

    /// Appends a standard or ADV batch.
    pub fn add_batch(&mut self, batch: Batch) {
        self.batches.push(batch);
    }

    /// Appends an IAT batch.
    pub fn add_iat_batch(&mut self, batch: IatBatch) {
        self.iat_batches.push(batch);
    }

    /// A file made only of ADV batches uses the ADV file control.
    pub fn is_adv(&self) -> bool {
        self.iat_batches.is_empty()
            && !self.batches.is_empty()
            && self.batches.iter().all(Batch::is_adv)
    }

    /// Records in the file, excluding block filler.
    pub fn record_count(&self) -> usize {
        let standard: usize = self
            .batches
            .iter()
            .map(|b| 2 + b.entry_addenda_count())
            .sum();
        let iat: usize = self
            .iat_batches
            .iter()
            .map(|b| 2 + b.entry_addenda_count())
            .sum();
        2 + standard + iat
    }

    /// Derives the file control from the batch controls. Batches must
    /// already be built.
    pub fn build(&mut self) -> Result<()> {
        if self.batches.is_empty() && self.iat_batches.is_empty() {
            return Err(FileError::NoBatches.into());
        }
        let totals = self.calculate_totals();
        if self.is_adv() {
            self.adv_control = AdvFileControl {
                batch_count: totals.batch_count,
                block_count: totals.block_count,
                entry_addenda_count: totals.entry_addenda_count,
                entry_hash: totals.entry_hash,
                total_debit_entry_dollar_amount_in_file: totals.total_debit,
                total_credit_entry_dollar_amount_in_file: totals.total_credit,
            };
        } else {
            self.control = FileControl {
                batch_count: totals.batch_count,
                block_count: totals.block_count,
                entry_addenda_count: totals.entry_addenda_count,
                entry_hash: totals.entry_hash,
                total_debit_entry_dollar_amount_in_file: totals.total_debit,
                total_credit_entry_dollar_amount_in_file: totals.total_credit,
            };
        }
        Ok(())
    }

    /// `build` followed by `validate`.
    pub fn create(&mut self) -> Result<()> {
        self.build()?;
        self.validate()
    }

    fn calculate_totals(&self) -> FileTotals {
        let mut totals = FileTotals {
            batch_count: (self.batches.len() + self.iat_batches.len()) as u32,
            block_count: self.record_count().div_ceil(BLOCKING_FACTOR) as u32,
            ..FileTotals::default()
        };
        let mut hash = 0u64;
        for batch in &self.batches {
            let control = batch.control_totals();
            totals.entry_addenda_count += control.entry_addenda_count;
            hash = hash.wrapping_add(control.entry_hash);
            totals.total_debit += control.total_debit;
            totals.total_credit += control.total_credit;
        }
        for batch in &self.iat_batches {
            let control = batch.control();
            totals.entry_addenda_count += control.entry_addenda_count;
            hash = hash.wrapping_add(control.entry_hash);
            totals.total_debit += control.total_debit_entry_dollar_amount;
            totals.total_credit += control.total_credit_entry_dollar_amount;
        }
        totals.entry_hash = truncate_digits(hash, 10);
        totals
    }

    /// Validates every batch and the file control with all checks enforced.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(ValidateOpts::default())
    }

    /// Validates the header, every batch, and the file control totals.
    pub fn validate_with(&self, opts: ValidateOpts) -> Result<()> {
        self.header.validate()?;
        if self.batches.is_empty() && self.iat_batches.is_empty() {
            return Err(FileError::NoBatches.into());
        }
        for batch in &self.batches {
            batch.validate_with(opts)?;
        }
        for batch in &self.iat_batches {
            batch.validate_with(opts)?;
        }

        let totals = self.calculate_totals();
        let found = if self.is_adv() {
            self.adv_control.validate()?;
            FileTotals {
                batch_count: self.adv_control.batch_count,
                block_count: self.adv_control.block_count,
                entry_addenda_count: self.adv_control.entry_addenda_count,
                entry_hash: self.adv_control.entry_hash,
                total_debit: self.adv_control.total_debit_entry_dollar_amount_in_file,
                total_credit: self.adv_control.total_credit_entry_dollar_amount_in_file,
            }
        } else {
            self.control.validate()?;
            FileTotals {
                batch_count: self.control.batch_count,
                block_count: self.control.block_count,
                entry_addenda_count: self.control.entry_addenda_count,
                entry_hash: self.control.entry_hash,
                total_debit: self.control.total_debit_entry_dollar_amount_in_file,
                total_credit: self.control.total_credit_entry_dollar_amount_in_file,
            }
        };
        let checks: [(&'static str, u64, u64); 6] = [
            ("BatchCount", totals.batch_count.into(), found.batch_count.into()),
            ("BlockCount", totals.block_count.into(), found.block_count.into()),
            (
                "EntryAddendaCount",
                totals.entry_addenda_count.into(),
                found.entry_addenda_count.into(),
            ),
            ("EntryHash", totals.entry_hash, found.entry_hash),
            ("TotalDebitEntryDollarAmountInFile", totals.total_debit, found.total_debit),
            ("TotalCreditEntryDollarAmountInFile", totals.total_credit, found.total_credit),
        ];
        for (field_name, expected, found) in checks {
            if expected != found {
                return Err(FileError::Control {
                    field_name,
                    expected: expected.to_string(),
                    found: found.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
