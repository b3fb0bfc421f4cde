//! International (IAT) batch engine.
//!
//! Shares the lifecycle of [`crate::Batch`] but every forward or return
//! entry owns seven mandatory addenda, every addenda links back to its
//! entry, and notifications of change may sit alongside entries of any
//! other category.

use crate::batch::{entry_hash, ValidateOpts};
use crate::codes::{is_credit, is_debit, is_return_noc, Category};
use crate::error::{AchError, BatchError, BatchFault, FieldError, FileError, Result, Rule};
use crate::records::{
    trace_number, BatchControl, IatBatchHeader, IatEntryDetail, TraceNumbered,
};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IatBatch {
    header: IatBatchHeader,
    entries: Vec<IatEntryDetail>,
    control: BatchControl,
}

impl IatBatch {
    /// Creates an empty batch. The header's SEC code must be `IAT`, or
    /// `COR` for notifications of change.
    pub fn new(header: IatBatchHeader) -> Result<Self> {
        match header.standard_entry_class_code.trim() {
            "" => Err(AchError::Constructor(FieldError::new(
                "StandardEntryClassCode",
                "",
                Rule::Mandatory,
            ))),
            "IAT" | "COR" => Ok(IatBatch {
                header,
                entries: Vec::new(),
                control: BatchControl::default(),
            }),
            other => Err(FileError::UnsupportedSecCode(other.to_string()).into()),
        }
    }

    /// Returns the IAT batch header.
    pub fn header(&self) -> &IatBatchHeader {
        &self.header
    }

    /// Returns the IAT batch header for editing.
    pub fn header_mut(&mut self) -> &mut IatBatchHeader {
        &mut self.header
    }

    /// Returns the entries in insertion order.
    pub fn entries(&self) -> &[IatEntryDetail] {
        &self.entries
    }

    /// Returns the entries for editing.
    pub fn entries_mut(&mut self) -> &mut Vec<IatEntryDetail> {
        &mut self.entries
    }

    /// Returns the batch control as last built or read.
    pub fn control(&self) -> &BatchControl {
        &self.control
    }

    /// Returns the batch control for editing.
    pub fn control_mut(&mut self) -> &mut BatchControl {
        &mut self.control
    }

    /// Appends an entry. Trace numbers are assigned by `build`.
    pub fn add_entry(&mut self, entry: IatEntryDetail) {
        self.entries.push(entry);
    }

    /// Category shared by the batch's forward or return entries;
    /// notifications of change only when nothing else is present.
    pub fn category(&self) -> Category {
        self.entries
            .iter()
            .map(IatEntryDetail::category)
            .find(|c| *c != Category::NotificationOfChange)
            .or_else(|| self.entries.first().map(IatEntryDetail::category))
            .unwrap_or_default()
    }

    /// Number of entries plus their addenda.
    pub fn entry_addenda_count(&self) -> usize {
        self.entries.iter().map(|e| 1 + e.addenda_count()).sum()
    }

    /// Assigns trace numbers and stamps every addenda with its entry's
    /// sequence, then derives the control.
    pub fn build(&mut self) -> Result<()> {
        self.header.validate().map_err(|e| self.field_error(e))?;
        if self.entries.is_empty() {
            return Err(self.missing_entries());
        }
        let odfi = self.header.odfi_identification.clone();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.set_trace_number(trace_number(&odfi, i as u32 + 1));
            entry.sequence_addenda();
        }
        self.compute_control();
        Ok(())
    }

    /// Builds the batch, then validates it.
    pub fn create(&mut self) -> Result<()> {
        self.build()?;
        self.validate()
    }

    pub(crate) fn compute_control(&mut self) {
        self.control = BatchControl {
            service_class_code: self.header.service_class_code,
            entry_addenda_count: self.entry_addenda_count() as u32,
            entry_hash: self.calculate_hash(),
            total_debit_entry_dollar_amount: self.total(is_debit),
            total_credit_entry_dollar_amount: self.total(is_credit),
            company_identification: self.header.originator_identification.clone(),
            message_authentication_code: self.control.message_authentication_code.clone(),
            odfi_identification: self.header.odfi_identification.clone(),
            batch_number: self.header.batch_number,
        };
    }

    fn calculate_hash(&self) -> u64 {
        entry_hash(self.entries.iter().map(|e| e.rdfi_identification.as_str()))
    }

    fn total(&self, counts: fn(u8) -> bool) -> u64 {
        self.entries
            .iter()
            .filter(|e| counts(e.transaction_code))
            .map(|e| e.amount)
            .sum()
    }

    /// Validates with all checks enforced.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(ValidateOpts::default())
    }

    /// Fail-fast verification in the same order as standard batches, with
    /// the IAT addenda and category rules added.
    pub fn validate_with(&self, opts: ValidateOpts) -> Result<()> {
        self.check_inclusion()?;
        self.check_header_control(opts)?;

        let count = self.entry_addenda_count() as u32;
        if !opts.skip_entry_count_check && count != self.control.entry_addenda_count {
            return Err(self.mismatch("EntryAddendaCount", count, self.control.entry_addenda_count));
        }
        if !opts.skip_ascending_trace_check {
            for pair in self.entries.windows(2) {
                if pair[1].trace_number <= pair[0].trace_number {
                    return Err(self.error(
                        "TraceNumber",
                        BatchFault::Message(format!(
                            "{} is not greater than the previous {}",
                            pair[1].trace_number, pair[0].trace_number
                        )),
                    ));
                }
            }
        }
        let debit = self.total(is_debit);
        if debit != self.control.total_debit_entry_dollar_amount {
            return Err(self.mismatch(
                "TotalDebitEntryDollarAmount",
                debit,
                self.control.total_debit_entry_dollar_amount,
            ));
        }
        let credit = self.total(is_credit);
        if credit != self.control.total_credit_entry_dollar_amount {
            return Err(self.mismatch(
                "TotalCreditEntryDollarAmount",
                credit,
                self.control.total_credit_entry_dollar_amount,
            ));
        }
        let hash = self.calculate_hash();
        if hash != self.control.entry_hash {
            return Err(self.mismatch("EntryHash", hash, self.control.entry_hash));
        }
        if !opts.skip_odfi_trace_check {
            let odfi: u64 = self.header.odfi_identification.parse().unwrap_or(0);
            if let Some(entry) = self.entries.iter().find(|e| e.trace_odfi() != odfi) {
                return Err(self.mismatch(
                    "ODFIIdentificationField",
                    &self.header.odfi_identification,
                    entry.trace_odfi(),
                ));
            }
        }
        self.check_addenda_backlinks()?;
        self.check_category()?;
        self.check_notifications_of_change()
    }

    fn check_inclusion(&self) -> Result<()> {
        self.header.validate().map_err(|e| self.field_error(e))?;
        if self.entries.is_empty() {
            return Err(self.missing_entries());
        }
        for entry in &self.entries {
            entry.validate().map_err(|e| self.field_error(e))?;
        }
        self.control.validate().map_err(|e| self.field_error(e))
    }

    fn check_header_control(&self, opts: ValidateOpts) -> Result<()> {
        if !opts.skip_service_class_check
            && self.header.service_class_code != self.control.service_class_code
        {
            return Err(self.mismatch(
                "ServiceClassCode",
                self.header.service_class_code,
                self.control.service_class_code,
            ));
        }
        if self.header.originator_identification != self.control.company_identification {
            return Err(self.mismatch(
                "CompanyIdentification",
                &self.header.originator_identification,
                &self.control.company_identification,
            ));
        }
        if self.header.odfi_identification != self.control.odfi_identification {
            return Err(self.mismatch(
                "ODFIIdentification",
                &self.header.odfi_identification,
                &self.control.odfi_identification,
            ));
        }
        if self.header.batch_number != self.control.batch_number {
            return Err(self.mismatch(
                "BatchNumber",
                self.header.batch_number,
                self.control.batch_number,
            ));
        }
        Ok(())
    }

    fn check_addenda_backlinks(&self) -> Result<()> {
        for entry in &self.entries {
            let count = entry.addenda_count();
            if entry.addenda_records as usize != count {
                return Err(self.mismatch("AddendaRecords", count, entry.addenda_records));
            }
            let expected_indicator = u8::from(count > 0);
            if entry.addenda_record_indicator != expected_indicator {
                return Err(self.mismatch(
                    "AddendaRecordIndicator",
                    expected_indicator,
                    entry.addenda_record_indicator,
                ));
            }
            let sequence = entry.trace_sequence();
            for addenda in entry.iat_addenda() {
                if addenda.entry_detail_sequence_number() != sequence {
                    return Err(self.mismatch(
                        "EntryDetailSequenceNumber",
                        sequence,
                        addenda.entry_detail_sequence_number(),
                    ));
                }
            }
            let optional_sequences = [
                entry.addenda17.iter().map(|a| a.sequence_number).collect::<Vec<_>>(),
                entry.addenda18.iter().map(|a| a.sequence_number).collect::<Vec<_>>(),
            ];
            for sequences in optional_sequences {
                if sequences.windows(2).any(|pair| pair[1] < pair[0]) {
                    return Err(self.error(
                        "SequenceNumber",
                        BatchFault::Message(format!(
                            "optional addenda on entry {} are out of order",
                            entry.trace_number
                        )),
                    ));
                }
            }
            let linked_traces = entry
                .addenda98
                .iter()
                .map(|a| a.trace_number)
                .chain(entry.addenda99.iter().map(|a| a.trace_number));
            for trace in linked_traces {
                if trace != entry.trace_number {
                    return Err(self.mismatch("TraceNumber", entry.trace_number, trace));
                }
            }
        }
        Ok(())
    }

    /// Forward and return entries never mix; notifications of change may
    /// accompany either.
    fn check_category(&self) -> Result<()> {
        let category = self.category();
        let stray = self.entries.iter().find(|e| {
            let c = e.category();
            c != Category::NotificationOfChange && c != category
        });
        match stray {
            Some(entry) => Err(self.error(
                "Category",
                BatchFault::Message(format!(
                    "{} entry {} in a {} batch",
                    entry.category(),
                    entry.trace_number,
                    category
                )),
            )),
            None => Ok(()),
        }
    }

    fn check_notifications_of_change(&self) -> Result<()> {
        for entry in &self.entries {
            if entry.category() != Category::NotificationOfChange {
                continue;
            }
            if !self.header.is_corrected() {
                return Err(self.error(
                    "IATIndicator",
                    BatchFault::Message(
                        "notifications of change require IATCOR and SEC code COR".to_string(),
                    ),
                ));
            }
            if !is_return_noc(entry.transaction_code) {
                return Err(self.error(
                    "TransactionCode",
                    BatchFault::Message(format!(
                        "{} is not a return or notification of change code",
                        entry.transaction_code
                    )),
                ));
            }
        }
        Ok(())
    }

    fn error(&self, field_name: &'static str, fault: BatchFault) -> AchError {
        BatchError {
            batch_number: self.header.batch_number,
            sec_code: self.header.standard_entry_class_code.clone(),
            field_name,
            fault,
        }
        .into()
    }

    fn field_error(&self, err: FieldError) -> AchError {
        self.error(err.field_name, BatchFault::Field(err))
    }

    fn mismatch(
        &self,
        field_name: &'static str,
        expected: impl Display,
        found: impl Display,
    ) -> AchError {
        self.error(
            field_name,
            BatchFault::Mismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
        )
    }

    fn missing_entries(&self) -> AchError {
        self.field_error(FieldError::new("Entries", 0, Rule::Mandatory))
    }
}
