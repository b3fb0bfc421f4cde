//! Standard batch engine: accumulates entries under a header, derives the
//! control on `build`, and re-derives and compares on `validate`.
//!
//! A batch moves through `new` → `add_entry`* → `build` → `validate`.
//! `create` runs the last two steps together.

use crate::codec::truncate_digits;
use crate::codes::{is_adv_credit, is_adv_debit, is_credit, is_debit, Category, SecCode};
use crate::error::{AchError, BatchError, BatchFault, FieldError, FileError, Result, Rule};
use crate::policy::{self, policy_for};
use crate::records::{
    trace_number, AdvBatchControl, AdvEntryDetail, BatchControl, BatchHeader, EntryDetail,
    TraceNumbered,
};
use std::fmt::Display;

/// Relaxes individual validation checks for files from senders that do
/// not follow the rules exactly. Every check is enforced by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOpts {
    /// Skip header/control service class code equality.
    pub skip_service_class_check: bool,

    /// Skip the ascending trace number check.
    pub skip_ascending_trace_check: bool,

    /// Skip the check that trace numbers start with the ODFI identification.
    pub skip_odfi_trace_check: bool,

    /// Skip control entry/addenda count equality.
    pub skip_entry_count_check: bool,
}

/// Derived values a batch control carries, read from whichever control
/// variant the batch uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlTotals {
    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit: u64,
    pub total_credit: u64,
}

/// Sums RDFI identifications, keeping the least-significant 10 digits.
pub(crate) fn entry_hash<'a>(rdfi_identifications: impl Iterator<Item = &'a str>) -> u64 {
    let sum = rdfi_identifications
        .map(|rdfi| rdfi.trim().parse::<u64>().unwrap_or(0))
        .fold(0u64, u64::wrapping_add);
    truncate_digits(sum, 10)
}

/// A batch of entries sharing one SEC code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    header: BatchHeader,
    entries: Vec<EntryDetail>,
    adv_entries: Vec<AdvEntryDetail>,
    control: BatchControl,
    adv_control: AdvBatchControl,
    sec: SecCode,
}

impl Batch {
    /// Creates an empty batch for the header's SEC code.
    ///
    /// An unknown SEC code fails here rather than at validation. IAT
    /// headers belong to [`crate::IatBatch`].
    pub fn new(header: BatchHeader) -> Result<Self> {
        if header.standard_entry_class_code.trim().is_empty() {
            return Err(AchError::Constructor(FieldError::new(
                "StandardEntryClassCode",
                &header.standard_entry_class_code,
                Rule::Mandatory,
            )));
        }
        let sec: SecCode = header.standard_entry_class_code.parse()?;
        if sec == SecCode::Iat {
            return Err(FileError::UnsupportedSecCode(format!(
                "{} requires an IAT batch header",
                sec
            ))
            .into());
        }
        Ok(Batch {
            header,
            entries: Vec::new(),
            adv_entries: Vec::new(),
            control: BatchControl::default(),
            adv_control: AdvBatchControl::default(),
            sec,
        })
    }

    /// Returns the batch header.
    pub fn header(&self) -> &BatchHeader {
        &self.header
    }

    /// Returns the batch header for editing. Call `build` afterwards.
    pub fn header_mut(&mut self) -> &mut BatchHeader {
        &mut self.header
    }

    /// Returns the SEC code the batch was created for.
    pub fn sec_code(&self) -> SecCode {
        self.sec
    }

    /// Returns true for an ADV batch, which holds ADV entries only.
    pub fn is_adv(&self) -> bool {
        self.sec == SecCode::Adv
    }

    /// Returns the entries in insertion order.
    pub fn entries(&self) -> &[EntryDetail] {
        &self.entries
    }

    /// Returns the entries for editing.
    pub fn entries_mut(&mut self) -> &mut Vec<EntryDetail> {
        &mut self.entries
    }

    /// Returns the ADV entries in insertion order.
    pub fn adv_entries(&self) -> &[AdvEntryDetail] {
        &self.adv_entries
    }

    /// Returns the batch control as last built or read.
    pub fn control(&self) -> &BatchControl {
        &self.control
    }

    /// Returns the batch control for editing.
    pub fn control_mut(&mut self) -> &mut BatchControl {
        &mut self.control
    }

    /// Returns the ADV batch control as last built or read.
    pub fn adv_control(&self) -> &AdvBatchControl {
        &self.adv_control
    }

    /// Returns the ADV batch control for editing.
    pub fn adv_control_mut(&mut self) -> &mut AdvBatchControl {
        &mut self.adv_control
    }

    /// Appends an entry. Trace numbers are assigned by `build`.
    pub fn add_entry(&mut self, entry: EntryDetail) {
        self.entries.push(entry);
    }

    /// Appends an ADV entry. Sequence numbers are assigned by `build`.
    pub fn add_adv_entry(&mut self, entry: AdvEntryDetail) {
        self.adv_entries.push(entry);
    }

    /// Category of the first entry; batches never mix categories.
    pub fn category(&self) -> Category {
        self.entries
            .first()
            .map(EntryDetail::category)
            .unwrap_or_default()
    }

    /// Number of entries plus their addenda.
    pub fn entry_addenda_count(&self) -> usize {
        if self.is_adv() {
            self.adv_entries.len()
        } else {
            self.entries.iter().map(|e| 1 + e.addenda_count()).sum()
        }
    }

    /// Totals from the control the batch carries.
    pub fn control_totals(&self) -> ControlTotals {
        if self.is_adv() {
            ControlTotals {
                entry_addenda_count: self.adv_control.entry_addenda_count,
                entry_hash: self.adv_control.entry_hash,
                total_debit: self.adv_control.total_debit_entry_dollar_amount,
                total_credit: self.adv_control.total_credit_entry_dollar_amount,
            }
        } else {
            ControlTotals {
                entry_addenda_count: self.control.entry_addenda_count,
                entry_hash: self.control.entry_hash,
                total_debit: self.control.total_debit_entry_dollar_amount,
                total_credit: self.control.total_credit_entry_dollar_amount,
            }
        }
    }

    /// Assigns trace numbers and addenda sequence numbers, then derives the
    /// control.
    pub fn build(&mut self) -> Result<()> {
        self.header.validate().map_err(|e| self.field_error(e))?;

        if self.is_adv() {
            if self.adv_entries.is_empty() {
                return Err(self.missing_entries());
            }
            for (i, entry) in self.adv_entries.iter_mut().enumerate() {
                entry.sequence_number = i as u32 + 1;
            }
        } else {
            if self.entries.is_empty() {
                return Err(self.missing_entries());
            }
            let odfi = self.header.odfi_identification.clone();
            for (i, entry) in self.entries.iter_mut().enumerate() {
                entry.set_trace_number(trace_number(&odfi, i as u32 + 1));
                entry.sequence_addenda();
            }
        }
        self.compute_control();
        Ok(())
    }

    /// `build` followed by `validate`.
    pub fn create(&mut self) -> Result<()> {
        self.build()?;
        self.validate()
    }

    /// Derives the control from the current entries without renumbering.
    pub(crate) fn compute_control(&mut self) {
        let totals = self.calculate_totals();
        if self.is_adv() {
            self.adv_control = AdvBatchControl {
                service_class_code: self.header.service_class_code,
                entry_addenda_count: totals.entry_addenda_count,
                entry_hash: totals.entry_hash,
                total_debit_entry_dollar_amount: totals.total_debit,
                total_credit_entry_dollar_amount: totals.total_credit,
                ach_operator_data: self.adv_control.ach_operator_data.clone(),
                odfi_identification: self.header.odfi_identification.clone(),
                batch_number: self.header.batch_number,
            };
        } else {
            self.control = BatchControl {
                service_class_code: self.header.service_class_code,
                entry_addenda_count: totals.entry_addenda_count,
                entry_hash: totals.entry_hash,
                total_debit_entry_dollar_amount: totals.total_debit,
                total_credit_entry_dollar_amount: totals.total_credit,
                company_identification: self.header.company_identification.clone(),
                message_authentication_code: self.control.message_authentication_code.clone(),
                odfi_identification: self.header.odfi_identification.clone(),
                batch_number: self.header.batch_number,
            };
        }
    }

    fn calculate_totals(&self) -> ControlTotals {
        if self.is_adv() {
            let entries = &self.adv_entries;
            ControlTotals {
                entry_addenda_count: entries.len() as u32,
                entry_hash: entry_hash(entries.iter().map(|e| e.rdfi_identification.as_str())),
                total_debit: entries
                    .iter()
                    .filter(|e| is_adv_debit(e.transaction_code))
                    .map(|e| e.amount)
                    .sum(),
                total_credit: entries
                    .iter()
                    .filter(|e| is_adv_credit(e.transaction_code))
                    .map(|e| e.amount)
                    .sum(),
            }
        } else {
            let entries = &self.entries;
            ControlTotals {
                entry_addenda_count: self.entry_addenda_count() as u32,
                entry_hash: entry_hash(entries.iter().map(|e| e.rdfi_identification.as_str())),
                total_debit: entries
                    .iter()
                    .filter(|e| is_debit(e.transaction_code))
                    .map(|e| e.amount)
                    .sum(),
                total_credit: entries
                    .iter()
                    .filter(|e| is_credit(e.transaction_code))
                    .map(|e| e.amount)
                    .sum(),
            }
        }
    }

    /// Validates with all checks enforced.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(ValidateOpts::default())
    }

    /// Re-derives every computed field and compares it to what the batch
    /// holds, returning the first violation. Never mutates the batch.
    pub fn validate_with(&self, opts: ValidateOpts) -> Result<()> {
        if self.is_adv() {
            return self.validate_adv(opts);
        }
        self.check_inclusion()?;
        self.check_header_control(opts)?;
        let totals = self.calculate_totals();
        if !opts.skip_entry_count_check
            && totals.entry_addenda_count != self.control.entry_addenda_count
        {
            return Err(self.mismatch(
                "EntryAddendaCount",
                totals.entry_addenda_count,
                self.control.entry_addenda_count,
            ));
        }
        if !opts.skip_ascending_trace_check {
            self.check_ascending_traces()?;
        }
        self.check_amounts(&totals)?;
        if totals.entry_hash != self.control.entry_hash {
            return Err(self.mismatch("EntryHash", totals.entry_hash, self.control.entry_hash));
        }
        if self.sec == SecCode::Dne && self.header.originator_status_code != 2 {
            return Err(self.error(
                "OriginatorStatusCode",
                BatchFault::Message(format!(
                    "DNE requires originator status 2, found {}",
                    self.header.originator_status_code
                )),
            ));
        }
        if !opts.skip_odfi_trace_check {
            self.check_odfi_prefix()?;
        }
        self.check_addenda_backlinks()?;
        self.check_category()?;
        self.check_addenda_types()?;
        match policy_for(self.sec) {
            Some(policy) => policy::apply(policy, self),
            None => Ok(()),
        }
    }

    fn check_inclusion(&self) -> Result<()> {
        self.header.validate().map_err(|e| self.field_error(e))?;
        if self.entries.is_empty() {
            return Err(self.missing_entries());
        }
        for entry in &self.entries {
            entry.validate().map_err(|e| self.field_error(e))?;
        }
        if !self.adv_entries.is_empty() {
            return Err(self.error(
                "ADVEntries",
                BatchFault::Message(format!("{} batches cannot carry ADV entries", self.sec)),
            ));
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
        if self.header.company_identification != self.control.company_identification {
            return Err(self.mismatch(
                "CompanyIdentification",
                &self.header.company_identification,
                &self.control.company_identification,
            ));
        }
        self.check_shared_fields(
            &self.control.odfi_identification,
            self.control.batch_number,
        )
    }

    /// Fields every control variant echoes from the header.
    fn check_shared_fields(&self, odfi_identification: &str, batch_number: u32) -> Result<()> {
        if self.header.odfi_identification != odfi_identification {
            return Err(self.mismatch(
                "ODFIIdentification",
                &self.header.odfi_identification,
                odfi_identification,
            ));
        }
        if self.header.batch_number != batch_number {
            return Err(self.mismatch("BatchNumber", self.header.batch_number, batch_number));
        }
        if self.header.standard_entry_class_code != self.sec.as_str() {
            return Err(self.mismatch(
                "StandardEntryClassCode",
                self.sec,
                &self.header.standard_entry_class_code,
            ));
        }
        Ok(())
    }

    fn check_ascending_traces(&self) -> Result<()> {
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
        Ok(())
    }

    fn check_amounts(&self, totals: &ControlTotals) -> Result<()> {
        let (debit, credit) = if self.is_adv() {
            (
                self.adv_control.total_debit_entry_dollar_amount,
                self.adv_control.total_credit_entry_dollar_amount,
            )
        } else {
            (
                self.control.total_debit_entry_dollar_amount,
                self.control.total_credit_entry_dollar_amount,
            )
        };
        if totals.total_debit != debit {
            return Err(self.mismatch("TotalDebitEntryDollarAmount", totals.total_debit, debit));
        }
        if totals.total_credit != credit {
            return Err(self.mismatch("TotalCreditEntryDollarAmount", totals.total_credit, credit));
        }
        Ok(())
    }

    fn check_odfi_prefix(&self) -> Result<()> {
        let odfi: u64 = self.header.odfi_identification.parse().unwrap_or(0);
        for entry in &self.entries {
            if entry.trace_odfi() != odfi {
                return Err(self.mismatch(
                    "ODFIIdentificationField",
                    &self.header.odfi_identification,
                    entry.trace_odfi(),
                ));
            }
        }
        Ok(())
    }

    fn check_addenda_backlinks(&self) -> Result<()> {
        for entry in &self.entries {
            let expected_indicator = u8::from(entry.addenda_count() > 0);
            if entry.addenda_record_indicator != expected_indicator {
                return Err(self.mismatch(
                    "AddendaRecordIndicator",
                    expected_indicator,
                    entry.addenda_record_indicator,
                ));
            }
            let mut last_sequence = 0;
            for addenda in &entry.addenda05 {
                if addenda.sequence_number < last_sequence {
                    return Err(self.error(
                        "SequenceNumber",
                        BatchFault::Message(format!(
                            "addenda {} follows {} in entry {}",
                            addenda.sequence_number, last_sequence, entry.trace_number
                        )),
                    ));
                }
                last_sequence = addenda.sequence_number;
                if addenda.entry_detail_sequence_number != entry.trace_sequence() {
                    return Err(self.mismatch(
                        "EntryDetailSequenceNumber",
                        entry.trace_sequence(),
                        addenda.entry_detail_sequence_number,
                    ));
                }
            }
            let linked_traces = entry
                .addenda02
                .iter()
                .map(|a| a.trace_number)
                .chain(entry.addenda98.iter().map(|a| a.trace_number))
                .chain(entry.addenda99.iter().map(|a| a.trace_number));
            for trace in linked_traces {
                if trace != entry.trace_number {
                    return Err(self.mismatch("TraceNumber", entry.trace_number, trace));
                }
            }
        }
        Ok(())
    }

    fn check_category(&self) -> Result<()> {
        let category = self.category();
        match self.entries.iter().find(|e| e.category() != category) {
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

    fn check_addenda_types(&self) -> Result<()> {
        for entry in &self.entries {
            if entry.addenda02.is_some() {
                return Err(self.error(
                    "Addenda02",
                    BatchFault::Message(format!("not permitted in {} batches", self.sec)),
                ));
            }
            if entry.addenda98.is_some() && self.sec != SecCode::Cor {
                return Err(self.error(
                    "Addenda98",
                    BatchFault::Message(format!("only permitted in COR batches, not {}", self.sec)),
                ));
            }
        }
        Ok(())
    }

    fn validate_adv(&self, opts: ValidateOpts) -> Result<()> {
        self.header.validate().map_err(|e| self.field_error(e))?;
        if self.adv_entries.is_empty() {
            return Err(self.missing_entries());
        }
        for entry in &self.adv_entries {
            entry.validate().map_err(|e| self.field_error(e))?;
        }
        self.adv_control.validate().map_err(|e| self.field_error(e))?;

        if !opts.skip_service_class_check
            && self.header.service_class_code != self.adv_control.service_class_code
        {
            return Err(self.mismatch(
                "ServiceClassCode",
                self.header.service_class_code,
                self.adv_control.service_class_code,
            ));
        }
        self.check_shared_fields(
            &self.adv_control.odfi_identification,
            self.adv_control.batch_number,
        )?;
        let totals = self.calculate_totals();
        if !opts.skip_entry_count_check
            && totals.entry_addenda_count != self.adv_control.entry_addenda_count
        {
            return Err(self.mismatch(
                "EntryAddendaCount",
                totals.entry_addenda_count,
                self.adv_control.entry_addenda_count,
            ));
        }
        for (i, entry) in self.adv_entries.iter().enumerate() {
            if entry.sequence_number != i as u32 + 1 {
                return Err(self.mismatch("SequenceNumber", i + 1, entry.sequence_number));
            }
        }
        self.check_amounts(&totals)?;
        if totals.entry_hash != self.adv_control.entry_hash {
            return Err(self.mismatch(
                "EntryHash",
                totals.entry_hash,
                self.adv_control.entry_hash,
            ));
        }
        match policy_for(self.sec) {
            Some(policy) => policy::apply(policy, self),
            None => Ok(()),
        }
    }

    pub(crate) fn error(&self, field_name: &'static str, fault: BatchFault) -> AchError {
        BatchError {
            batch_number: self.header.batch_number,
            sec_code: self.sec.to_string(),
            field_name,
            fault,
        }
        .into()
    }

    pub(crate) fn field_error(&self, err: FieldError) -> AchError {
        self.error(err.field_name, BatchFault::Field(err))
    }

    pub(crate) fn mismatch(
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
