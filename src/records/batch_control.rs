//! Batch Control record (type 8) and its ADV variant.
//!
//! Both are wholly derived: `Batch::build` produces them and
//! `Batch::validate` re-derives and compares.

use crate::codec::{
    alpha_field, check_alphanumeric, check_mandatory, check_numeric, check_width, digits_field,
    is_parseable, numeric_field, Fields,
};
use crate::codes::is_service_class_code;
use crate::error::{FieldError, Rule};
use log::debug;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchControl {
    pub service_class_code: u16,
    pub entry_addenda_count: u32,

    /// Least-significant 10 digits of the sum of RDFI identifications.
    pub entry_hash: u64,

    pub total_debit_entry_dollar_amount: u64,
    pub total_credit_entry_dollar_amount: u64,
    pub company_identification: String,
    pub message_authentication_code: String,
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl BatchControl {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("batch control has length {}, leaving defaults", line.len());
            return Ok(BatchControl::default());
        }
        let mut f = Fields::new(line);
        let service_class_code = f.numeric("ServiceClassCode", 3)? as u16;
        let entry_addenda_count = f.numeric("EntryAddendaCount", 6)? as u32;
        let entry_hash = f.numeric("EntryHash", 10)?;
        let total_debit_entry_dollar_amount = f.numeric("TotalDebitEntryDollarAmount", 12)?;
        let total_credit_entry_dollar_amount = f.numeric("TotalCreditEntryDollarAmount", 12)?;
        let company_identification = f.alpha(10);
        let message_authentication_code = f.alpha(19);
        f.skip(6);
        Ok(BatchControl {
            service_class_code,
            entry_addenda_count,
            entry_hash,
            total_debit_entry_dollar_amount,
            total_credit_entry_dollar_amount,
            company_identification,
            message_authentication_code,
            odfi_identification: f.digits(8),
            batch_number: f.numeric("BatchNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.service_class_code == 0 {
            return Err(FieldError::new("ServiceClassCode", 0, Rule::Mandatory));
        }
        check_mandatory("ODFIIdentification", &self.odfi_identification)?;
        if !is_service_class_code(self.service_class_code) {
            return Err(FieldError::new(
                "ServiceClassCode",
                self.service_class_code,
                Rule::ServiceClass,
            ));
        }
        check_width("EntryAddendaCount", u64::from(self.entry_addenda_count), 6)?;
        check_width("TotalDebitEntryDollarAmount", self.total_debit_entry_dollar_amount, 12)?;
        check_width("TotalCreditEntryDollarAmount", self.total_credit_entry_dollar_amount, 12)?;
        check_alphanumeric("CompanyIdentification", &self.company_identification)?;
        check_alphanumeric("MessageAuthenticationCode", &self.message_authentication_code)?;
        check_numeric("ODFIIdentification", &self.odfi_identification)
    }
}

impl fmt::Display for BatchControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "8{}{}{}{}{}{}{}{:6}{}{}",
            numeric_field(u64::from(self.service_class_code), 3),
            numeric_field(u64::from(self.entry_addenda_count), 6),
            numeric_field(self.entry_hash, 10),
            numeric_field(self.total_debit_entry_dollar_amount, 12),
            numeric_field(self.total_credit_entry_dollar_amount, 12),
            alpha_field(&self.company_identification, 10),
            alpha_field(&self.message_authentication_code, 19),
            "",
            digits_field(&self.odfi_identification, 8),
            numeric_field(u64::from(self.batch_number), 7),
        )
    }
}

/// Control for automated accounting advice batches: wider totals, ACH
/// operator data in place of company identification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvBatchControl {
    pub service_class_code: u16,
    pub entry_addenda_count: u32,
    pub entry_hash: u64,
    pub total_debit_entry_dollar_amount: u64,
    pub total_credit_entry_dollar_amount: u64,
    pub ach_operator_data: String,
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl AdvBatchControl {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("ADV batch control has length {}, leaving defaults", line.len());
            return Ok(AdvBatchControl::default());
        }
        let mut f = Fields::new(line);
        Ok(AdvBatchControl {
            service_class_code: f.numeric("ServiceClassCode", 3)? as u16,
            entry_addenda_count: f.numeric("EntryAddendaCount", 6)? as u32,
            entry_hash: f.numeric("EntryHash", 10)?,
            total_debit_entry_dollar_amount: f.numeric("TotalDebitEntryDollarAmount", 20)?,
            total_credit_entry_dollar_amount: f.numeric("TotalCreditEntryDollarAmount", 20)?,
            ach_operator_data: f.alpha(19),
            odfi_identification: f.digits(8),
            batch_number: f.numeric("BatchNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.service_class_code == 0 {
            return Err(FieldError::new("ServiceClassCode", 0, Rule::Mandatory));
        }
        check_mandatory("ODFIIdentification", &self.odfi_identification)?;
        if !is_service_class_code(self.service_class_code) {
            return Err(FieldError::new(
                "ServiceClassCode",
                self.service_class_code,
                Rule::ServiceClass,
            ));
        }
        check_width("EntryAddendaCount", u64::from(self.entry_addenda_count), 6)?;
        check_alphanumeric("ACHOperatorData", &self.ach_operator_data)?;
        check_numeric("ODFIIdentification", &self.odfi_identification)
    }
}

impl fmt::Display for AdvBatchControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "8{}{}{}{}{}{}{}{}",
            numeric_field(u64::from(self.service_class_code), 3),
            numeric_field(u64::from(self.entry_addenda_count), 6),
            numeric_field(self.entry_hash, 10),
            numeric_field(self.total_debit_entry_dollar_amount, 20),
            numeric_field(self.total_credit_entry_dollar_amount, 20),
            alpha_field(&self.ach_operator_data, 19),
            digits_field(&self.odfi_identification, 8),
            numeric_field(u64::from(self.batch_number), 7),
        )
    }
}
