//! Entry Detail record (type 6) and the addenda it owns.

use crate::codec::{
    alpha_field, check_alphanumeric, check_mandatory, check_numeric, check_width, digits_field,
    is_parseable, numeric_field, routing_check_digit, Fields,
};
use crate::codes::{is_prenote, is_transaction_code, Category};
use crate::error::{FieldError, Rule};
use crate::records::{Addenda02, Addenda05, Addenda98, Addenda99, TraceNumbered};
use log::debug;
use std::fmt;

/// A single debit or credit to a receiver's account.
///
/// The entry exclusively owns its addenda. Their backlinks to the entry
/// (trace number, entry detail sequence number) are plain copies written by
/// [`TraceNumbered::set_trace_number`], never live references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDetail {
    pub transaction_code: u8,

    /// Receiving DFI routing number without its check digit.
    pub rdfi_identification: String,

    pub check_digit: u8,
    pub dfi_account_number: String,

    /// Cents.
    pub amount: u64,

    pub identification_number: String,
    pub individual_name: String,

    /// For WEB and TEL this carries the payment type code.
    pub discretionary_data: String,

    /// 1 when addenda follow the entry. Set by `build`.
    pub addenda_record_indicator: u8,

    /// ODFI identification followed by a 7-digit sequence. Set by `build`.
    pub trace_number: u64,

    pub addenda02: Option<Addenda02>,
    pub addenda05: Vec<Addenda05>,
    pub addenda98: Option<Addenda98>,
    pub addenda99: Option<Addenda99>,
}

impl EntryDetail {
    /// Creates an entry for a 9-digit RDFI routing number (or its first
    /// eight digits, in which case the check digit is calculated).
    pub fn new(
        transaction_code: u8,
        rdfi_routing_number: &str,
        dfi_account_number: impl Into<String>,
        amount: u64,
    ) -> Self {
        let mut entry = EntryDetail {
            transaction_code,
            dfi_account_number: dfi_account_number.into(),
            amount,
            ..EntryDetail::default()
        };
        entry.set_rdfi(rdfi_routing_number);
        entry
    }

    /// Splits a routing number into identification and check digit.
    pub fn set_rdfi(&mut self, routing_number: &str) {
        let routing = routing_number.trim();
        self.rdfi_identification = routing.chars().take(8).collect();
        self.check_digit = match routing.get(8..9).and_then(|d| d.parse().ok()) {
            Some(digit) => digit,
            None => routing_check_digit(&self.rdfi_identification).unwrap_or(0),
        };
    }

    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("entry detail has length {}, leaving defaults", line.len());
            return Ok(EntryDetail::default());
        }
        let mut f = Fields::new(line);
        Ok(EntryDetail {
            transaction_code: f.numeric("TransactionCode", 2)? as u8,
            rdfi_identification: f.digits(8),
            check_digit: f.numeric("CheckDigit", 1)? as u8,
            dfi_account_number: f.alpha(17),
            amount: f.numeric("Amount", 10)?,
            identification_number: f.alpha(15),
            individual_name: f.alpha(22),
            discretionary_data: f.alpha(2),
            addenda_record_indicator: f.numeric("AddendaRecordIndicator", 1)? as u8,
            trace_number: f.numeric("TraceNumber", 15)?,
            ..EntryDetail::default()
        })
    }

    pub fn with_addenda05(mut self, addenda: Addenda05) -> Self {
        self.addenda05.push(addenda);
        self
    }

    /// Derived from the attached addenda: a return addenda makes a return,
    /// a change addenda makes a notification of change.
    pub fn category(&self) -> Category {
        if self.addenda99.is_some() {
            Category::Return
        } else if self.addenda98.is_some() {
            Category::NotificationOfChange
        } else {
            Category::Forward
        }
    }

    /// Number of addenda records that follow this entry.
    pub fn addenda_count(&self) -> usize {
        usize::from(self.addenda02.is_some())
            + self.addenda05.len()
            + usize::from(self.addenda98.is_some())
            + usize::from(self.addenda99.is_some())
    }

    /// Numbers the Addenda05 records from 1 and sets the addenda indicator.
    pub(crate) fn sequence_addenda(&mut self) {
        for (i, addenda) in self.addenda05.iter_mut().enumerate() {
            addenda.sequence_number = i as u32 + 1;
        }
        self.addenda_record_indicator = u8::from(self.addenda_count() > 0);
    }

    /// Field rules for the entry and, recursively, each of its addenda.
    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("RDFIIdentification", &self.rdfi_identification)?;
        check_mandatory("DFIAccountNumber", &self.dfi_account_number)?;
        if !is_transaction_code(self.transaction_code) {
            return Err(FieldError::new(
                "TransactionCode",
                self.transaction_code,
                Rule::TransactionCode,
            ));
        }
        check_numeric("RDFIIdentification", &self.rdfi_identification)?;
        match routing_check_digit(&self.rdfi_identification) {
            Some(digit) if digit == self.check_digit => {}
            _ => {
                return Err(FieldError::new(
                    "CheckDigit",
                    self.check_digit,
                    Rule::CheckDigit,
                ))
            }
        }
        check_alphanumeric("DFIAccountNumber", &self.dfi_account_number)?;
        check_width("Amount", self.amount, 10)?;
        if is_prenote(self.transaction_code) && self.amount != 0 {
            return Err(FieldError::new(
                "Amount",
                self.amount,
                Rule::Invalid("must be zero for a prenote".to_string()),
            ));
        }
        check_alphanumeric("IdentificationNumber", &self.identification_number)?;
        check_alphanumeric("IndividualName", &self.individual_name)?;
        check_alphanumeric("DiscretionaryData", &self.discretionary_data)?;
        if self.addenda_record_indicator > 1 {
            return Err(FieldError::new(
                "AddendaRecordIndicator",
                self.addenda_record_indicator,
                Rule::Invalid("must be 0 or 1".to_string()),
            ));
        }

        if let Some(addenda) = &self.addenda02 {
            addenda.validate()?;
        }
        for addenda in &self.addenda05 {
            addenda.validate()?;
        }
        if let Some(addenda) = &self.addenda98 {
            addenda.validate()?;
        }
        if let Some(addenda) = &self.addenda99 {
            addenda.validate()?;
        }
        Ok(())
    }

    /// The entry line followed by its addenda lines, in file order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        lines.extend(self.addenda02.iter().map(ToString::to_string));
        lines.extend(self.addenda05.iter().map(ToString::to_string));
        lines.extend(self.addenda98.iter().map(ToString::to_string));
        lines.extend(self.addenda99.iter().map(ToString::to_string));
        lines
    }
}

impl TraceNumbered for EntryDetail {
    fn trace_number(&self) -> u64 {
        self.trace_number
    }

    fn set_trace_number(&mut self, trace_number: u64) {
        self.trace_number = trace_number;
        let sequence = self.trace_sequence();
        if let Some(addenda) = self.addenda02.as_mut() {
            addenda.trace_number = trace_number;
        }
        for addenda in &mut self.addenda05 {
            addenda.entry_detail_sequence_number = sequence;
        }
        if let Some(addenda) = self.addenda98.as_mut() {
            addenda.trace_number = trace_number;
        }
        if let Some(addenda) = self.addenda99.as_mut() {
            addenda.trace_number = trace_number;
        }
    }
}

impl fmt::Display for EntryDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "6{}{}{}{}{}{}{}{}{}{}",
            numeric_field(u64::from(self.transaction_code), 2),
            digits_field(&self.rdfi_identification, 8),
            numeric_field(u64::from(self.check_digit), 1),
            alpha_field(&self.dfi_account_number, 17),
            numeric_field(self.amount, 10),
            alpha_field(&self.identification_number, 15),
            alpha_field(&self.individual_name, 22),
            alpha_field(&self.discretionary_data, 2),
            numeric_field(u64::from(self.addenda_record_indicator), 1),
            numeric_field(self.trace_number, 15),
        )
    }
}
