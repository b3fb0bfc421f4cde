//! Automated accounting advice Entry Detail record (type 6, ADV batches).

use crate::codec::{
    alpha_field, check_alphanumeric, check_mandatory, check_numeric, check_width, digits_field,
    is_parseable, numeric_field, routing_check_digit, Fields,
};
use crate::codes::is_adv_transaction_code;
use crate::error::{FieldError, Rule};
use log::debug;
use std::fmt;

/// An accounting advice sent by an ACH operator to a financial institution.
/// ADV entries carry a 4-digit sequence number instead of a trace number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvEntryDetail {
    /// 81-88.
    pub transaction_code: u8,

    pub rdfi_identification: String,
    pub check_digit: u8,
    pub dfi_account_number: String,

    /// Cents, up to 12 digits.
    pub amount: u64,

    pub advice_routing_number: String,
    pub file_identification: String,
    pub ach_operator_data: String,
    pub individual_name: String,
    pub discretionary_data: String,
    pub addenda_record_indicator: u8,
    pub ach_operator_routing_number: String,

    /// Day of the year the advice was created.
    pub julian_day: u16,

    /// Position within the batch, set by `build`.
    pub sequence_number: u32,
}

impl AdvEntryDetail {
    pub fn new(
        transaction_code: u8,
        rdfi_routing_number: &str,
        dfi_account_number: impl Into<String>,
        amount: u64,
    ) -> Self {
        let routing = rdfi_routing_number.trim();
        let rdfi_identification: String = routing.chars().take(8).collect();
        let check_digit = match routing.get(8..9).and_then(|d| d.parse().ok()) {
            Some(digit) => digit,
            None => routing_check_digit(&rdfi_identification).unwrap_or(0),
        };
        AdvEntryDetail {
            transaction_code,
            rdfi_identification,
            check_digit,
            dfi_account_number: dfi_account_number.into(),
            amount,
            ..AdvEntryDetail::default()
        }
    }

    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("ADV entry detail has length {}, leaving defaults", line.len());
            return Ok(AdvEntryDetail::default());
        }
        let mut f = Fields::new(line);
        Ok(AdvEntryDetail {
            transaction_code: f.numeric("TransactionCode", 2)? as u8,
            rdfi_identification: f.digits(8),
            check_digit: f.numeric("CheckDigit", 1)? as u8,
            dfi_account_number: f.alpha(15),
            amount: f.numeric("Amount", 12)?,
            advice_routing_number: f.digits(9),
            file_identification: f.alpha(5),
            ach_operator_data: f.alpha(1),
            individual_name: f.alpha(22),
            discretionary_data: f.alpha(2),
            addenda_record_indicator: f.numeric("AddendaRecordIndicator", 1)? as u8,
            ach_operator_routing_number: f.digits(8),
            julian_day: f.numeric("JulianDay", 3)? as u16,
            sequence_number: f.numeric("SequenceNumber", 4)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("RDFIIdentification", &self.rdfi_identification)?;
        check_mandatory("DFIAccountNumber", &self.dfi_account_number)?;
        check_mandatory("AdviceRoutingNumber", &self.advice_routing_number)?;
        check_mandatory("ACHOperatorRoutingNumber", &self.ach_operator_routing_number)?;
        if !is_adv_transaction_code(self.transaction_code) {
            return Err(FieldError::new(
                "TransactionCode",
                self.transaction_code,
                Rule::TransactionCode,
            ));
        }
        check_numeric("RDFIIdentification", &self.rdfi_identification)?;
        if routing_check_digit(&self.rdfi_identification) != Some(self.check_digit) {
            return Err(FieldError::new(
                "CheckDigit",
                self.check_digit,
                Rule::CheckDigit,
            ));
        }
        check_alphanumeric("DFIAccountNumber", &self.dfi_account_number)?;
        check_width("Amount", self.amount, 12)?;
        check_numeric("AdviceRoutingNumber", &self.advice_routing_number)?;
        check_alphanumeric("FileIdentification", &self.file_identification)?;
        check_alphanumeric("ACHOperatorData", &self.ach_operator_data)?;
        check_alphanumeric("IndividualName", &self.individual_name)?;
        check_alphanumeric("DiscretionaryData", &self.discretionary_data)?;
        check_numeric("ACHOperatorRoutingNumber", &self.ach_operator_routing_number)?;
        if !(1..=366).contains(&self.julian_day) {
            return Err(FieldError::new("JulianDay", self.julian_day, Rule::Date));
        }
        Ok(())
    }
}

impl fmt::Display for AdvEntryDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "6{}{}{}{}{}{}{}{}{}{}{}{}{}{}",
            numeric_field(u64::from(self.transaction_code), 2),
            digits_field(&self.rdfi_identification, 8),
            numeric_field(u64::from(self.check_digit), 1),
            alpha_field(&self.dfi_account_number, 15),
            numeric_field(self.amount, 12),
            digits_field(&self.advice_routing_number, 9),
            alpha_field(&self.file_identification, 5),
            alpha_field(&self.ach_operator_data, 1),
            alpha_field(&self.individual_name, 22),
            alpha_field(&self.discretionary_data, 2),
            numeric_field(u64::from(self.addenda_record_indicator), 1),
            digits_field(&self.ach_operator_routing_number, 8),
            numeric_field(u64::from(self.julian_day), 3),
            numeric_field(u64::from(self.sequence_number), 4),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::DEBIT_FOR_CREDITS_ORIGINATED;

    fn sample() -> AdvEntryDetail {
        let mut entry =
            AdvEntryDetail::new(DEBIT_FOR_CREDITS_ORIGINATED, "231380104", "744-5678-99", 50_000);
        entry.advice_routing_number = "121042882".to_string();
        entry.file_identification = "11131".to_string();
        entry.individual_name = "Name".to_string();
        entry.ach_operator_routing_number = "01100001".to_string();
        entry.julian_day = 50;
        entry.sequence_number = 1;
        entry
    }

    #[test]
    fn test_round_trip() {
        let line = sample().to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(&line[0..12], "682231380104");
        assert_eq!(&line[90..94], "0001");
        let parsed = AdvEntryDetail::parse(&line).unwrap();
        assert_eq!(parsed, sample());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_rejects_standard_transaction_code() {
        let mut entry = sample();
        entry.transaction_code = 22;
        assert_eq!(entry.validate().unwrap_err().rule, Rule::TransactionCode);
    }
}
