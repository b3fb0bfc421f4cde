//! Addenda records (type 7) attached to standard entries: `02` terminal
//! information, `05` payment related information, `98` notification of
//! change, and `99` return.

use crate::codec::{
    alpha_field, check_alphanumeric, check_date, check_mandatory, check_month_day, check_nonzero,
    check_numeric, digits_field, is_parseable, numeric_field, Fields,
};
use crate::error::{FieldError, Rule};
use log::debug;
use std::fmt;

/// Addenda type code found at positions 2-3 of an addenda line.
pub fn addenda_type_code(line: &str) -> &str {
    line.get(1..3).unwrap_or("")
}

/// Point-of-sale terminal information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda02 {
    pub reference_information_one: String,
    pub reference_information_two: String,
    pub terminal_identification_code: String,
    pub transaction_serial_number: String,

    /// `MMDD`.
    pub transaction_date: String,

    pub authorization_code_or_expire_date: String,
    pub terminal_location: String,
    pub terminal_city: String,
    pub terminal_state: String,

    /// Copied from the owning entry by `build`.
    pub trace_number: u64,
}

impl Addenda02 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 02 has length {}, leaving defaults", line.len());
            return Ok(Addenda02::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        Ok(Addenda02 {
            reference_information_one: f.alpha(7),
            reference_information_two: f.alpha(3),
            terminal_identification_code: f.alpha(6),
            transaction_serial_number: f.alpha(6),
            transaction_date: f.alpha(4),
            authorization_code_or_expire_date: f.alpha(6),
            terminal_location: f.alpha(27),
            terminal_city: f.alpha(15),
            terminal_state: f.alpha(2),
            trace_number: f.numeric("TraceNumber", 15)?,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("TerminalIdentificationCode", &self.terminal_identification_code)?;
        check_mandatory("TransactionSerialNumber", &self.transaction_serial_number)?;
        check_mandatory("TransactionDate", &self.transaction_date)?;
        check_mandatory("TerminalLocation", &self.terminal_location)?;
        check_mandatory("TerminalCity", &self.terminal_city)?;
        check_mandatory("TerminalState", &self.terminal_state)?;
        check_alphanumeric("ReferenceInformationOne", &self.reference_information_one)?;
        check_alphanumeric("ReferenceInformationTwo", &self.reference_information_two)?;
        check_alphanumeric("TerminalIdentificationCode", &self.terminal_identification_code)?;
        check_alphanumeric("TransactionSerialNumber", &self.transaction_serial_number)?;
        check_month_day("TransactionDate", &self.transaction_date)?;
        check_alphanumeric(
            "AuthorizationCodeOrExpireDate",
            &self.authorization_code_or_expire_date,
        )?;
        check_alphanumeric("TerminalLocation", &self.terminal_location)?;
        check_alphanumeric("TerminalCity", &self.terminal_city)?;
        check_alphanumeric("TerminalState", &self.terminal_state)
    }
}

impl fmt::Display for Addenda02 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "702{}{}{}{}{}{}{}{}{}{}",
            alpha_field(&self.reference_information_one, 7),
            alpha_field(&self.reference_information_two, 3),
            alpha_field(&self.terminal_identification_code, 6),
            alpha_field(&self.transaction_serial_number, 6),
            alpha_field(&self.transaction_date, 4),
            alpha_field(&self.authorization_code_or_expire_date, 6),
            alpha_field(&self.terminal_location, 27),
            alpha_field(&self.terminal_city, 15),
            alpha_field(&self.terminal_state, 2),
            numeric_field(self.trace_number, 15),
        )
    }
}

/// Free-form payment related information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda05 {
    pub payment_related_information: String,

    /// Position within the owning entry, starting at 1.
    pub sequence_number: u32,

    /// Trailing seven digits of the owning entry's trace number.
    pub entry_detail_sequence_number: u32,
}

impl Addenda05 {
    pub fn new(payment_related_information: impl Into<String>) -> Self {
        Addenda05 {
            payment_related_information: payment_related_information.into(),
            ..Addenda05::default()
        }
    }

    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 05 has length {}, leaving defaults", line.len());
            return Ok(Addenda05::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        Ok(Addenda05 {
            payment_related_information: f.alpha(80),
            sequence_number: f.numeric("SequenceNumber", 4)? as u32,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_nonzero("SequenceNumber", u64::from(self.sequence_number))?;
        check_nonzero(
            "EntryDetailSequenceNumber",
            u64::from(self.entry_detail_sequence_number),
        )?;
        check_alphanumeric("PaymentRelatedInformation", &self.payment_related_information)
    }
}

impl fmt::Display for Addenda05 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "705{}{}{}",
            alpha_field(&self.payment_related_information, 80),
            numeric_field(u64::from(self.sequence_number), 4),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Notification of change: corrected data the originator must apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda98 {
    /// `C01`..`C14`, `C61`..`C69`.
    pub change_code: String,

    pub original_trace: u64,
    pub original_dfi: String,
    pub corrected_data: String,

    /// Copied from the owning entry by `build`.
    pub trace_number: u64,
}

const CHANGE_CODES: &[&str] = &[
    "C01", "C02", "C03", "C04", "C05", "C06", "C07", "C08", "C09", "C10", "C11", "C12", "C13",
    "C14", "C61", "C62", "C63", "C64", "C65", "C66", "C67", "C68", "C69",
];

impl Addenda98 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 98 has length {}, leaving defaults", line.len());
            return Ok(Addenda98::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let change_code = f.alpha(3);
        let original_trace = f.numeric("OriginalTrace", 15)?;
        f.skip(6);
        let original_dfi = f.digits(8);
        let corrected_data = f.alpha(29);
        f.skip(15);
        Ok(Addenda98 {
            change_code,
            original_trace,
            original_dfi,
            corrected_data,
            trace_number: f.numeric("TraceNumber", 15)?,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("ChangeCode", &self.change_code)?;
        check_nonzero("OriginalTrace", self.original_trace)?;
        check_mandatory("OriginalDFI", &self.original_dfi)?;
        check_mandatory("CorrectedData", &self.corrected_data)?;
        if !CHANGE_CODES.contains(&self.change_code.as_str()) {
            return Err(FieldError::new(
                "ChangeCode",
                &self.change_code,
                Rule::Invalid("is not a known change code".to_string()),
            ));
        }
        check_numeric("OriginalDFI", &self.original_dfi)?;
        check_alphanumeric("CorrectedData", &self.corrected_data)
    }
}

impl fmt::Display for Addenda98 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "798{}{}{:6}{}{}{:15}{}",
            alpha_field(&self.change_code, 3),
            numeric_field(self.original_trace, 15),
            "",
            digits_field(&self.original_dfi, 8),
            alpha_field(&self.corrected_data, 29),
            "",
            numeric_field(self.trace_number, 15),
        )
    }
}

/// Return of a previously sent entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda99 {
    /// `R01`, `R02`, ...
    pub return_code: String,

    pub original_trace: u64,

    /// `YYMMDD`, only for death-related returns.
    pub date_of_death: String,

    pub original_dfi: String,
    pub addenda_information: String,

    /// Copied from the owning entry by `build`.
    pub trace_number: u64,
}

impl Addenda99 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 99 has length {}, leaving defaults", line.len());
            return Ok(Addenda99::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        Ok(Addenda99 {
            return_code: f.alpha(3),
            original_trace: f.numeric("OriginalTrace", 15)?,
            date_of_death: f.alpha(6),
            original_dfi: f.digits(8),
            addenda_information: f.alpha(44),
            trace_number: f.numeric("TraceNumber", 15)?,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("ReturnCode", &self.return_code)?;
        check_nonzero("OriginalTrace", self.original_trace)?;
        check_mandatory("OriginalDFI", &self.original_dfi)?;
        let code = self.return_code.as_bytes();
        if code.len() != 3 || code[0] != b'R' || !code[1..].iter().all(u8::is_ascii_digit) {
            return Err(FieldError::new(
                "ReturnCode",
                &self.return_code,
                Rule::Invalid("is not a return reason code".to_string()),
            ));
        }
        if !self.date_of_death.is_empty() {
            check_date("DateOfDeath", &self.date_of_death)?;
        }
        check_numeric("OriginalDFI", &self.original_dfi)?;
        check_alphanumeric("AddendaInformation", &self.addenda_information)
    }
}

impl fmt::Display for Addenda99 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "799{}{}{}{}{}{}",
            alpha_field(&self.return_code, 3),
            numeric_field(self.original_trace, 15),
            alpha_field(&self.date_of_death, 6),
            digits_field(&self.original_dfi, 8),
            alpha_field(&self.addenda_information, 44),
            numeric_field(self.trace_number, 15),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addenda05_round_trip() {
        let addenda = Addenda05 {
            payment_related_information: "Monthly Premium".to_string(),
            sequence_number: 1,
            entry_detail_sequence_number: 1,
        };
        let line = addenda.to_string();
        assert_eq!(line.len(), 94);
        assert!(line.starts_with("705Monthly Premium"));
        assert!(line.ends_with("00010000001"));
        assert_eq!(addenda_type_code(&line), "05");
        assert_eq!(Addenda05::parse(&line).unwrap(), addenda);
    }

    #[test]
    fn test_addenda05_requires_sequence_numbers() {
        let err = Addenda05::new("text").validate().unwrap_err();
        assert_eq!(err.field_name, "SequenceNumber");
        assert_eq!(err.rule, Rule::Mandatory);
    }

    #[test]
    fn test_addenda02_round_trip_and_date() {
        let addenda = Addenda02 {
            reference_information_one: "REFONEA".to_string(),
            reference_information_two: "REF".to_string(),
            terminal_identification_code: "TERM02".to_string(),
            transaction_serial_number: "100049".to_string(),
            transaction_date: "0614".to_string(),
            authorization_code_or_expire_date: "123456".to_string(),
            terminal_location: "Target Store 0049".to_string(),
            terminal_city: "PHILADELPHIA".to_string(),
            terminal_state: "PA".to_string(),
            trace_number: 121_042_880_000_001,
        };
        let line = addenda.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(Addenda02::parse(&line).unwrap(), addenda);
        assert!(addenda.validate().is_ok());

        let mut bad = addenda;
        bad.transaction_date = "1345".to_string();
        assert_eq!(bad.validate().unwrap_err().rule, Rule::Date);
    }

    #[test]
    fn test_addenda98_round_trip() {
        let addenda = Addenda98 {
            change_code: "C01".to_string(),
            original_trace: 121_042_880_000_001,
            original_dfi: "12104288".to_string(),
            corrected_data: "1918171614".to_string(),
            trace_number: 91_012_980_000_088,
        };
        let line = addenda.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(Addenda98::parse(&line).unwrap(), addenda);
        assert!(addenda.validate().is_ok());
    }

    #[test]
    fn test_addenda98_rejects_unknown_change_code() {
        let addenda = Addenda98 {
            change_code: "C99".to_string(),
            original_trace: 1,
            original_dfi: "12104288".to_string(),
            corrected_data: "x".to_string(),
            trace_number: 0,
        };
        assert_eq!(addenda.validate().unwrap_err().field_name, "ChangeCode");
    }

    #[test]
    fn test_addenda99_round_trip_and_return_code() {
        let addenda = Addenda99 {
            return_code: "R07".to_string(),
            original_trace: 99_912_340_000_015,
            date_of_death: String::new(),
            original_dfi: "09101298".to_string(),
            addenda_information: "Authorization Revoked".to_string(),
            trace_number: 91_012_980_000_066,
        };
        let line = addenda.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(Addenda99::parse(&line).unwrap(), addenda);
        assert!(addenda.validate().is_ok());

        let mut bad = addenda;
        bad.return_code = "X07".to_string();
        assert_eq!(bad.validate().unwrap_err().field_name, "ReturnCode");
    }
}
