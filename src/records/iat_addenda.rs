//! Addenda records owned by IAT entries.
//!
//! `10` through `16` are mandatory on every forward or return IAT entry and
//! describe the parties of a cross-border payment. `17` carries remittance
//! information (at most two per entry) and `18` identifies foreign
//! correspondent banks (at most five per entry).
//!
//! The mandatory addenda keep a 4-digit sequence number in positions 84-87
//! when the sender supplies one; a blank field reads as `None` and is
//! rendered blank again.

use crate::codec::{
    alpha_field, check_alphanumeric, check_mandatory, check_nonzero, is_parseable, numeric_field,
    Fields,
};
use crate::error::{FieldError, Rule};
use crate::iso::is_country_code;
use log::debug;
use std::fmt;

/// Transaction type codes carried by Addenda10.
pub const IAT_TRANSACTION_TYPE_CODES: [&str; 17] = [
    "ANN", "ARC", "BOC", "BUS", "DEP", "LOA", "MIS", "MOR", "PEN", "POP", "RCK", "REM", "RLS",
    "SAL", "TAX", "TEL", "WEB",
];

/// Addenda linked back to their entry through the entry detail sequence
/// number.
pub trait IatAddenda {
    /// Two-digit addenda type code, e.g. `"10"`.
    fn type_code(&self) -> &'static str;

    fn entry_detail_sequence_number(&self) -> u32;

    fn set_entry_detail_sequence_number(&mut self, sequence: u32);

    fn validate(&self) -> Result<(), FieldError>;
}

macro_rules! iat_addenda {
    ($record:ident, $code:literal) => {
        impl IatAddenda for $record {
            fn type_code(&self) -> &'static str {
                $code
            }

            fn entry_detail_sequence_number(&self) -> u32 {
                self.entry_detail_sequence_number
            }

            fn set_entry_detail_sequence_number(&mut self, sequence: u32) {
                self.entry_detail_sequence_number = sequence;
            }

            fn validate(&self) -> Result<(), FieldError> {
                $record::validate(self)
            }
        }
    };
}

fn sequence_field(sequence_number: Option<u32>) -> String {
    match sequence_number {
        Some(sequence) => numeric_field(u64::from(sequence), 4),
        None => " ".repeat(4),
    }
}

fn optional_sequence(f: &mut Fields<'_>) -> Result<Option<u32>, FieldError> {
    Ok(f.optional_numeric("SequenceNumber", 4)?.map(|s| s as u32))
}

fn check_backlink(entry_detail_sequence_number: u32) -> Result<(), FieldError> {
    check_nonzero(
        "EntryDetailSequenceNumber",
        u64::from(entry_detail_sequence_number),
    )
}

fn check_id_qualifier(field_name: &'static str, qualifier: &str) -> Result<(), FieldError> {
    if matches!(qualifier, "01" | "02" | "03") {
        Ok(())
    } else {
        Err(FieldError::new(
            field_name,
            qualifier,
            Rule::Invalid("must be 01, 02 or 03".to_string()),
        ))
    }
}

fn check_branch_country(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    if is_country_code(value.trim()) {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::CountryCode))
    }
}

/// Transaction type, foreign amount and receiver name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda10 {
    pub transaction_type_code: String,

    /// Cents in the originating currency. Zero for inbound payments.
    pub foreign_payment_amount: u64,

    pub foreign_trace_number: String,
    pub name: String,
    pub sequence_number: Option<u32>,
    pub entry_detail_sequence_number: u32,
}

impl Addenda10 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 10 has length {}, leaving defaults", line.len());
            return Ok(Addenda10::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let transaction_type_code = f.alpha(3);
        let foreign_payment_amount = f.numeric("ForeignPaymentAmount", 18)?;
        let foreign_trace_number = f.alpha(22);
        let name = f.alpha(35);
        f.skip(2);
        Ok(Addenda10 {
            transaction_type_code,
            foreign_payment_amount,
            foreign_trace_number,
            name,
            sequence_number: optional_sequence(&mut f)?,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("TransactionTypeCode", &self.transaction_type_code)?;
        check_mandatory("Name", &self.name)?;
        if !IAT_TRANSACTION_TYPE_CODES.contains(&self.transaction_type_code.as_str()) {
            return Err(FieldError::new(
                "TransactionTypeCode",
                &self.transaction_type_code,
                Rule::TypeCode,
            ));
        }
        check_alphanumeric("ForeignTraceNumber", &self.foreign_trace_number)?;
        check_alphanumeric("Name", &self.name)?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda10 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "710{}{}{}{}{:2}{}{}",
            alpha_field(&self.transaction_type_code, 3),
            numeric_field(self.foreign_payment_amount, 18),
            alpha_field(&self.foreign_trace_number, 22),
            alpha_field(&self.name, 35),
            "",
            sequence_field(self.sequence_number),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Originator name and street address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda11 {
    pub originator_name: String,
    pub originator_street_address: String,
    pub sequence_number: Option<u32>,
    pub entry_detail_sequence_number: u32,
}

impl Addenda11 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 11 has length {}, leaving defaults", line.len());
            return Ok(Addenda11::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let originator_name = f.alpha(35);
        let originator_street_address = f.alpha(35);
        f.skip(10);
        Ok(Addenda11 {
            originator_name,
            originator_street_address,
            sequence_number: optional_sequence(&mut f)?,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("OriginatorName", &self.originator_name)?;
        check_mandatory("OriginatorStreetAddress", &self.originator_street_address)?;
        check_alphanumeric("OriginatorName", &self.originator_name)?;
        check_alphanumeric("OriginatorStreetAddress", &self.originator_street_address)?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda11 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "711{}{}{:10}{}{}",
            alpha_field(&self.originator_name, 35),
            alpha_field(&self.originator_street_address, 35),
            "",
            sequence_field(self.sequence_number),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Originator city, state, country and postal code, each pair separated
/// by `*` and terminated by `\`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda12 {
    pub originator_city_state_province: String,
    pub originator_country_postal_code: String,
    pub sequence_number: Option<u32>,
    pub entry_detail_sequence_number: u32,
}

impl Addenda12 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 12 has length {}, leaving defaults", line.len());
            return Ok(Addenda12::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let originator_city_state_province = f.alpha(35);
        let originator_country_postal_code = f.alpha(35);
        f.skip(10);
        Ok(Addenda12 {
            originator_city_state_province,
            originator_country_postal_code,
            sequence_number: optional_sequence(&mut f)?,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory(
            "OriginatorCityStateProvince",
            &self.originator_city_state_province,
        )?;
        check_mandatory(
            "OriginatorCountryPostalCode",
            &self.originator_country_postal_code,
        )?;
        check_alphanumeric(
            "OriginatorCityStateProvince",
            &self.originator_city_state_province,
        )?;
        check_alphanumeric(
            "OriginatorCountryPostalCode",
            &self.originator_country_postal_code,
        )?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "712{}{}{:10}{}{}",
            alpha_field(&self.originator_city_state_province, 35),
            alpha_field(&self.originator_country_postal_code, 35),
            "",
            sequence_field(self.sequence_number),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Originating DFI identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda13 {
    pub odfi_name: String,

    /// `01` national clearing system, `02` BIC, `03` IBAN.
    pub odfi_id_number_qualifier: String,

    pub odfi_identification: String,
    pub odfi_branch_country_code: String,
    pub sequence_number: Option<u32>,
    pub entry_detail_sequence_number: u32,
}

impl Addenda13 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 13 has length {}, leaving defaults", line.len());
            return Ok(Addenda13::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let odfi_name = f.alpha(35);
        let odfi_id_number_qualifier = f.alpha(2);
        let odfi_identification = f.alpha(34);
        let odfi_branch_country_code = f.alpha(3);
        f.skip(6);
        Ok(Addenda13 {
            odfi_name,
            odfi_id_number_qualifier,
            odfi_identification,
            odfi_branch_country_code,
            sequence_number: optional_sequence(&mut f)?,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("ODFIName", &self.odfi_name)?;
        check_mandatory("ODFIIDNumberQualifier", &self.odfi_id_number_qualifier)?;
        check_mandatory("ODFIIdentification", &self.odfi_identification)?;
        check_mandatory("ODFIBranchCountryCode", &self.odfi_branch_country_code)?;
        check_alphanumeric("ODFIName", &self.odfi_name)?;
        check_id_qualifier("ODFIIDNumberQualifier", &self.odfi_id_number_qualifier)?;
        check_alphanumeric("ODFIIdentification", &self.odfi_identification)?;
        check_branch_country("ODFIBranchCountryCode", &self.odfi_branch_country_code)?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda13 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "713{}{}{}{}{:6}{}{}",
            alpha_field(&self.odfi_name, 35),
            alpha_field(&self.odfi_id_number_qualifier, 2),
            alpha_field(&self.odfi_identification, 34),
            alpha_field(&self.odfi_branch_country_code, 3),
            "",
            sequence_field(self.sequence_number),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Receiving DFI identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda14 {
    pub rdfi_name: String,
    pub rdfi_id_number_qualifier: String,
    pub rdfi_identification: String,
    pub rdfi_branch_country_code: String,
    pub sequence_number: Option<u32>,
    pub entry_detail_sequence_number: u32,
}

impl Addenda14 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 14 has length {}, leaving defaults", line.len());
            return Ok(Addenda14::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let rdfi_name = f.alpha(35);
        let rdfi_id_number_qualifier = f.alpha(2);
        let rdfi_identification = f.alpha(34);
        let rdfi_branch_country_code = f.alpha(3);
        f.skip(6);
        Ok(Addenda14 {
            rdfi_name,
            rdfi_id_number_qualifier,
            rdfi_identification,
            rdfi_branch_country_code,
            sequence_number: optional_sequence(&mut f)?,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("RDFIName", &self.rdfi_name)?;
        check_mandatory("RDFIIDNumberQualifier", &self.rdfi_id_number_qualifier)?;
        check_mandatory("RDFIIdentification", &self.rdfi_identification)?;
        check_mandatory("RDFIBranchCountryCode", &self.rdfi_branch_country_code)?;
        check_alphanumeric("RDFIName", &self.rdfi_name)?;
        check_id_qualifier("RDFIIDNumberQualifier", &self.rdfi_id_number_qualifier)?;
        check_alphanumeric("RDFIIdentification", &self.rdfi_identification)?;
        check_branch_country("RDFIBranchCountryCode", &self.rdfi_branch_country_code)?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda14 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "714{}{}{}{}{:6}{}{}",
            alpha_field(&self.rdfi_name, 35),
            alpha_field(&self.rdfi_id_number_qualifier, 2),
            alpha_field(&self.rdfi_identification, 34),
            alpha_field(&self.rdfi_branch_country_code, 3),
            "",
            sequence_field(self.sequence_number),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Receiver identification number and street address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda15 {
    pub receiver_id_number: String,
    pub receiver_street_address: String,
    pub sequence_number: Option<u32>,
    pub entry_detail_sequence_number: u32,
}

impl Addenda15 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 15 has length {}, leaving defaults", line.len());
            return Ok(Addenda15::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let receiver_id_number = f.alpha(15);
        let receiver_street_address = f.alpha(35);
        f.skip(30);
        Ok(Addenda15 {
            receiver_id_number,
            receiver_street_address,
            sequence_number: optional_sequence(&mut f)?,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("ReceiverStreetAddress", &self.receiver_street_address)?;
        check_alphanumeric("ReceiverIDNumber", &self.receiver_id_number)?;
        check_alphanumeric("ReceiverStreetAddress", &self.receiver_street_address)?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda15 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "715{}{}{:30}{}{}",
            alpha_field(&self.receiver_id_number, 15),
            alpha_field(&self.receiver_street_address, 35),
            "",
            sequence_field(self.sequence_number),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Receiver city, state, country and postal code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda16 {
    pub receiver_city_state_province: String,
    pub receiver_country_postal_code: String,
    pub sequence_number: Option<u32>,
    pub entry_detail_sequence_number: u32,
}

impl Addenda16 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 16 has length {}, leaving defaults", line.len());
            return Ok(Addenda16::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let receiver_city_state_province = f.alpha(35);
        let receiver_country_postal_code = f.alpha(35);
        f.skip(10);
        Ok(Addenda16 {
            receiver_city_state_province,
            receiver_country_postal_code,
            sequence_number: optional_sequence(&mut f)?,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory(
            "ReceiverCityStateProvince",
            &self.receiver_city_state_province,
        )?;
        check_mandatory(
            "ReceiverCountryPostalCode",
            &self.receiver_country_postal_code,
        )?;
        check_alphanumeric(
            "ReceiverCityStateProvince",
            &self.receiver_city_state_province,
        )?;
        check_alphanumeric(
            "ReceiverCountryPostalCode",
            &self.receiver_country_postal_code,
        )?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "716{}{}{:10}{}{}",
            alpha_field(&self.receiver_city_state_province, 35),
            alpha_field(&self.receiver_country_postal_code, 35),
            "",
            sequence_field(self.sequence_number),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Remittance information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda17 {
    pub payment_related_information: String,

    /// Position among the entry's Addenda17 records, starting at 1.
    pub sequence_number: u32,

    pub entry_detail_sequence_number: u32,
}

impl Addenda17 {
    pub fn new(payment_related_information: impl Into<String>) -> Self {
        Addenda17 {
            payment_related_information: payment_related_information.into(),
            ..Addenda17::default()
        }
    }

    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 17 has length {}, leaving defaults", line.len());
            return Ok(Addenda17::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        Ok(Addenda17 {
            payment_related_information: f.alpha(80),
            sequence_number: f.numeric("SequenceNumber", 4)? as u32,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_nonzero("SequenceNumber", u64::from(self.sequence_number))?;
        check_alphanumeric("PaymentRelatedInformation", &self.payment_related_information)?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda17 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "717{}{}{}",
            alpha_field(&self.payment_related_information, 80),
            numeric_field(u64::from(self.sequence_number), 4),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

/// Foreign correspondent bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addenda18 {
    pub foreign_correspondent_bank_name: String,
    pub foreign_correspondent_bank_id_number_qualifier: String,
    pub foreign_correspondent_bank_id_number: String,
    pub foreign_correspondent_bank_branch_country_code: String,

    /// Position among the entry's Addenda18 records, starting at 1.
    pub sequence_number: u32,

    pub entry_detail_sequence_number: u32,
}

impl Addenda18 {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("addenda 18 has length {}, leaving defaults", line.len());
            return Ok(Addenda18::default());
        }
        let mut f = Fields::new(line);
        f.skip(2);
        let foreign_correspondent_bank_name = f.alpha(35);
        let foreign_correspondent_bank_id_number_qualifier = f.alpha(2);
        let foreign_correspondent_bank_id_number = f.alpha(34);
        let foreign_correspondent_bank_branch_country_code = f.alpha(3);
        f.skip(6);
        Ok(Addenda18 {
            foreign_correspondent_bank_name,
            foreign_correspondent_bank_id_number_qualifier,
            foreign_correspondent_bank_id_number,
            foreign_correspondent_bank_branch_country_code,
            sequence_number: f.numeric("SequenceNumber", 4)? as u32,
            entry_detail_sequence_number: f.numeric("EntryDetailSequenceNumber", 7)? as u32,
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory(
            "ForeignCorrespondentBankName",
            &self.foreign_correspondent_bank_name,
        )?;
        check_mandatory(
            "ForeignCorrespondentBankIDNumber",
            &self.foreign_correspondent_bank_id_number,
        )?;
        check_alphanumeric(
            "ForeignCorrespondentBankName",
            &self.foreign_correspondent_bank_name,
        )?;
        check_id_qualifier(
            "ForeignCorrespondentBankIDNumberQualifier",
            &self.foreign_correspondent_bank_id_number_qualifier,
        )?;
        check_alphanumeric(
            "ForeignCorrespondentBankIDNumber",
            &self.foreign_correspondent_bank_id_number,
        )?;
        check_branch_country(
            "ForeignCorrespondentBankBranchCountryCode",
            &self.foreign_correspondent_bank_branch_country_code,
        )?;
        check_nonzero("SequenceNumber", u64::from(self.sequence_number))?;
        check_backlink(self.entry_detail_sequence_number)
    }
}

impl fmt::Display for Addenda18 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "718{}{}{}{}{:6}{}{}",
            alpha_field(&self.foreign_correspondent_bank_name, 35),
            alpha_field(&self.foreign_correspondent_bank_id_number_qualifier, 2),
            alpha_field(&self.foreign_correspondent_bank_id_number, 34),
            alpha_field(&self.foreign_correspondent_bank_branch_country_code, 3),
            "",
            numeric_field(u64::from(self.sequence_number), 4),
            numeric_field(u64::from(self.entry_detail_sequence_number), 7),
        )
    }
}

iat_addenda!(Addenda10, "10");
iat_addenda!(Addenda11, "11");
iat_addenda!(Addenda12, "12");
iat_addenda!(Addenda13, "13");
iat_addenda!(Addenda14, "14");
iat_addenda!(Addenda15, "15");
iat_addenda!(Addenda16, "16");
iat_addenda!(Addenda17, "17");
iat_addenda!(Addenda18, "18");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::addenda::addenda_type_code;

    #[test]
    fn test_addenda10_parses_sequence_and_backlink() {
        let line = format!(
            "710WEB{:018}{:<22}{:<35}{:<2}{}{}",
            100, "", "DIEGO MAY", "", "0001", "0000001"
        );
        assert_eq!(line.len(), 94);
        assert_eq!(addenda_type_code(&line), "10");

        let addenda = Addenda10::parse(&line).unwrap();
        assert_eq!(addenda.transaction_type_code, "WEB");
        assert_eq!(addenda.foreign_payment_amount, 100);
        assert_eq!(addenda.name, "DIEGO MAY");
        assert_eq!(addenda.sequence_number, Some(1));
        assert_eq!(addenda.entry_detail_sequence_number, 1);
        assert_eq!(&line[83..87], "0001");
        assert_eq!(&line[87..94], "0000001");
        assert_eq!(addenda.to_string(), line);
    }

    #[test]
    fn test_blank_sequence_reads_as_none() {
        let addenda = Addenda11 {
            originator_name: "BEK Solutions".to_string(),
            originator_street_address: "15 West Place Street".to_string(),
            sequence_number: None,
            entry_detail_sequence_number: 1,
        };
        let line = addenda.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(&line[83..87], "    ");
        assert_eq!(Addenda11::parse(&line).unwrap(), addenda);
    }

    #[test]
    fn test_bank_identity_layout() {
        let addenda = Addenda13 {
            odfi_name: "Wells Fargo".to_string(),
            odfi_id_number_qualifier: "01".to_string(),
            odfi_identification: "121042882".to_string(),
            odfi_branch_country_code: "US".to_string(),
            sequence_number: None,
            entry_detail_sequence_number: 1,
        };
        let line = addenda.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(&line[38..40], "01");
        assert_eq!(Addenda13::parse(&line).unwrap(), addenda);
        assert!(addenda.validate().is_ok());

        let bad = Addenda13 {
            odfi_id_number_qualifier: "04".to_string(),
            ..addenda
        };
        assert_eq!(
            bad.validate().unwrap_err().field_name,
            "ODFIIDNumberQualifier"
        );
    }

    #[test]
    fn test_addenda10_rejects_unknown_transaction_type() {
        let addenda = Addenda10 {
            transaction_type_code: "XYZ".to_string(),
            name: "Receiver".to_string(),
            entry_detail_sequence_number: 1,
            ..Addenda10::default()
        };
        assert_eq!(addenda.validate().unwrap_err().rule, Rule::TypeCode);
    }

    #[test]
    fn test_remittance_layouts() {
        let mut remittance = Addenda17::new("This is an international payment");
        remittance.sequence_number = 1;
        remittance.entry_detail_sequence_number = 1;
        let line = remittance.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(Addenda17::parse(&line).unwrap(), remittance);

        let bank = Addenda18 {
            foreign_correspondent_bank_name: "Bank of Germany".to_string(),
            foreign_correspondent_bank_id_number_qualifier: "01".to_string(),
            foreign_correspondent_bank_id_number: "987987987654654".to_string(),
            foreign_correspondent_bank_branch_country_code: "DE".to_string(),
            sequence_number: 1,
            entry_detail_sequence_number: 1,
        };
        let line = bank.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(Addenda18::parse(&line).unwrap(), bank);
        assert!(bank.validate().is_ok());
    }

    #[test]
    fn test_backlink_through_trait() {
        let mut addenda: Box<dyn IatAddenda> = Box::new(Addenda16::default());
        addenda.set_entry_detail_sequence_number(7);
        assert_eq!(addenda.entry_detail_sequence_number(), 7);
        assert_eq!(addenda.type_code(), "16");
    }
}
