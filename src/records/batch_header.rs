//! Batch Header record (type 5) for every SEC code except IAT.

use crate::codec::{
    alpha_field, check_alphanumeric, check_date, check_mandatory, check_numeric, check_width,
    digits_field, is_parseable, numeric_field, Fields,
};
use crate::codes::{is_service_class_code, SecCode};
use crate::error::{FieldError, Rule};
use log::debug;
use std::fmt;

/// Describes the originator and the kind of entries a batch carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchHeader {
    /// 200 mixed, 220 credits only, 225 debits only, 280 ADV.
    pub service_class_code: u16,

    pub company_name: String,
    pub company_discretionary_data: String,
    pub company_identification: String,

    /// Three letters selecting the batch policy.
    pub standard_entry_class_code: String,

    /// Shown to the receiver, e.g. `PAYROLL`.
    pub company_entry_description: String,

    pub company_descriptive_date: String,

    /// `YYMMDD` the originator intends the entries to settle.
    pub effective_entry_date: String,

    /// Julian day, inserted by the ACH operator.
    pub settlement_date: String,

    /// 0 ADV, 1 depository financial institution, 2 federal government.
    pub originator_status_code: u8,

    /// First eight digits of the originating DFI routing number.
    pub odfi_identification: String,

    pub batch_number: u32,
}

impl BatchHeader {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("batch header has length {}, leaving defaults", line.len());
            return Ok(BatchHeader::default());
        }
        let mut f = Fields::new(line);
        Ok(BatchHeader {
            service_class_code: f.numeric("ServiceClassCode", 3)? as u16,
            company_name: f.alpha(16),
            company_discretionary_data: f.alpha(20),
            company_identification: f.alpha(10),
            standard_entry_class_code: f.alpha(3),
            company_entry_description: f.alpha(10),
            company_descriptive_date: f.alpha(6),
            effective_entry_date: f.alpha(6),
            settlement_date: f.alpha(3),
            originator_status_code: f.numeric("OriginatorStatusCode", 1)? as u8,
            odfi_identification: f.digits(8),
            batch_number: f.numeric("BatchNumber", 7)? as u32,
        })
    }

    /// Parsed SEC code, or the field error an unknown code produces.
    pub fn sec_code(&self) -> Result<SecCode, FieldError> {
        self.standard_entry_class_code.parse().map_err(|_| {
            FieldError::new(
                "StandardEntryClassCode",
                &self.standard_entry_class_code,
                Rule::SecCode,
            )
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        self.check_inclusion()?;
        if !is_service_class_code(self.service_class_code) {
            return Err(FieldError::new(
                "ServiceClassCode",
                self.service_class_code,
                Rule::ServiceClass,
            ));
        }
        self.sec_code()?;
        check_alphanumeric("CompanyName", &self.company_name)?;
        check_alphanumeric("CompanyDiscretionaryData", &self.company_discretionary_data)?;
        check_alphanumeric("CompanyIdentification", &self.company_identification)?;
        check_alphanumeric("CompanyEntryDescription", &self.company_entry_description)?;
        check_alphanumeric("CompanyDescriptiveDate", &self.company_descriptive_date)?;
        check_date("EffectiveEntryDate", &self.effective_entry_date)?;
        check_alphanumeric("SettlementDate", &self.settlement_date)?;
        if self.originator_status_code > 2 {
            return Err(FieldError::new(
                "OriginatorStatusCode",
                self.originator_status_code,
                Rule::OriginatorStatus,
            ));
        }
        check_numeric("ODFIIdentification", &self.odfi_identification)?;
        check_width("BatchNumber", u64::from(self.batch_number), 7)
    }

    fn check_inclusion(&self) -> Result<(), FieldError> {
        if self.service_class_code == 0 {
            return Err(FieldError::new("ServiceClassCode", 0, Rule::Mandatory));
        }
        check_mandatory("CompanyName", &self.company_name)?;
        check_mandatory("CompanyIdentification", &self.company_identification)?;
        check_mandatory("StandardEntryClassCode", &self.standard_entry_class_code)?;
        check_mandatory("CompanyEntryDescription", &self.company_entry_description)?;
        check_mandatory("ODFIIdentification", &self.odfi_identification)
    }

    /// Header text with the batch number zeroed; batches with equal keys
    /// may be merged.
    pub fn merge_key(&self) -> String {
        BatchHeader {
            batch_number: 0,
            ..self.clone()
        }
        .to_string()
    }
}

impl fmt::Display for BatchHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "5{}{}{}{}{}{}{}{}{}{}{}{}",
            numeric_field(u64::from(self.service_class_code), 3),
            alpha_field(&self.company_name, 16),
            alpha_field(&self.company_discretionary_data, 20),
            alpha_field(&self.company_identification, 10),
            alpha_field(&self.standard_entry_class_code, 3),
            alpha_field(&self.company_entry_description, 10),
            alpha_field(&self.company_descriptive_date, 6),
            alpha_field(&self.effective_entry_date, 6),
            alpha_field(&self.settlement_date, 3),
            numeric_field(u64::from(self.originator_status_code), 1),
            digits_field(&self.odfi_identification, 8),
            numeric_field(u64::from(self.batch_number), 7),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchHeader {
        BatchHeader {
            service_class_code: 220,
            company_name: "Name on Account".to_string(),
            company_identification: "121042882".to_string(),
            standard_entry_class_code: "PPD".to_string(),
            company_entry_description: "REG.SALARY".to_string(),
            effective_entry_date: "190816".to_string(),
            originator_status_code: 1,
            odfi_identification: "12104288".to_string(),
            batch_number: 1,
            ..BatchHeader::default()
        }
    }

    #[test]
    fn test_round_trip() {
        let line = sample().to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(
            line,
            "5220Name on Account                     121042882 PPDREG.SALARY      190816   1121042880000001"
        );
        let parsed = BatchHeader::parse(&line).unwrap();
        assert_eq!(parsed, sample());
        assert_eq!(parsed.to_string(), line);
    }

    #[test]
    fn test_validate_service_class() {
        let mut header = sample();
        header.service_class_code = 123;
        let err = header.validate().unwrap_err();
        assert_eq!(err.field_name, "ServiceClassCode");
        assert_eq!(err.rule, Rule::ServiceClass);
    }

    #[test]
    fn test_validate_unknown_sec() {
        let mut header = sample();
        header.standard_entry_class_code = "XYZ".to_string();
        assert_eq!(header.validate().unwrap_err().rule, Rule::SecCode);
    }

    #[test]
    fn test_validate_inclusion_before_format() {
        let mut header = sample();
        header.company_name.clear();
        header.service_class_code = 999;
        let err = header.validate().unwrap_err();
        assert_eq!(err.field_name, "CompanyName");
        assert_eq!(err.rule, Rule::Mandatory);
    }

    #[test]
    fn test_merge_key_ignores_batch_number() {
        let mut other = sample();
        other.batch_number = 42;
        assert_eq!(sample().merge_key(), other.merge_key());
        other.company_entry_description = "BONUS".to_string();
        assert_ne!(sample().merge_key(), other.merge_key());
    }
}
