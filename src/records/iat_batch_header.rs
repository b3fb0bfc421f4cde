//! IAT Batch Header record (type 5, SEC code IAT or COR).

use crate::codec::{
    alpha_field, check_alphanumeric, check_date, check_mandatory, check_numeric, check_width,
    digits_field, is_parseable, numeric_field, Fields,
};
use crate::codes::is_service_class_code;
use crate::error::{FieldError, Rule};
use crate::iso::{is_country_code, is_currency_code};
use log::debug;
use std::fmt;

/// Marks a batch of IAT notifications of change.
pub const IAT_CORRECTED: &str = "IATCOR";

/// Whether a raw batch header line opens an IAT batch. IAT notifications
/// of change use SEC code COR with the IATCOR indicator.
pub fn is_iat_batch_header(line: &str) -> bool {
    match line.get(50..53) {
        Some("IAT") => true,
        Some("COR") => line.get(4..20).map(str::trim) == Some(IAT_CORRECTED),
        _ => false,
    }
}

/// Header of an international batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IatBatchHeader {
    pub service_class_code: u16,

    /// Blank for forward batches, `IATCOR` for notifications of change.
    pub iat_indicator: String,

    /// `FV` fixed-to-variable, `VF` variable-to-fixed, `FF` fixed-to-fixed.
    pub foreign_exchange_indicator: String,

    /// 1 exchange rate, 2 reference number, 3 blank.
    pub foreign_exchange_reference_indicator: u8,

    pub foreign_exchange_reference: String,
    pub iso_destination_country_code: String,
    pub originator_identification: String,

    /// `IAT`, or `COR` for notifications of change.
    pub standard_entry_class_code: String,

    pub company_entry_description: String,
    pub iso_originating_currency_code: String,
    pub iso_destination_currency_code: String,
    pub effective_entry_date: String,
    pub settlement_date: String,
    pub originator_status_code: u8,
    pub odfi_identification: String,
    pub batch_number: u32,
}

impl IatBatchHeader {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("IAT batch header has length {}, leaving defaults", line.len());
            return Ok(IatBatchHeader::default());
        }
        let mut f = Fields::new(line);
        Ok(IatBatchHeader {
            service_class_code: f.numeric("ServiceClassCode", 3)? as u16,
            iat_indicator: f.alpha(16),
            foreign_exchange_indicator: f.alpha(2),
            foreign_exchange_reference_indicator: f
                .numeric("ForeignExchangeReferenceIndicator", 1)?
                as u8,
            foreign_exchange_reference: f.alpha(15),
            iso_destination_country_code: f.alpha(2),
            originator_identification: f.alpha(10),
            standard_entry_class_code: f.alpha(3),
            company_entry_description: f.alpha(10),
            iso_originating_currency_code: f.alpha(3),
            iso_destination_currency_code: f.alpha(3),
            effective_entry_date: f.alpha(6),
            settlement_date: f.alpha(3),
            originator_status_code: f.numeric("OriginatorStatusCode", 1)? as u8,
            odfi_identification: f.digits(8),
            batch_number: f.numeric("BatchNumber", 7)? as u32,
        })
    }

    /// Both the indicator and the SEC code signal notifications of change.
    pub fn is_corrected(&self) -> bool {
        self.iat_indicator.trim() == IAT_CORRECTED && self.standard_entry_class_code == "COR"
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
        check_alphanumeric("IATIndicator", &self.iat_indicator)?;
        if !matches!(self.foreign_exchange_indicator.as_str(), "FV" | "VF" | "FF") {
            return Err(FieldError::new(
                "ForeignExchangeIndicator",
                &self.foreign_exchange_indicator,
                Rule::Invalid("must be FV, VF or FF".to_string()),
            ));
        }
        if !(1..=3).contains(&self.foreign_exchange_reference_indicator) {
            return Err(FieldError::new(
                "ForeignExchangeReferenceIndicator",
                self.foreign_exchange_reference_indicator,
                Rule::Invalid("must be 1, 2 or 3".to_string()),
            ));
        }
        check_alphanumeric("ForeignExchangeReference", &self.foreign_exchange_reference)?;
        if !is_country_code(&self.iso_destination_country_code) {
            return Err(FieldError::new(
                "ISODestinationCountryCode",
                &self.iso_destination_country_code,
                Rule::CountryCode,
            ));
        }
        check_alphanumeric("OriginatorIdentification", &self.originator_identification)?;
        if !matches!(self.standard_entry_class_code.as_str(), "IAT" | "COR") {
            return Err(FieldError::new(
                "StandardEntryClassCode",
                &self.standard_entry_class_code,
                Rule::SecCode,
            ));
        }
        check_alphanumeric("CompanyEntryDescription", &self.company_entry_description)?;
        if !is_currency_code(&self.iso_originating_currency_code) {
            return Err(FieldError::new(
                "ISOOriginatingCurrencyCode",
                &self.iso_originating_currency_code,
                Rule::CurrencyCode,
            ));
        }
        if !is_currency_code(&self.iso_destination_currency_code) {
            return Err(FieldError::new(
                "ISODestinationCurrencyCode",
                &self.iso_destination_currency_code,
                Rule::CurrencyCode,
            ));
        }
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
        check_mandatory("ForeignExchangeIndicator", &self.foreign_exchange_indicator)?;
        if self.foreign_exchange_reference_indicator == 0 {
            return Err(FieldError::new(
                "ForeignExchangeReferenceIndicator",
                0,
                Rule::Mandatory,
            ));
        }
        check_mandatory("ISODestinationCountryCode", &self.iso_destination_country_code)?;
        check_mandatory("OriginatorIdentification", &self.originator_identification)?;
        check_mandatory("StandardEntryClassCode", &self.standard_entry_class_code)?;
        check_mandatory("CompanyEntryDescription", &self.company_entry_description)?;
        check_mandatory("ISOOriginatingCurrencyCode", &self.iso_originating_currency_code)?;
        check_mandatory("ISODestinationCurrencyCode", &self.iso_destination_currency_code)?;
        check_mandatory("ODFIIdentification", &self.odfi_identification)
    }

    /// Header text with the batch number zeroed.
    pub fn merge_key(&self) -> String {
        IatBatchHeader {
            batch_number: 0,
            ..self.clone()
        }
        .to_string()
    }
}

impl fmt::Display for IatBatchHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "5{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}",
            numeric_field(u64::from(self.service_class_code), 3),
            alpha_field(&self.iat_indicator, 16),
            alpha_field(&self.foreign_exchange_indicator, 2),
            numeric_field(u64::from(self.foreign_exchange_reference_indicator), 1),
            alpha_field(&self.foreign_exchange_reference, 15),
            alpha_field(&self.iso_destination_country_code, 2),
            alpha_field(&self.originator_identification, 10),
            alpha_field(&self.standard_entry_class_code, 3),
            alpha_field(&self.company_entry_description, 10),
            alpha_field(&self.iso_originating_currency_code, 3),
            alpha_field(&self.iso_destination_currency_code, 3),
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

    fn sample() -> IatBatchHeader {
        IatBatchHeader {
            service_class_code: 220,
            foreign_exchange_indicator: "FF".to_string(),
            foreign_exchange_reference_indicator: 3,
            iso_destination_country_code: "US".to_string(),
            originator_identification: "123456789".to_string(),
            standard_entry_class_code: "IAT".to_string(),
            company_entry_description: "TRADEPAYMT".to_string(),
            iso_originating_currency_code: "CAD".to_string(),
            iso_destination_currency_code: "USD".to_string(),
            effective_entry_date: "190816".to_string(),
            originator_status_code: 1,
            odfi_identification: "23138010".to_string(),
            batch_number: 1,
            ..IatBatchHeader::default()
        }
    }

    #[test]
    fn test_detects_iat_lines() {
        let mut header = sample();
        assert!(is_iat_batch_header(&header.to_string()));
        header.standard_entry_class_code = "COR".to_string();
        assert!(!is_iat_batch_header(&header.to_string()));
        header.iat_indicator = IAT_CORRECTED.to_string();
        assert!(is_iat_batch_header(&header.to_string()));
    }

    #[test]
    fn test_round_trip() {
        let line = sample().to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(&line[50..53], "IAT");
        let parsed = IatBatchHeader::parse(&line).unwrap();
        assert_eq!(parsed, sample());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_country_and_currency() {
        let mut header = sample();
        header.iso_destination_country_code = "ZZ".to_string();
        assert_eq!(header.validate().unwrap_err().rule, Rule::CountryCode);

        let mut header = sample();
        header.iso_destination_currency_code = "XXY".to_string();
        assert_eq!(header.validate().unwrap_err().rule, Rule::CurrencyCode);
    }

    #[test]
    fn test_corrected_requires_indicator_and_sec() {
        let mut header = sample();
        header.iat_indicator = IAT_CORRECTED.to_string();
        assert!(!header.is_corrected());
        header.standard_entry_class_code = "COR".to_string();
        assert!(header.is_corrected());
    }
}
