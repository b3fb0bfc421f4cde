//! IAT Entry Detail record (type 6 inside an IAT batch).

use crate::codec::{
    alpha_field, check_alphanumeric, check_mandatory, check_numeric, check_width, digits_field,
    is_parseable, numeric_field, routing_check_digit, Fields,
};
use crate::codes::{is_transaction_code, Category};
use crate::error::{FieldError, Rule};
use crate::records::iat_addenda::IatAddenda;
use crate::records::{
    Addenda10, Addenda11, Addenda12, Addenda13, Addenda14, Addenda15, Addenda16, Addenda17,
    Addenda18, Addenda98, Addenda99, TraceNumbered,
};
use log::debug;
use std::fmt;

/// Most Addenda17 records one IAT entry may carry.
pub const MAX_ADDENDA17: usize = 2;

/// Most Addenda18 records one IAT entry may carry.
pub const MAX_ADDENDA18: usize = 5;

/// A cross-border debit or credit.
///
/// Forward and return entries carry all seven mandatory addenda;
/// notifications of change carry only an Addenda98.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IatEntryDetail {
    pub transaction_code: u8,
    pub rdfi_identification: String,
    pub check_digit: u8,

    /// Number of addenda following the entry. Set by `build`.
    pub addenda_records: u32,

    /// Cents.
    pub amount: u64,

    pub dfi_account_number: String,
    pub ofac_screening_indicator: String,
    pub secondary_ofac_screening_indicator: String,
    pub addenda_record_indicator: u8,
    pub trace_number: u64,

    pub addenda10: Option<Addenda10>,
    pub addenda11: Option<Addenda11>,
    pub addenda12: Option<Addenda12>,
    pub addenda13: Option<Addenda13>,
    pub addenda14: Option<Addenda14>,
    pub addenda15: Option<Addenda15>,
    pub addenda16: Option<Addenda16>,
    pub addenda17: Vec<Addenda17>,
    pub addenda18: Vec<Addenda18>,
    pub addenda98: Option<Addenda98>,
    pub addenda99: Option<Addenda99>,
}

impl IatEntryDetail {
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
        IatEntryDetail {
            transaction_code,
            rdfi_identification,
            check_digit,
            dfi_account_number: dfi_account_number.into(),
            amount,
            ..IatEntryDetail::default()
        }
    }

    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("IAT entry detail has length {}, leaving defaults", line.len());
            return Ok(IatEntryDetail::default());
        }
        let mut f = Fields::new(line);
        let transaction_code = f.numeric("TransactionCode", 2)? as u8;
        let rdfi_identification = f.digits(8);
        let check_digit = f.numeric("CheckDigit", 1)? as u8;
        let addenda_records = f.numeric("AddendaRecords", 4)? as u32;
        f.skip(13);
        let amount = f.numeric("Amount", 10)?;
        let dfi_account_number = f.alpha(35);
        f.skip(2);
        Ok(IatEntryDetail {
            transaction_code,
            rdfi_identification,
            check_digit,
            addenda_records,
            amount,
            dfi_account_number,
            ofac_screening_indicator: f.alpha(1),
            secondary_ofac_screening_indicator: f.alpha(1),
            addenda_record_indicator: f.numeric("AddendaRecordIndicator", 1)? as u8,
            trace_number: f.numeric("TraceNumber", 15)?,
            ..IatEntryDetail::default()
        })
    }

    pub fn category(&self) -> Category {
        if self.addenda99.is_some() {
            Category::Return
        } else if self.addenda98.is_some() {
            Category::NotificationOfChange
        } else {
            Category::Forward
        }
    }

    /// The seven mandatory addenda in record order, keyed by field name.
    pub fn mandatory_addenda(&self) -> [(&'static str, Option<&dyn IatAddenda>); 7] {
        [
            ("Addenda10", self.addenda10.as_ref().map(|a| a as &dyn IatAddenda)),
            ("Addenda11", self.addenda11.as_ref().map(|a| a as &dyn IatAddenda)),
            ("Addenda12", self.addenda12.as_ref().map(|a| a as &dyn IatAddenda)),
            ("Addenda13", self.addenda13.as_ref().map(|a| a as &dyn IatAddenda)),
            ("Addenda14", self.addenda14.as_ref().map(|a| a as &dyn IatAddenda)),
            ("Addenda15", self.addenda15.as_ref().map(|a| a as &dyn IatAddenda)),
            ("Addenda16", self.addenda16.as_ref().map(|a| a as &dyn IatAddenda)),
        ]
    }

    /// Every IAT addenda present on the entry, mandatory then optional.
    pub fn iat_addenda(&self) -> Vec<&dyn IatAddenda> {
        let mut all: Vec<&dyn IatAddenda> = self
            .mandatory_addenda()
            .into_iter()
            .filter_map(|(_, addenda)| addenda)
            .collect();
        all.extend(self.addenda17.iter().map(|a| a as &dyn IatAddenda));
        all.extend(self.addenda18.iter().map(|a| a as &dyn IatAddenda));
        all
    }

    fn iat_addenda_mut(&mut self) -> Vec<&mut dyn IatAddenda> {
        let mut all: Vec<&mut dyn IatAddenda> = Vec::new();
        if let Some(a) = self.addenda10.as_mut() {
            all.push(a);
        }
        if let Some(a) = self.addenda11.as_mut() {
            all.push(a);
        }
        if let Some(a) = self.addenda12.as_mut() {
            all.push(a);
        }
        if let Some(a) = self.addenda13.as_mut() {
            all.push(a);
        }
        if let Some(a) = self.addenda14.as_mut() {
            all.push(a);
        }
        if let Some(a) = self.addenda15.as_mut() {
            all.push(a);
        }
        if let Some(a) = self.addenda16.as_mut() {
            all.push(a);
        }
        for a in self.addenda17.iter_mut() {
            all.push(a);
        }
        for a in self.addenda18.iter_mut() {
            all.push(a);
        }
        all
    }

    pub fn addenda_count(&self) -> usize {
        self.iat_addenda().len()
            + usize::from(self.addenda98.is_some())
            + usize::from(self.addenda99.is_some())
    }

    /// Numbers the optional addenda from 1 and sets the addenda counters.
    pub(crate) fn sequence_addenda(&mut self) {
        for (i, addenda) in self.addenda17.iter_mut().enumerate() {
            addenda.sequence_number = i as u32 + 1;
        }
        for (i, addenda) in self.addenda18.iter_mut().enumerate() {
            addenda.sequence_number = i as u32 + 1;
        }
        let count = self.addenda_count();
        self.addenda_records = count as u32;
        self.addenda_record_indicator = u8::from(count > 0);
    }

    /// Fails naming the first mandatory addenda that is missing. Entries
    /// carrying a notification of change are exempt.
    pub fn check_mandatory_addenda(&self) -> Result<(), FieldError> {
        if self.category() == Category::NotificationOfChange {
            return Ok(());
        }
        match self
            .mandatory_addenda()
            .into_iter()
            .find(|(_, addenda)| addenda.is_none())
        {
            Some((field_name, _)) => Err(FieldError::new(field_name, "", Rule::Mandatory)),
            None => Ok(()),
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("RDFIIdentification", &self.rdfi_identification)?;
        check_mandatory("DFIAccountNumber", &self.dfi_account_number)?;
        self.check_mandatory_addenda()?;
        if !is_transaction_code(self.transaction_code) {
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
        check_width("Amount", self.amount, 10)?;
        check_alphanumeric("DFIAccountNumber", &self.dfi_account_number)?;
        check_alphanumeric("OFACScreeningIndicator", &self.ofac_screening_indicator)?;
        check_alphanumeric(
            "SecondaryOFACScreeningIndicator",
            &self.secondary_ofac_screening_indicator,
        )?;
        if self.addenda17.len() > MAX_ADDENDA17 {
            return Err(FieldError::new(
                "Addenda17",
                self.addenda17.len(),
                Rule::Invalid(format!("at most {} allowed", MAX_ADDENDA17)),
            ));
        }
        if self.addenda18.len() > MAX_ADDENDA18 {
            return Err(FieldError::new(
                "Addenda18",
                self.addenda18.len(),
                Rule::Invalid(format!("at most {} allowed", MAX_ADDENDA18)),
            ));
        }

        for addenda in self.iat_addenda() {
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

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        lines.extend(self.addenda10.iter().map(ToString::to_string));
        lines.extend(self.addenda11.iter().map(ToString::to_string));
        lines.extend(self.addenda12.iter().map(ToString::to_string));
        lines.extend(self.addenda13.iter().map(ToString::to_string));
        lines.extend(self.addenda14.iter().map(ToString::to_string));
        lines.extend(self.addenda15.iter().map(ToString::to_string));
        lines.extend(self.addenda16.iter().map(ToString::to_string));
        lines.extend(self.addenda17.iter().map(ToString::to_string));
        lines.extend(self.addenda18.iter().map(ToString::to_string));
        lines.extend(self.addenda98.iter().map(ToString::to_string));
        lines.extend(self.addenda99.iter().map(ToString::to_string));
        lines
    }
}

impl TraceNumbered for IatEntryDetail {
    fn trace_number(&self) -> u64 {
        self.trace_number
    }

    fn set_trace_number(&mut self, trace_number: u64) {
        self.trace_number = trace_number;
        let sequence = self.trace_sequence();
        for addenda in self.iat_addenda_mut() {
            addenda.set_entry_detail_sequence_number(sequence);
        }
        if let Some(addenda) = self.addenda98.as_mut() {
            addenda.trace_number = trace_number;
        }
        if let Some(addenda) = self.addenda99.as_mut() {
            addenda.trace_number = trace_number;
        }
    }
}

impl fmt::Display for IatEntryDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "6{}{}{}{}{:13}{}{}{:2}{}{}{}{}",
            numeric_field(u64::from(self.transaction_code), 2),
            digits_field(&self.rdfi_identification, 8),
            numeric_field(u64::from(self.check_digit), 1),
            numeric_field(u64::from(self.addenda_records), 4),
            "",
            numeric_field(self.amount, 10),
            alpha_field(&self.dfi_account_number, 35),
            "",
            alpha_field(&self.ofac_screening_indicator, 1),
            alpha_field(&self.secondary_ofac_screening_indicator, 1),
            numeric_field(u64::from(self.addenda_record_indicator), 1),
            numeric_field(self.trace_number, 15),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codes::CHECKING_CREDIT;

    /// An entry carrying all seven mandatory addenda.
    pub(crate) fn mock_iat_entry() -> IatEntryDetail {
        let mut entry = IatEntryDetail::new(CHECKING_CREDIT, "121042882", "123456789", 100_000);
        entry.addenda10 = Some(Addenda10 {
            transaction_type_code: "ANN".to_string(),
            foreign_payment_amount: 100_000,
            name: "BEK Solutions".to_string(),
            ..Addenda10::default()
        });
        entry.addenda11 = Some(Addenda11 {
            originator_name: "BEK Solutions".to_string(),
            originator_street_address: "15 West Place Street".to_string(),
            ..Addenda11::default()
        });
        entry.addenda12 = Some(Addenda12 {
            originator_city_state_province: "JacobsTown*PA\\".to_string(),
            originator_country_postal_code: "US*19305\\".to_string(),
            ..Addenda12::default()
        });
        entry.addenda13 = Some(Addenda13 {
            odfi_name: "Wells Fargo".to_string(),
            odfi_id_number_qualifier: "01".to_string(),
            odfi_identification: "121042882".to_string(),
            odfi_branch_country_code: "US".to_string(),
            ..Addenda13::default()
        });
        entry.addenda14 = Some(Addenda14 {
            rdfi_name: "Citadel Bank".to_string(),
            rdfi_id_number_qualifier: "01".to_string(),
            rdfi_identification: "231380104".to_string(),
            rdfi_branch_country_code: "CA".to_string(),
            ..Addenda14::default()
        });
        entry.addenda15 = Some(Addenda15 {
            receiver_id_number: "987465493213987".to_string(),
            receiver_street_address: "2121 Front Street".to_string(),
            ..Addenda15::default()
        });
        entry.addenda16 = Some(Addenda16 {
            receiver_city_state_province: "LetterTown*AB\\".to_string(),
            receiver_country_postal_code: "CA*80014\\".to_string(),
            ..Addenda16::default()
        });
        entry.set_trace_number(231_380_100_000_001);
        entry.sequence_addenda();
        entry
    }

    #[test]
    fn test_round_trip_layout() {
        let entry = mock_iat_entry();
        let line = entry.to_string();
        assert_eq!(line.len(), 94);
        assert_eq!(&line[12..16], "0007");
        assert_eq!(&line[79..94], "231380100000001");
        let parsed = IatEntryDetail::parse(&line).unwrap();
        assert_eq!(parsed.addenda_records, 7);
        assert_eq!(parsed.amount, 100_000);
        assert_eq!(parsed.dfi_account_number, "123456789");
        assert_eq!(parsed.to_string(), line);
    }

    #[test]
    fn test_mock_entry_validates() {
        assert!(mock_iat_entry().validate().is_ok());
        assert_eq!(mock_iat_entry().lines().len(), 8);
    }

    #[test]
    fn test_missing_addenda10_is_an_inclusion_error() {
        let mut entry = mock_iat_entry();
        entry.addenda10 = None;
        let err = entry.validate().unwrap_err();
        assert_eq!(err.field_name, "Addenda10");
        assert_eq!(err.rule, Rule::Mandatory);
    }

    #[test]
    fn test_set_trace_number_stamps_every_addenda() {
        let mut entry = mock_iat_entry();
        entry.addenda17.push(Addenda17::new("remittance"));
        entry.set_trace_number(231_380_100_000_009);
        assert!(entry
            .iat_addenda()
            .iter()
            .all(|a| a.entry_detail_sequence_number() == 9));
    }

    #[test]
    fn test_sequence_addenda_counts_optional_records() {
        let mut entry = mock_iat_entry();
        entry.addenda17.push(Addenda17::new("one"));
        entry.addenda17.push(Addenda17::new("two"));
        entry.sequence_addenda();
        assert_eq!(entry.addenda_records, 9);
        assert_eq!(entry.addenda17[1].sequence_number, 2);
    }

    #[test]
    fn test_too_many_remittance_addenda() {
        let mut entry = mock_iat_entry();
        for text in ["a", "b", "c"] {
            entry.addenda17.push(Addenda17::new(text));
        }
        entry.sequence_addenda();
        entry.set_trace_number(231_380_100_000_001);
        assert_eq!(entry.validate().unwrap_err().field_name, "Addenda17");
    }
}
