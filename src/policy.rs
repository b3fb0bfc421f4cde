//! Business rules selected by a batch's SEC code.
//!
//! Each policy layers its own limits on top of the generic batch checks:
//! how many Addenda05 an entry may carry, which transaction codes are
//! allowed, and any header or payload rules. [`policy_for`] is an
//! exhaustive match, so adding a [`SecCode`] variant fails to compile
//! until it is given a policy.

use crate::batch::Batch;
use crate::codes::{
    is_debit, SecCode, AUTOMATED_ACCOUNTING_ADVICES, CREDITS_ONLY, LIVE_CODES,
};
use crate::error::{BatchFault, Result};
use crate::payload::{DeathNotification, Enrollment};
use crate::records::EntryDetail;

/// Rules specific to one SEC code.
pub trait SecPolicy: Sync {
    fn sec_code(&self) -> SecCode;

    /// Most Addenda05 records one entry may carry; `None` means no limit.
    fn max_addenda05(&self) -> Option<usize> {
        Some(1)
    }

    fn allows_transaction_code(&self, _code: u8) -> bool {
        true
    }

    fn check_header(&self, _batch: &Batch) -> Result<()> {
        Ok(())
    }

    fn check_entry(&self, _batch: &Batch, _entry: &EntryDetail) -> Result<()> {
        Ok(())
    }
}

/// Policy for a SEC code. IAT batches have their own engine.
pub fn policy_for(sec: SecCode) -> Option<&'static dyn SecPolicy> {
    match sec {
        SecCode::Ack => Some(&Ack),
        SecCode::Adv => Some(&Adv),
        SecCode::Ccd => Some(&Ccd),
        SecCode::Cor => Some(&Cor),
        SecCode::Dne => Some(&Dne),
        SecCode::Enr => Some(&Enr),
        SecCode::Iat => None,
        SecCode::Ppd => Some(&Ppd),
        SecCode::Tel => Some(&Tel),
        SecCode::Web => Some(&Web),
    }
}

/// Runs a policy over a batch whose generic checks already passed.
pub(crate) fn apply(policy: &dyn SecPolicy, batch: &Batch) -> Result<()> {
    policy.check_header(batch)?;
    for entry in batch.entries() {
        if let Some(max) = policy.max_addenda05() {
            if entry.addenda05.len() > max {
                return Err(batch.error(
                    "AddendaCount",
                    BatchFault::Message(format!(
                        "{} Addenda05 records on entry {}, {} allows at most {}",
                        entry.addenda05.len(),
                        entry.trace_number,
                        policy.sec_code(),
                        max
                    )),
                ));
            }
        }
        if !policy.allows_transaction_code(entry.transaction_code) {
            return Err(batch.error(
                "TransactionCode",
                BatchFault::Message(format!(
                    "{} is not permitted in {} batches",
                    entry.transaction_code,
                    policy.sec_code()
                )),
            ));
        }
        policy.check_entry(batch, entry)?;
    }
    Ok(())
}

fn require_service_class(batch: &Batch, service_class_code: u16) -> Result<()> {
    let found = batch.header().service_class_code;
    if found == service_class_code {
        Ok(())
    } else {
        Err(batch.mismatch("ServiceClassCode", service_class_code, found))
    }
}

fn require_zero_amount(batch: &Batch, entry: &EntryDetail) -> Result<()> {
    if entry.amount == 0 {
        Ok(())
    } else {
        Err(batch.mismatch("Amount", 0, entry.amount))
    }
}

/// Prearranged payment and deposit.
struct Ppd;

impl SecPolicy for Ppd {
    fn sec_code(&self) -> SecCode {
        SecCode::Ppd
    }
}

/// Corporate credit or debit.
struct Ccd;

impl SecPolicy for Ccd {
    fn sec_code(&self) -> SecCode {
        SecCode::Ccd
    }
}

/// Internet-initiated entries carry a recurring (`R`) or single (`S`)
/// payment type in the discretionary data.
struct Web;

impl SecPolicy for Web {
    fn sec_code(&self) -> SecCode {
        SecCode::Web
    }

    fn check_entry(&self, batch: &Batch, entry: &EntryDetail) -> Result<()> {
        match entry.discretionary_data.trim() {
            "R" | "S" => Ok(()),
            other => Err(batch.error(
                "PaymentTypeCode",
                BatchFault::Message(format!("{:?} is not R or S", other)),
            )),
        }
    }
}

/// Telephone-initiated debits without addenda.
struct Tel;

impl SecPolicy for Tel {
    fn sec_code(&self) -> SecCode {
        SecCode::Tel
    }

    fn max_addenda05(&self) -> Option<usize> {
        Some(0)
    }

    fn allows_transaction_code(&self, code: u8) -> bool {
        is_debit(code)
    }
}

/// Zero-dollar acknowledgment of a received CCD.
struct Ack;

impl SecPolicy for Ack {
    fn sec_code(&self) -> SecCode {
        SecCode::Ack
    }

    fn allows_transaction_code(&self, code: u8) -> bool {
        matches!(code, 24 | 34)
    }

    fn check_header(&self, batch: &Batch) -> Result<()> {
        require_service_class(batch, CREDITS_ONLY)
    }

    fn check_entry(&self, batch: &Batch, entry: &EntryDetail) -> Result<()> {
        require_zero_amount(batch, entry)
    }
}

/// Death notification sent by a federal government agency.
struct Dne;

impl SecPolicy for Dne {
    fn sec_code(&self) -> SecCode {
        SecCode::Dne
    }

    fn allows_transaction_code(&self, code: u8) -> bool {
        matches!(code, 21 | 23 | 31 | 33)
    }

    fn check_header(&self, batch: &Batch) -> Result<()> {
        require_service_class(batch, CREDITS_ONLY)
    }

    fn check_entry(&self, batch: &Batch, entry: &EntryDetail) -> Result<()> {
        require_zero_amount(batch, entry)?;
        match entry.addenda05.as_slice() {
            [addenda] => {
                DeathNotification::parse(&addenda.payment_related_information)
                    .map_err(|e| batch.field_error(e))?;
                Ok(())
            }
            others => Err(batch.error(
                "AddendaCount",
                BatchFault::Message(format!(
                    "DNE entries need exactly one Addenda05, found {}",
                    others.len()
                )),
            )),
        }
    }
}

/// Automated enrollment of a receiver's account with a federal agency.
struct Enr;

impl SecPolicy for Enr {
    fn sec_code(&self) -> SecCode {
        SecCode::Enr
    }

    fn max_addenda05(&self) -> Option<usize> {
        None
    }

    fn allows_transaction_code(&self, code: u8) -> bool {
        matches!(code, 22 | 27 | 32 | 37)
    }

    fn check_header(&self, batch: &Batch) -> Result<()> {
        let description = batch.header().company_entry_description.trim();
        if description != "AUTOENROLL" {
            return Err(batch.mismatch("CompanyEntryDescription", "AUTOENROLL", description));
        }
        require_service_class(batch, CREDITS_ONLY)
    }

    fn check_entry(&self, batch: &Batch, entry: &EntryDetail) -> Result<()> {
        require_zero_amount(batch, entry)?;
        for addenda in &entry.addenda05 {
            Enrollment::parse(&addenda.payment_related_information)
                .map_err(|e| batch.field_error(e))?;
        }
        Ok(())
    }
}

/// Notification of change: every entry carries an Addenda98.
struct Cor;

impl SecPolicy for Cor {
    fn sec_code(&self) -> SecCode {
        SecCode::Cor
    }

    fn max_addenda05(&self) -> Option<usize> {
        Some(0)
    }

    fn allows_transaction_code(&self, code: u8) -> bool {
        !LIVE_CODES.contains(&code)
    }

    fn check_entry(&self, batch: &Batch, entry: &EntryDetail) -> Result<()> {
        if entry.addenda98.is_none() {
            return Err(batch.error(
                "Addenda98",
                BatchFault::Message(format!("missing on entry {}", entry.trace_number)),
            ));
        }
        require_zero_amount(batch, entry)
    }
}

/// Automated accounting advice from an ACH operator.
struct Adv;

impl SecPolicy for Adv {
    fn sec_code(&self) -> SecCode {
        SecCode::Adv
    }

    fn max_addenda05(&self) -> Option<usize> {
        Some(0)
    }

    fn check_header(&self, batch: &Batch) -> Result<()> {
        if !batch.entries().is_empty() {
            return Err(batch.error(
                "Entries",
                BatchFault::Message("ADV batches carry only ADV entries".to_string()),
            ));
        }
        require_service_class(batch, AUTOMATED_ACCOUNTING_ADVICES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::{mock_entry, mock_header};
    use crate::codes::{
        CHECKING_CREDIT, CHECKING_DEBIT, CHECKING_PRENOTE_CREDIT, CHECKING_RETURN_NOC_CREDIT,
        CHECKING_ZERO_DOLLAR_CREDIT, DEBIT_FOR_CREDITS_ORIGINATED,
    };
    use crate::error::AchError;
    use crate::records::{Addenda05, Addenda98, AdvEntryDetail};

    fn batch_field(result: Result<()>) -> &'static str {
        match result {
            Err(AchError::Batch(e)) => e.field_name,
            other => panic!("expected a batch error, got {other:?}"),
        }
    }

    fn build(sec: &str, entries: Vec<EntryDetail>) -> Batch {
        let mut header = mock_header(sec);
        header.service_class_code = CREDITS_ONLY;
        let mut batch = Batch::new(header).unwrap();
        for entry in entries {
            batch.add_entry(entry);
        }
        batch.build().unwrap();
        batch
    }

    #[test]
    fn test_every_code_but_iat_has_a_policy() {
        for sec in ["ACK", "ADV", "CCD", "COR", "DNE", "ENR", "PPD", "TEL", "WEB"] {
            let sec: SecCode = sec.parse().unwrap();
            assert_eq!(policy_for(sec).map(|p| p.sec_code()), Some(sec));
        }
        assert!(policy_for(SecCode::Iat).is_none());
    }

    #[test]
    fn test_ccd_allows_one_addenda() {
        let entry = mock_entry(CHECKING_CREDIT, 100)
            .with_addenda05(Addenda05::new("one"))
            .with_addenda05(Addenda05::new("two"));
        let batch = build("CCD", vec![entry]);
        assert_eq!(batch_field(batch.validate()), "AddendaCount");
    }

    #[test]
    fn test_enr_allows_many_enrollments() {
        let entry = mock_entry(CHECKING_CREDIT, 0)
            .with_addenda05(Addenda05::new(
                "22*12200004*3*123987654321*777777777*DOE*JOHN*0\\",
            ))
            .with_addenda05(Addenda05::new(
                "27*12200004*3*123987654321*777777777*DOE*JANE*1\\",
            ));
        let mut batch = build("ENR", vec![entry]);
        assert_eq!(batch_field(batch.validate()), "CompanyEntryDescription");
        batch.header_mut().company_entry_description = "AUTOENROLL".to_string();
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_enr_rejects_malformed_payload() {
        let entry = mock_entry(CHECKING_CREDIT, 0).with_addenda05(Addenda05::new("22*1*2\\"));
        let mut header = mock_header("ENR");
        header.service_class_code = CREDITS_ONLY;
        header.company_entry_description = "AUTOENROLL".to_string();
        let mut batch = Batch::new(header).unwrap();
        batch.add_entry(entry);
        batch.build().unwrap();
        assert_eq!(batch_field(batch.validate()), "PaymentRelatedInformation");
    }

    #[test]
    fn test_dne_requires_one_payload() {
        let mut header = mock_header("DNE");
        header.service_class_code = CREDITS_ONLY;
        header.originator_status_code = 2;
        let mut batch = Batch::new(header).unwrap();
        batch.add_entry(mock_entry(CHECKING_PRENOTE_CREDIT, 0));
        batch.build().unwrap();
        assert_eq!(batch_field(batch.validate()), "AddendaCount");

        batch.entries_mut()[0].addenda05.push(Addenda05::new(
            "DATE OF DEATH*100719*CUSTOMER SSN*123456789*AMOUNT*12345.67\\",
        ));
        batch.build().unwrap();
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_ack_restricts_codes() {
        let batch = build("ACK", vec![mock_entry(CHECKING_CREDIT, 0)]);
        assert_eq!(batch_field(batch.validate()), "TransactionCode");
        let batch = build("ACK", vec![mock_entry(CHECKING_ZERO_DOLLAR_CREDIT, 0)]);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_tel_accepts_debits_only() {
        let batch = build("TEL", vec![mock_entry(CHECKING_CREDIT, 100)]);
        assert_eq!(batch_field(batch.validate()), "TransactionCode");
        let batch = build("TEL", vec![mock_entry(CHECKING_DEBIT, 100)]);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_web_requires_payment_type() {
        let mut entry = mock_entry(CHECKING_DEBIT, 100);
        let batch = build("WEB", vec![entry.clone()]);
        assert_eq!(batch_field(batch.validate()), "PaymentTypeCode");
        entry.discretionary_data = "S".to_string();
        assert!(build("WEB", vec![entry]).validate().is_ok());
    }

    #[test]
    fn test_cor_requires_change_addenda() {
        let mut entry = mock_entry(CHECKING_RETURN_NOC_CREDIT, 0);
        let batch = build("COR", vec![entry.clone()]);
        assert_eq!(batch_field(batch.validate()), "Addenda98");

        entry.addenda98 = Some(Addenda98 {
            change_code: "C01".to_string(),
            original_trace: 121_042_880_000_001,
            original_dfi: "12104288".to_string(),
            corrected_data: "1918171614".to_string(),
            ..Addenda98::default()
        });
        assert!(build("COR", vec![entry]).validate().is_ok());
    }

    #[test]
    fn test_addenda98_outside_cor_is_rejected() {
        let mut entry = mock_entry(CHECKING_RETURN_NOC_CREDIT, 0);
        entry.addenda98 = Some(Addenda98 {
            change_code: "C01".to_string(),
            original_trace: 121_042_880_000_001,
            original_dfi: "12104288".to_string(),
            corrected_data: "1918171614".to_string(),
            ..Addenda98::default()
        });
        let batch = build("PPD", vec![entry]);
        assert_eq!(batch_field(batch.validate()), "Addenda98");
    }

    #[test]
    fn test_adv_batch() {
        let mut header = mock_header("ADV");
        header.service_class_code = AUTOMATED_ACCOUNTING_ADVICES;
        header.originator_status_code = 0;
        let mut batch = Batch::new(header).unwrap();
        let mut entry =
            AdvEntryDetail::new(DEBIT_FOR_CREDITS_ORIGINATED, "231380104", "744-5678-99", 50_000);
        entry.advice_routing_number = "121042882".to_string();
        entry.file_identification = "11131".to_string();
        entry.ach_operator_routing_number = "01100001".to_string();
        entry.julian_day = 50;
        batch.add_adv_entry(entry);
        batch.build().unwrap();
        assert_eq!(batch.adv_control().total_debit_entry_dollar_amount, 50_000);
        assert_eq!(batch.adv_entries()[0].sequence_number, 1);
        assert!(batch.validate().is_ok());

        batch.add_entry(mock_entry(CHECKING_CREDIT, 1));
        assert_eq!(batch_field(batch.validate()), "Entries");
    }
}
