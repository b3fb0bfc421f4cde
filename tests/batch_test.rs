//! Batch engine tests through the public API.

use ach_engine::codes::{CHECKING_CREDIT, CHECKING_DEBIT, CREDITS_ONLY, MIXED_DEBITS_AND_CREDITS};
use ach_engine::records::{Addenda05, BatchHeader, EntryDetail};
use ach_engine::{AchError, Batch, BatchFault, Category, SecCode, ValidateOpts};

fn header(sec: &str) -> BatchHeader {
    BatchHeader {
        service_class_code: MIXED_DEBITS_AND_CREDITS,
        company_name: "Acme Corp".to_string(),
        company_identification: "121042882".to_string(),
        standard_entry_class_code: sec.to_string(),
        company_entry_description: "PAYROLL".to_string(),
        effective_entry_date: "240105".to_string(),
        originator_status_code: 1,
        odfi_identification: "12104288".to_string(),
        batch_number: 1,
        ..BatchHeader::default()
    }
}

fn entry(code: u8, amount: u64) -> EntryDetail {
    let mut entry = EntryDetail::new(code, "231380104", "744-5678-99", amount);
    entry.individual_name = "Receiver Account Name".to_string();
    entry.identification_number = "EMP0042".to_string();
    entry
}

fn batch_error_field(result: ach_engine::Result<()>) -> &'static str {
    match result {
        Err(AchError::Batch(e)) => e.field_name,
        other => panic!("expected a batch error, got {other:?}"),
    }
}

#[test]
fn test_tampered_credit_total_names_field() {
    let mut batch = Batch::new(header("PPD")).unwrap();
    batch.add_entry(entry(CHECKING_CREDIT, 100));
    batch.add_entry(entry(CHECKING_CREDIT, 100));
    batch.build().unwrap();
    assert!(batch.validate().is_ok());

    batch.control_mut().total_credit_entry_dollar_amount = 1;
    match batch.validate() {
        Err(AchError::Batch(e)) => {
            assert_eq!(e.field_name, "TotalCreditEntryDollarAmount");
            assert_eq!(e.batch_number, 1);
            assert_eq!(e.sec_code, "PPD");
            assert_eq!(
                e.fault,
                BatchFault::Mismatch {
                    expected: "200".to_string(),
                    found: "1".to_string(),
                }
            );
        }
        other => panic!("expected a batch error, got {other:?}"),
    }
}

#[test]
fn test_totals_split_by_direction() {
    let mut batch = Batch::new(header("PPD")).unwrap();
    batch.add_entry(entry(CHECKING_CREDIT, 2_500));
    batch.add_entry(entry(CHECKING_DEBIT, 1_000));
    batch.add_entry(entry(CHECKING_DEBIT, 250));
    batch.create().unwrap();

    let control = batch.control();
    assert_eq!(control.total_credit_entry_dollar_amount, 2_500);
    assert_eq!(control.total_debit_entry_dollar_amount, 1_250);
    assert_eq!(control.entry_addenda_count, 3);
    assert_eq!(control.entry_hash, 3 * 23_138_010);
    assert_eq!(batch.category(), Category::Forward);
}

#[test]
fn test_addenda_count_toward_control() {
    let mut batch = Batch::new(header("PPD")).unwrap();
    batch.add_entry(entry(CHECKING_CREDIT, 100).with_addenda05(Addenda05::new("bonus")));
    batch.add_entry(entry(CHECKING_CREDIT, 100));
    batch.create().unwrap();

    assert_eq!(batch.control().entry_addenda_count, 3);
    let first = &batch.entries()[0];
    assert_eq!(first.addenda_record_indicator, 1);
    assert_eq!(first.addenda05[0].sequence_number, 1);
    assert_eq!(first.addenda05[0].entry_detail_sequence_number, 1);
    assert_eq!(batch.entries()[1].addenda_record_indicator, 0);
}

#[test]
fn test_enr_allows_many_addenda_but_ccd_does_not() {
    let payloads = [
        "22*12200004*3*123987654321*777777777*DOE*JOHN*0\\",
        "27*12200004*3*987654321123*777777777*DOE*JOHN*0\\",
    ];
    let mut enrollment = entry(CHECKING_CREDIT, 0);
    for payload in payloads {
        enrollment.addenda05.push(Addenda05::new(payload));
    }
    let mut enr_header = header("ENR");
    enr_header.service_class_code = CREDITS_ONLY;
    enr_header.company_entry_description = "AUTOENROLL".to_string();
    let mut enr = Batch::new(enr_header).unwrap();
    enr.add_entry(enrollment);
    enr.create().unwrap();
    assert_eq!(enr.sec_code(), SecCode::Enr);

    let mut ccd = Batch::new(header("CCD")).unwrap();
    ccd.add_entry(
        entry(CHECKING_CREDIT, 100)
            .with_addenda05(Addenda05::new("one"))
            .with_addenda05(Addenda05::new("two")),
    );
    ccd.build().unwrap();
    assert_eq!(batch_error_field(ccd.validate()), "AddendaCount");
}

#[test]
fn test_validate_does_not_mutate() {
    let mut batch = Batch::new(header("PPD")).unwrap();
    batch.add_entry(entry(CHECKING_CREDIT, 100));
    batch.build().unwrap();
    batch.control_mut().entry_hash = 42;

    let snapshot = batch.clone();
    let first = batch.validate().unwrap_err().to_string();
    let second = batch.validate().unwrap_err().to_string();
    assert_eq!(first, second);
    assert_eq!(batch, snapshot);
}

#[test]
fn test_header_control_disagreement_can_be_relaxed() {
    let mut batch = Batch::new(header("PPD")).unwrap();
    batch.add_entry(entry(CHECKING_CREDIT, 100));
    batch.build().unwrap();
    batch.control_mut().service_class_code = CREDITS_ONLY;

    assert_eq!(batch_error_field(batch.validate()), "ServiceClassCode");
    let relaxed = ValidateOpts {
        skip_service_class_check: true,
        ..ValidateOpts::default()
    };
    assert!(batch.validate_with(relaxed).is_ok());
}

#[test]
fn test_unknown_sec_code_fails_at_construction() {
    let err = Batch::new(header("XYZ")).unwrap_err();
    assert_eq!(err.to_string(), "unsupported standard entry class code \"XYZ\"");
}
