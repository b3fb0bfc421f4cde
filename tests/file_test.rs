//! File assembly, reading, writing, streaming and flattening.

use ach_engine::codes::{
    AUTOMATED_ACCOUNTING_ADVICES, CHECKING_CREDIT, CHECKING_DEBIT, DEBIT_FOR_CREDITS_ORIGINATED,
    MIXED_DEBITS_AND_CREDITS,
};
use ach_engine::records::{
    trace_number, AdvEntryDetail, BatchHeader, EntryDetail, FileHeader, TraceNumbered,
};
use ach_engine::{AchError, Batch, EntryIterator, File, FileError, FlattenStrategy, Reader, Writer};
use std::io::Cursor;

fn file_header() -> FileHeader {
    FileHeader {
        immediate_destination: "231380104".to_string(),
        immediate_origin: "121042882".to_string(),
        file_creation_date: "240105".to_string(),
        file_creation_time: "0930".to_string(),
        immediate_destination_name: "Federal Reserve Bank".to_string(),
        immediate_origin_name: "My Bank Name".to_string(),
        ..FileHeader::default()
    }
}

fn batch_header(number: u32) -> BatchHeader {
    BatchHeader {
        service_class_code: MIXED_DEBITS_AND_CREDITS,
        company_name: "Acme Corp".to_string(),
        company_identification: "121042882".to_string(),
        standard_entry_class_code: "PPD".to_string(),
        company_entry_description: "PAYROLL".to_string(),
        effective_entry_date: "240105".to_string(),
        originator_status_code: 1,
        odfi_identification: "12104288".to_string(),
        batch_number: number,
        ..BatchHeader::default()
    }
}

fn entry(code: u8, amount: u64) -> EntryDetail {
    let mut entry = EntryDetail::new(code, "231380104", "987654321", amount);
    entry.individual_name = "Receiver Account Name".to_string();
    entry
}

fn payroll_file() -> File {
    let mut file = File::new(file_header());
    let mut credits = Batch::new(batch_header(1)).unwrap();
    credits.add_entry(entry(CHECKING_CREDIT, 100_000));
    credits.add_entry(entry(CHECKING_CREDIT, 25_050));
    credits.create().unwrap();
    file.add_batch(credits);

    let mut debits = Batch::new(batch_header(2)).unwrap();
    debits.add_entry(entry(CHECKING_DEBIT, 7_500));
    debits.create().unwrap();
    file.add_batch(debits);
    file.create().unwrap();
    file
}

fn write(file: &File) -> String {
    let mut writer = Writer::new(Vec::new());
    writer.write(file).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

fn read(text: &str) -> ach_engine::Result<File> {
    Reader::new(Cursor::new(text.to_string())).read()
}

/// Four single-entry batches with identical headers apart from the batch
/// number, carrying trace sequences 1, 2, 1, 3.
fn colliding_file() -> File {
    let mut file = File::new(file_header());
    for (number, sequence) in [(1, 1), (2, 2), (3, 1), (4, 3)] {
        let mut batch = Batch::new(batch_header(number)).unwrap();
        batch.add_entry(entry(CHECKING_CREDIT, 1_000 * u64::from(number)));
        batch.build().unwrap();
        batch.entries_mut()[0].set_trace_number(trace_number("12104288", sequence));
        file.add_batch(batch);
    }
    file.build().unwrap();
    file
}

fn sequences(batch: &Batch) -> Vec<u32> {
    batch.entries().iter().map(|e| e.trace_sequence()).collect()
}

#[test]
fn test_file_control_totals() {
    let file = payroll_file();
    let control = file.control();
    assert_eq!(control.batch_count, 2);
    assert_eq!(control.entry_addenda_count, 3);
    assert_eq!(control.entry_hash, 3 * 23_138_010);
    assert_eq!(control.total_credit_entry_dollar_amount_in_file, 125_050);
    assert_eq!(control.total_debit_entry_dollar_amount_in_file, 7_500);
    assert_eq!(control.block_count, 1);
}

#[test]
fn test_written_file_reads_back() {
    let text = write(&payroll_file());
    assert_eq!(text.lines().count(), 10);
    assert!(text.lines().all(|line| line.len() == 94));

    let file = read(&text).unwrap();
    assert!(file.validate().is_ok());
    assert_eq!(file.batches().len(), 2);
    assert_eq!(file.batches()[0].entries()[1].amount, 25_050);
    assert_eq!(write(&file), text);
}

#[test]
fn test_tampered_file_control_is_reported() {
    let mut file = payroll_file();
    file.control_mut().total_debit_entry_dollar_amount_in_file = 1;
    let file = read(&write(&file)).unwrap();
    match file.validate() {
        Err(AchError::File(FileError::Control {
            field_name,
            expected,
            found,
        })) => {
            assert_eq!(field_name, "TotalDebitEntryDollarAmountInFile");
            assert_eq!(expected, "7500");
            assert_eq!(found, "1");
        }
        other => panic!("expected a file control error, got {other:?}"),
    }
}

#[test]
fn test_crlf_and_unbroken_input() {
    let text = write(&payroll_file());
    assert!(read(&text.replace('\n', "\r\n")).is_ok());

    let unbroken: String = text.lines().collect();
    let file = read(&unbroken).unwrap();
    assert_eq!(file.batches().len(), 2);
}

#[test]
fn test_entry_outside_batch_is_a_structure_error() {
    let text = write(&payroll_file());
    let mut lines: Vec<&str> = text.lines().collect();
    lines.remove(1);
    match read(&lines.join("\n")) {
        Err(AchError::File(FileError::Structure { line, message })) => {
            assert_eq!(line, 2);
            assert_eq!(message, "entry detail outside a batch");
        }
        other => panic!("expected a structure error, got {other:?}"),
    }
}

#[test]
fn test_adv_file_uses_adv_controls() {
    let mut header = batch_header(1);
    header.standard_entry_class_code = "ADV".to_string();
    header.service_class_code = AUTOMATED_ACCOUNTING_ADVICES;
    header.originator_status_code = 0;
    let mut batch = Batch::new(header).unwrap();
    let mut advice =
        AdvEntryDetail::new(DEBIT_FOR_CREDITS_ORIGINATED, "231380104", "744-5678-99", 50_000);
    advice.advice_routing_number = "121042882".to_string();
    advice.file_identification = "11131".to_string();
    advice.ach_operator_routing_number = "01100001".to_string();
    advice.julian_day = 50;
    batch.add_adv_entry(advice);
    batch.create().unwrap();

    let mut file = File::new(file_header());
    file.add_batch(batch);
    file.create().unwrap();
    assert!(file.is_adv());
    assert_eq!(file.adv_control().total_debit_entry_dollar_amount_in_file, 50_000);

    let text = write(&file);
    let reread = read(&text).unwrap();
    assert!(reread.validate().is_ok());
    assert_eq!(reread.batches()[0].adv_entries()[0].julian_day, 50);
    assert_eq!(write(&reread), text);
}

#[test]
fn test_iterator_streams_entries_in_order() {
    let text = write(&payroll_file());
    let entries: Vec<_> = EntryIterator::new(Cursor::new(text))
        .collect::<ach_engine::Result<_>>()
        .unwrap();
    let amounts: Vec<u64> = entries.iter().map(|(_, e)| e.amount).collect();
    assert_eq!(amounts, vec![100_000, 25_050, 7_500]);
    assert_eq!(entries[2].0.batch_number, 2);
}

#[test]
fn test_iterator_synthesizes_header_for_orphan_entries() {
    let text = write(&payroll_file());
    let orphans: Vec<&str> = text.lines().filter(|l| l.starts_with('6')).collect();
    let mut iter = EntryIterator::new(Cursor::new(orphans.join("\n")));

    let (header, first) = iter.next_entry().unwrap().unwrap();
    assert_eq!(header.standard_entry_class_code, "PPD");
    assert_eq!(header.service_class_code, MIXED_DEBITS_AND_CREDITS);
    assert_eq!(first.amount, 100_000);
    assert_eq!(iter.by_ref().count(), 2);
    assert!(iter.next_entry().unwrap().is_none());
}

#[test]
fn test_flatten_splits_on_trace_collision() {
    let flat = colliding_file()
        .flatten_with(FlattenStrategy::SplitOnCollision)
        .unwrap();
    assert_eq!(flat.batches().len(), 2);
    assert_eq!(sequences(&flat.batches()[0]), vec![1, 2]);
    assert_eq!(sequences(&flat.batches()[1]), vec![1, 3]);
    let numbers: Vec<u32> = flat.batches().iter().map(|b| b.header().batch_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert!(flat.validate().is_ok());
}

#[test]
fn test_flatten_renumbers_by_default() {
    let original = colliding_file();
    let flat = original.flatten().unwrap();
    assert_eq!(flat.batches().len(), 1);
    assert_eq!(sequences(&flat.batches()[0]), vec![1, 2, 3, 4]);
    assert_eq!(
        flat.control().total_credit_entry_dollar_amount_in_file,
        original.control().total_credit_entry_dollar_amount_in_file
    );
    assert_eq!(flat.control().entry_hash, original.control().entry_hash);
    assert!(flat.validate().is_ok());
}
