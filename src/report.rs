//! CSV listing of the entries in an ACH file.

use crate::codes::{is_credit, is_debit};
use crate::decimal::Dollars;
use crate::error::Result;
use crate::records::{BatchHeader, EntryDetail};
use serde::Serialize;
use std::io::Write;

const COLUMNS: [&str; 11] = [
    "batch",
    "sec",
    "company",
    "transaction_code",
    "direction",
    "category",
    "routing",
    "account",
    "amount",
    "name",
    "trace",
];

/// One CSV row, in `COLUMNS` order.
#[derive(Serialize)]
struct EntryRow<'a> {
    batch: u32,
    sec: &'a str,
    company: &'a str,
    transaction_code: u8,
    direction: &'static str,
    category: String,
    routing: String,
    account: &'a str,
    amount: Dollars,
    name: &'a str,
    trace: String,
}

/// Totals over the entries written to a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub entries: usize,
    pub debit: Dollars,
    pub credit: Dollars,
}

/// Writes one CSV row per entry, in the order given.
///
/// Amounts are formatted in dollars with two decimal places. Stops at the
/// first error from `entries`.
pub fn write_entries<I, W>(entries: I, writer: W) -> Result<ReportTotals>
where
    I: IntoIterator<Item = Result<(BatchHeader, EntryDetail)>>,
    W: Write,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(COLUMNS)?;

    let mut totals = ReportTotals::default();
    for item in entries {
        let (header, entry) = item?;
        let amount = Dollars::from_cents(entry.amount);
        let direction = if is_credit(entry.transaction_code) {
            totals.credit += amount;
            "credit"
        } else if is_debit(entry.transaction_code) {
            totals.debit += amount;
            "debit"
        } else {
            ""
        };
        totals.entries += 1;
        csv_writer.serialize(EntryRow {
            batch: header.batch_number,
            sec: &header.standard_entry_class_code,
            company: &header.company_name,
            transaction_code: entry.transaction_code,
            direction,
            category: entry.category().to_string(),
            routing: format!("{}{}", entry.rdfi_identification, entry.check_digit),
            account: &entry.dfi_account_number,
            amount,
            name: &entry.individual_name,
            trace: format!("{:015}", entry.trace_number),
        })?;
    }

    csv_writer.flush()?;
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::tests::mock_file;
    use crate::iterator::EntryIterator;
    use crate::writer::file_lines;
    use std::io::Cursor;

    #[test]
    fn test_writes_header_and_rows() {
        let text = file_lines(&mock_file()).join("\n");
        let mut output = Vec::new();
        let totals = write_entries(EntryIterator::new(Cursor::new(text)), &mut output).unwrap();
        let csv = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "batch,sec,company,transaction_code,direction,category,routing,account,amount,name,trace"
        );
        assert_eq!(
            lines[1],
            "1,PPD,Name on Account,22,credit,Forward,231380104,123456789,1000.00,Best Co. #23,121042880000001"
        );
        assert!(lines[2].starts_with("2,PPD,Name on Account,27,debit,"));
        assert_eq!(totals.entries, 2);
        assert_eq!(totals.credit.to_string(), "1000.00");
        assert_eq!(totals.debit.to_string(), "1000.00");
    }
}
