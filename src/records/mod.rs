//! Typed NACHA records.
//!
//! Every record offers the same trio:
//!
//! - `parse(line)` reads a 94-character line. A line of the wrong length
//!   leaves every field at its default value instead of failing; only
//!   malformed digits inside a numeric field are reported.
//! - `Display` renders exactly 94 characters.
//! - `validate()` checks field-level rules without mutating anything.

pub mod addenda;
pub mod adv_entry_detail;
pub mod batch_control;
pub mod batch_header;
pub mod entry_detail;
pub mod file_control;
pub mod file_header;
pub mod iat_addenda;
pub mod iat_batch_header;
pub mod iat_entry_detail;

pub use addenda::{Addenda02, Addenda05, Addenda98, Addenda99};
pub use adv_entry_detail::AdvEntryDetail;
pub use batch_control::{AdvBatchControl, BatchControl};
pub use batch_header::BatchHeader;
pub use entry_detail::EntryDetail;
pub use file_control::{AdvFileControl, FileControl};
pub use file_header::FileHeader;
pub use iat_addenda::{
    Addenda10, Addenda11, Addenda12, Addenda13, Addenda14, Addenda15, Addenda16, Addenda17,
    Addenda18,
};
pub use iat_batch_header::IatBatchHeader;
pub use iat_entry_detail::IatEntryDetail;

pub const FILE_HEADER: char = '1';
pub const BATCH_HEADER: char = '5';
pub const ENTRY_DETAIL: char = '6';
pub const ADDENDA: char = '7';
pub const BATCH_CONTROL: char = '8';
pub const FILE_CONTROL: char = '9';

/// Divisor splitting a 15-digit trace number into its 8-digit ODFI prefix
/// and 7-digit sequence.
pub const TRACE_SEQUENCE_MODULUS: u64 = 10_000_000;

/// Entries identified by a trace number.
///
/// Setting the trace number re-stamps every addenda backlink so the entry
/// and its addenda never disagree.
pub trait TraceNumbered {
    fn trace_number(&self) -> u64;

    fn set_trace_number(&mut self, trace_number: u64);

    /// Trailing seven digits of the trace number.
    fn trace_sequence(&self) -> u32 {
        (self.trace_number() % TRACE_SEQUENCE_MODULUS) as u32
    }

    /// Leading eight digits of the trace number.
    fn trace_odfi(&self) -> u64 {
        self.trace_number() / TRACE_SEQUENCE_MODULUS
    }
}

/// Composes a trace number from an ODFI identification and a sequence.
pub fn trace_number(odfi_identification: &str, sequence: u32) -> u64 {
    let odfi: u64 = odfi_identification.trim().parse().unwrap_or(0);
    odfi * TRACE_SEQUENCE_MODULUS + u64::from(sequence) % TRACE_SEQUENCE_MODULUS
}

/// Record type code of a raw line, if it has one.
pub fn record_type(line: &str) -> Option<char> {
    line.chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_number_composition() {
        assert_eq!(trace_number("12104288", 1), 121_042_880_000_001);
        assert_eq!(trace_number("12104288", 1) / TRACE_SEQUENCE_MODULUS, 12_104_288);
    }
}
