//! # ACH Engine
//!
//! Reads, builds, validates and writes NACHA ACH files.
//!
//! ## Design Principles
//!
//! - **Fixed-width records**: every record is a 94-character line with a
//!   `parse`/`Display`/`validate` trio
//! - **Derived controls**: `build` computes trace numbers, hashes and totals;
//!   `validate` re-derives them and never mutates
//! - **Per-SEC policies**: batch rules are dispatched on the SEC code
//! - **Streaming**: [`EntryIterator`] scans a file one entry at a time
//!
//! ## Example
//!
//! ```no_run
//! use ach_engine::{EntryIterator, Reader};
//! use std::io::BufReader;
//!
//! let file = Reader::new(BufReader::new(std::fs::File::open("ppd.ach").unwrap()))
//!     .read()
//!     .unwrap();
//! file.validate().unwrap();
//!
//! let source = BufReader::new(std::fs::File::open("ppd.ach").unwrap());
//! for item in EntryIterator::new(source) {
//!     let (header, entry) = item.unwrap();
//!     println!("{} {}", header.batch_number, entry.amount);
//! }
//! ```

pub mod batch;
pub mod codec;
pub mod codes;
pub mod decimal;
pub mod error;
pub mod file;
pub mod flatten;
pub mod iat_batch;
pub mod iso;
pub mod iterator;
pub mod payload;
pub mod policy;
pub mod reader;
pub mod records;
pub mod report;
pub mod writer;

pub use batch::{Batch, ControlTotals, ValidateOpts};
pub use codes::{Category, SecCode};
pub use decimal::Dollars;
pub use error::{AchError, BatchError, BatchFault, FieldError, FileError, Result, Rule};
pub use file::File;
pub use flatten::FlattenStrategy;
pub use iat_batch::IatBatch;
pub use iterator::EntryIterator;
pub use reader::Reader;
pub use writer::Writer;
