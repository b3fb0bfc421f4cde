//! Error types for parsing, building, and validating ACH files.
//!
//! Validation is fail-fast: every check returns the first rule it finds
//! violated. Errors carry the NACHA field name so callers can report a
//! precise location without echoing raw record content.

use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, AchError>;

/// The rule a field value violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Required field left at its default (blank or zero) value.
    #[error("is a mandatory field and has a default value")]
    Mandatory,

    #[error("has non alphanumeric characters")]
    NonAlphanumeric,

    #[error("has non numeric characters")]
    NonNumeric,

    #[error("is not uppercase A-Z or 0-9")]
    UpperAlpha,

    #[error("is not a valid date or time")]
    Date,

    #[error("is an invalid service class code")]
    ServiceClass,

    #[error("is an invalid standard entry class code")]
    SecCode,

    #[error("is an invalid transaction code")]
    TransactionCode,

    #[error("is an invalid addenda type code")]
    TypeCode,

    #[error("does not match the calculated check digit")]
    CheckDigit,

    #[error("is an invalid originator status code")]
    OriginatorStatus,

    #[error("is not a valid ISO 3166 country code")]
    CountryCode,

    #[error("is not a valid ISO 4217 currency code")]
    CurrencyCode,

    #[error("exceeds the field width")]
    Overflow,

    /// Any other field-level rule, described in text.
    #[error("{0}")]
    Invalid(String),
}

/// A single field that failed a record-level rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field_name} {value:?} {rule}")]
pub struct FieldError {
    /// NACHA field name, e.g. `CompanyIdentification`.
    pub field_name: &'static str,

    /// The offending value as text.
    pub value: String,

    /// The violated rule.
    pub rule: Rule,
}

impl FieldError {
    pub fn new(field_name: &'static str, value: impl ToString, rule: Rule) -> Self {
        FieldError {
            field_name,
            value: value.to_string(),
            rule,
        }
    }
}

/// What went wrong inside a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchFault {
    /// A record-level field error surfaced while checking the batch.
    #[error("{0}")]
    Field(FieldError),

    /// A stored value differs from the value it must equal.
    #[error("{found} does not match {expected}")]
    Mismatch { expected: String, found: String },

    #[error("{0}")]
    Message(String),
}

/// A batch-level failure, tagged with the batch number and SEC code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("batch #{batch_number} ({sec_code}) {field_name}: {fault}")]
pub struct BatchError {
    pub batch_number: u32,
    pub sec_code: String,
    pub field_name: &'static str,
    pub fault: BatchFault,
}

/// File-level failures: construction, structure, and file control totals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    /// SEC code this engine has no batch policy for.
    #[error("unsupported standard entry class code {0:?}")]
    UnsupportedSecCode(String),

    /// Record out of place, or an unrecognized record type.
    #[error("line {line}: {message}")]
    Structure { line: usize, message: String },

    #[error("line {line}: record length {length} is not 94")]
    RecordLength { line: usize, length: usize },

    /// File control value differs from the value derived from its batches.
    #[error("file control {field_name} {found} does not match calculated {expected}")]
    Control {
        field_name: &'static str,
        expected: String,
        found: String,
    },

    #[error("file must contain at least one batch")]
    NoBatches,

    /// Record parsed but failed its own field rules.
    #[error("line {line}: {source}")]
    Record { line: usize, source: FieldError },
}

/// Errors that can occur anywhere in the library.
#[derive(Error, Debug)]
pub enum AchError {
    /// Failed to read or write the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV report output error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Field(#[from] FieldError),

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("{0}")]
    File(#[from] FileError),

    /// A constructor argument failed a mandatory-field check.
    #[error("invalid constructor argument: {0}")]
    Constructor(FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display_names_field_value_and_rule() {
        let err = FieldError::new("CompanyName", "ACME\u{7f}", Rule::NonAlphanumeric);
        assert_eq!(
            err.to_string(),
            "CompanyName \"ACME\\u{7f}\" has non alphanumeric characters"
        );
    }

    #[test]
    fn test_batch_error_display_includes_batch_number() {
        let err = BatchError {
            batch_number: 7,
            sec_code: "PPD".to_string(),
            field_name: "EntryHash",
            fault: BatchFault::Mismatch {
                expected: "23138010".to_string(),
                found: "1".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "batch #7 (PPD) EntryHash: 1 does not match 23138010"
        );
    }
}
