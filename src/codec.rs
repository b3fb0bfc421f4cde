//! Fixed-width field codec for 94-character NACHA records.
//!
//! Numeric fields are right-justified and zero-padded; alphanumeric fields
//! are left-justified and space-padded. Rendering a number wider than its
//! field keeps the least-significant digits, which is how NACHA truncates
//! entry hashes.

use crate::error::{FieldError, Rule};
use chrono::{NaiveDate, NaiveTime};

/// Width of every ACH record.
pub const RECORD_LENGTH: usize = 94;

/// Renders `value` right-justified and zero-padded into `width` digits.
///
/// ```
/// use ach_engine::codec::numeric_field;
///
/// assert_eq!(numeric_field(42, 5), "00042");
/// assert_eq!(numeric_field(12_345_678_901, 10), "2345678901");
/// ```
pub fn numeric_field(value: u64, width: usize) -> String {
    let digits = value.to_string();
    if digits.len() > width {
        digits[digits.len() - width..].to_string()
    } else {
        format!("{:0>width$}", digits)
    }
}

/// Renders text left-justified and space-padded, truncating at `width`.
pub fn alpha_field(value: &str, width: usize) -> String {
    let truncated: String = value.chars().take(width).collect();
    format!("{:<width$}", truncated)
}

/// Renders a digit string (routing numbers, identifiers) right-justified and
/// zero-padded, keeping the leading `width` characters when too long.
pub fn digits_field(value: &str, width: usize) -> String {
    let truncated: String = value.chars().take(width).collect();
    format!("{:0>width$}", truncated)
}

/// Reduces `value` to its least-significant `width` decimal digits.
pub fn truncate_digits(value: u64, width: u32) -> u64 {
    match 10u64.checked_pow(width) {
        Some(modulus) => value % modulus,
        None => value,
    }
}

/// Returns `true` when a line can be sliced into fields.
///
/// Parsers treat anything else as unparseable and leave every field at its
/// default value; `validate` is what reports the problem.
pub fn is_parseable(line: &str) -> bool {
    line.len() == RECORD_LENGTH && line.is_ascii()
}

/// Sequential reader over the fields of one record.
///
/// Positions are consumed left to right, so a record parser reads like its
/// layout table.
pub struct Fields<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Fields<'a> {
    /// Starts reading at position 2, just past the record type code.
    pub fn new(line: &'a str) -> Self {
        Fields { line, pos: 1 }
    }

    /// Returns the next `width` characters untouched.
    pub fn raw(&mut self, width: usize) -> &'a str {
        let end = self.pos + width;
        let slice = self.line.get(self.pos..end).unwrap_or("");
        self.pos = end;
        slice
    }

    /// Skips a reserved region.
    pub fn skip(&mut self, width: usize) {
        self.pos += width;
    }

    /// Reads an alphanumeric field with its trailing padding removed.
    pub fn alpha(&mut self, width: usize) -> String {
        self.raw(width).trim_end().to_string()
    }

    /// Reads a digit-string field, trimmed of surrounding spaces.
    pub fn digits(&mut self, width: usize) -> String {
        self.raw(width).trim().to_string()
    }

    /// Reads a numeric field; a blank field reads as zero.
    pub fn numeric(&mut self, field_name: &'static str, width: usize) -> Result<u64, FieldError> {
        parse_numeric(field_name, self.raw(width))
    }

    /// Reads an optional numeric field; a blank field reads as `None`.
    pub fn optional_numeric(
        &mut self,
        field_name: &'static str,
        width: usize,
    ) -> Result<Option<u64>, FieldError> {
        let raw = self.raw(width);
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            parse_numeric(field_name, raw).map(Some)
        }
    }
}

/// Parses a numeric field. Blank reads as zero; any non-digit is an error.
pub fn parse_numeric(field_name: &'static str, raw: &str) -> Result<u64, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::new(field_name, raw, Rule::NonNumeric));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| FieldError::new(field_name, raw, Rule::Overflow))
}

/// Printable ASCII, the NACHA alphanumeric character set.
pub fn is_alphanumeric(value: &str) -> bool {
    value.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

/// Uppercase letters, digits and spaces.
pub fn is_upper_alphanumeric(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b' ')
}

pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn check_alphanumeric(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    if is_alphanumeric(value) {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::NonAlphanumeric))
    }
}

pub fn check_upper_alphanumeric(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    if is_upper_alphanumeric(value) {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::UpperAlpha))
    }
}

pub fn check_numeric(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    if is_numeric(value) {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::NonNumeric))
    }
}

/// Fails when a text field is blank or a digit field is all zeros.
pub fn check_mandatory(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.bytes().all(|b| b == b'0') {
        Err(FieldError::new(field_name, value, Rule::Mandatory))
    } else {
        Ok(())
    }
}

pub fn check_nonzero(field_name: &'static str, value: u64) -> Result<(), FieldError> {
    if value == 0 {
        Err(FieldError::new(field_name, value, Rule::Mandatory))
    } else {
        Ok(())
    }
}

/// Checks that a number fits the field it is rendered into.
pub fn check_width(field_name: &'static str, value: u64, width: u32) -> Result<(), FieldError> {
    if truncate_digits(value, width) == value {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::Overflow))
    }
}

/// Validates a `YYMMDD` date.
pub fn check_date(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    if value.len() == 6 && NaiveDate::parse_from_str(value, "%y%m%d").is_ok() {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::Date))
    }
}

/// Validates an `HHMM` time.
pub fn check_time(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    if value.len() == 4 && NaiveTime::parse_from_str(value, "%H%M").is_ok() {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::Date))
    }
}

/// Validates a `MMDD` month and day, allowing February 29.
pub fn check_month_day(field_name: &'static str, value: &str) -> Result<(), FieldError> {
    let in_leap_year = format!("2000{}", value);
    if value.len() == 4 && NaiveDate::parse_from_str(&in_leap_year, "%Y%m%d").is_ok() {
        Ok(())
    } else {
        Err(FieldError::new(field_name, value, Rule::Date))
    }
}

/// Computes the ABA check digit for the first eight digits of a routing
/// number using the 3-7-1 weighting.
///
/// ```
/// use ach_engine::codec::routing_check_digit;
///
/// assert_eq!(routing_check_digit("23138010"), Some(4));
/// assert_eq!(routing_check_digit("2313801"), None);
/// ```
pub fn routing_check_digit(routing: &str) -> Option<u8> {
    if routing.len() != 8 || !is_numeric(routing) {
        return None;
    }
    const WEIGHTS: [u32; 8] = [3, 7, 1, 3, 7, 1, 3, 7];
    let sum: u32 = routing
        .bytes()
        .zip(WEIGHTS)
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    Some(((10 - sum % 10) % 10) as u8)
}
