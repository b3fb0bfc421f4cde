//! File Header record (type 1).

use crate::codec::{
    alpha_field, check_alphanumeric, check_date, check_mandatory, check_numeric, check_time,
    check_upper_alphanumeric, is_parseable, Fields,
};
use crate::error::{FieldError, Rule};
use log::debug;
use std::fmt;

const RECORD_SIZE: &str = "094";
const BLOCKING_FACTOR: &str = "10";
const FORMAT_CODE: &str = "1";

/// Identifies the sender and receiver of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub priority_code: String,

    /// Routing number of the receiving point (usually 9 digits).
    pub immediate_destination: String,

    /// Routing number or company identifier of the sending point.
    pub immediate_origin: String,

    /// `YYMMDD`.
    pub file_creation_date: String,

    /// `HHMM`, optional.
    pub file_creation_time: String,

    /// Distinguishes files created on the same date (A-Z, 0-9).
    pub file_id_modifier: String,

    pub immediate_destination_name: String,
    pub immediate_origin_name: String,
    pub reference_code: String,
}

impl Default for FileHeader {
    fn default() -> Self {
        FileHeader {
            priority_code: "01".to_string(),
            immediate_destination: String::new(),
            immediate_origin: String::new(),
            file_creation_date: String::new(),
            file_creation_time: String::new(),
            file_id_modifier: "A".to_string(),
            immediate_destination_name: String::new(),
            immediate_origin_name: String::new(),
            reference_code: String::new(),
        }
    }
}

impl FileHeader {
    pub fn parse(line: &str) -> Result<Self, FieldError> {
        if !is_parseable(line) {
            debug!("file header has length {}, leaving defaults", line.len());
            return Ok(FileHeader::default());
        }
        let mut f = Fields::new(line);
        let priority_code = f.digits(2);
        let immediate_destination = f.digits(10);
        let immediate_origin = f.digits(10);
        let file_creation_date = f.alpha(6);
        let file_creation_time = f.alpha(4);
        let file_id_modifier = f.alpha(1);
        f.skip(RECORD_SIZE.len() + BLOCKING_FACTOR.len() + FORMAT_CODE.len());
        Ok(FileHeader {
            priority_code,
            immediate_destination,
            immediate_origin,
            file_creation_date,
            file_creation_time,
            file_id_modifier,
            immediate_destination_name: f.alpha(23),
            immediate_origin_name: f.alpha(23),
            reference_code: f.alpha(8),
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_mandatory("ImmediateDestination", &self.immediate_destination)?;
        check_mandatory("ImmediateOrigin", &self.immediate_origin)?;
        check_mandatory("FileCreationDate", &self.file_creation_date)?;
        check_mandatory("FileIDModifier", &self.file_id_modifier)?;

        check_numeric("PriorityCode", &self.priority_code)?;
        check_numeric("ImmediateDestination", &self.immediate_destination)?;
        if self.immediate_destination.len() > 10 {
            return Err(FieldError::new(
                "ImmediateDestination",
                &self.immediate_destination,
                Rule::Overflow,
            ));
        }
        check_alphanumeric("ImmediateOrigin", &self.immediate_origin)?;
        check_date("FileCreationDate", &self.file_creation_date)?;
        if !self.file_creation_time.is_empty() {
            check_time("FileCreationTime", &self.file_creation_time)?;
        }
        if self.file_id_modifier.len() != 1 {
            return Err(FieldError::new(
                "FileIDModifier",
                &self.file_id_modifier,
                Rule::UpperAlpha,
            ));
        }
        check_upper_alphanumeric("FileIDModifier", &self.file_id_modifier)?;
        check_alphanumeric("ImmediateDestinationName", &self.immediate_destination_name)?;
        check_alphanumeric("ImmediateOriginName", &self.immediate_origin_name)?;
        check_alphanumeric("ReferenceCode", &self.reference_code)
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1{}{:>10}{:>10}{}{}{}{}{}{}{}{}{}",
            alpha_field(&self.priority_code, 2),
            self.immediate_destination,
            self.immediate_origin,
            alpha_field(&self.file_creation_date, 6),
            alpha_field(&self.file_creation_time, 4),
            alpha_field(&self.file_id_modifier, 1),
            RECORD_SIZE,
            BLOCKING_FACTOR,
            FORMAT_CODE,
            alpha_field(&self.immediate_destination_name, 23),
            alpha_field(&self.immediate_origin_name, 23),
            alpha_field(&self.reference_code, 8),
        )
    }
}
