//! Structured payloads carried inside the Addenda05 payment related
//! information of DNE and ENR entries.
//!
//! Both use `*` between values and end with a `\`. A payload with the
//! wrong number of values is an error rather than a partially filled
//! struct.

use crate::codec::{check_date, is_numeric};
use crate::decimal::Dollars;
use crate::error::{FieldError, Rule};
use std::fmt;

const FIELD_NAME: &str = "PaymentRelatedInformation";

/// Transaction codes an enrollment may request.
pub const ENROLLMENT_TRANSACTION_CODES: [u8; 4] = [22, 27, 32, 37];

fn invalid(text: &str, message: impl Into<String>) -> FieldError {
    FieldError::new(FIELD_NAME, text, Rule::Invalid(message.into()))
}

/// Splits a `*`-delimited, `\`-terminated payload into exactly `expected`
/// values.
fn split_values(text: &str, expected: usize) -> Result<Vec<&str>, FieldError> {
    let body = text
        .trim_end()
        .strip_suffix('\\')
        .ok_or_else(|| invalid(text, "missing terminating backslash"))?;
    let values: Vec<&str> = body.split('*').collect();
    if values.len() != expected {
        return Err(invalid(
            text,
            format!("expected {} values, found {}", expected, values.len()),
        ));
    }
    Ok(values)
}

fn check_label(text: &str, found: &str, label: &str) -> Result<(), FieldError> {
    if found == label {
        Ok(())
    } else {
        Err(invalid(text, format!("expected label {:?}", label)))
    }
}

fn check_digits(text: &str, value: &str, name: &str, width: usize) -> Result<(), FieldError> {
    if value.len() == width && is_numeric(value) {
        Ok(())
    } else {
        Err(invalid(text, format!("{} must be {} digits", name, width)))
    }
}

/// `DATE OF DEATH*YYMMDD*CUSTOMER SSN*#########*AMOUNT*$$$$.cc\`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeathNotification {
    /// `YYMMDD`.
    pub date_of_death: String,
    pub customer_ssn: String,
    pub amount: Dollars,
}

impl DeathNotification {
    pub fn parse(text: &str) -> Result<Self, FieldError> {
        let values = split_values(text, 6)?;
        check_label(text, values[0], "DATE OF DEATH")?;
        check_label(text, values[2], "CUSTOMER SSN")?;
        check_label(text, values[4], "AMOUNT")?;

        check_date("DateOfDeath", values[1])?;
        check_digits(text, values[3], "customer SSN", 9)?;
        let amount: Dollars = values[5]
            .parse()
            .map_err(|e| invalid(text, format!("amount {}", e)))?;
        Ok(DeathNotification {
            date_of_death: values[1].to_string(),
            customer_ssn: values[3].to_string(),
            amount,
        })
    }
}

impl fmt::Display for DeathNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DATE OF DEATH*{}*CUSTOMER SSN*{}*AMOUNT*{}\\",
            self.date_of_death, self.customer_ssn, self.amount
        )
    }
}

/// `TransactionCode*RDFI*CheckDigit*Account*SSN*Surname*FirstName*RepPayee\`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrollment {
    pub transaction_code: u8,
    pub rdfi_identification: String,
    pub check_digit: u8,
    pub dfi_account_number: String,
    pub individual_identification: String,
    pub individual_surname: String,
    pub individual_first_name: String,

    /// 0 when the enrollee is the beneficiary, 1 for a representative payee.
    pub representative_payee_indicator: u8,
}

impl Enrollment {
    pub fn parse(text: &str) -> Result<Self, FieldError> {
        let values = split_values(text, 8)?;

        check_digits(text, values[0], "transaction code", 2)?;
        let transaction_code: u8 = values[0]
            .parse()
            .map_err(|_| invalid(text, "transaction code must be numeric"))?;
        if !ENROLLMENT_TRANSACTION_CODES.contains(&transaction_code) {
            return Err(FieldError::new(
                FIELD_NAME,
                transaction_code,
                Rule::TransactionCode,
            ));
        }
        check_digits(text, values[1], "RDFI identification", 8)?;
        check_digits(text, values[2], "check digit", 1)?;
        if values[3].is_empty() {
            return Err(invalid(text, "account number is required"));
        }
        check_digits(text, values[4], "individual identification", 9)?;
        if values[5].is_empty() {
            return Err(invalid(text, "surname is required"));
        }
        let representative_payee_indicator = match values[7] {
            "0" => 0,
            "1" => 1,
            _ => return Err(invalid(text, "representative payee indicator must be 0 or 1")),
        };

        Ok(Enrollment {
            transaction_code,
            rdfi_identification: values[1].to_string(),
            check_digit: values[2].parse().unwrap_or_default(),
            dfi_account_number: values[3].to_string(),
            individual_identification: values[4].to_string(),
            individual_surname: values[5].to_string(),
            individual_first_name: values[6].to_string(),
            representative_payee_indicator,
        })
    }
}

impl fmt::Display for Enrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}*{}*{}*{}*{}*{}*{}*{}\\",
            self.transaction_code,
            self.rdfi_identification,
            self.check_digit,
            self.dfi_account_number,
            self.individual_identification,
            self.individual_surname,
            self.individual_first_name,
            self.representative_payee_indicator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_death_notification() {
        let text = "DATE OF DEATH*100719*CUSTOMER SSN*123456789*AMOUNT*12345.67\\";
        let payload = DeathNotification::parse(text).unwrap();
        assert_eq!(payload.date_of_death, "100719");
        assert_eq!(payload.customer_ssn, "123456789");
        assert_eq!(payload.amount.cents(), Some(1_234_567));
        assert_eq!(payload.to_string(), text);
    }

    #[test]
    fn test_death_notification_rejects_negative_amount() {
        let err = DeathNotification::parse("DATE OF DEATH*100719*CUSTOMER SSN*123456789*AMOUNT*-5\\")
            .unwrap_err();
        assert!(err.to_string().contains("may not be negative"));
    }

    #[test]
    fn test_death_notification_field_count_is_an_error() {
        let err = DeathNotification::parse("DATE OF DEATH*100719*CUSTOMER SSN*123456789\\")
            .unwrap_err();
        assert_eq!(err.field_name, "PaymentRelatedInformation");
        assert!(err.to_string().contains("expected 6 values, found 4"));
    }

    #[test]
    fn test_death_notification_requires_terminator_and_date() {
        assert!(
            DeathNotification::parse("DATE OF DEATH*100719*CUSTOMER SSN*123456789*AMOUNT*1")
                .is_err()
        );
        let err = DeathNotification::parse("DATE OF DEATH*101399*CUSTOMER SSN*123456789*AMOUNT*1\\")
            .unwrap_err();
        assert_eq!(err.rule, Rule::Date);
    }

    #[test]
    fn test_enrollment() {
        let text = "22*12200004*3*123987654321*777777777*DOE*JOHN*0\\";
        let payload = Enrollment::parse(text).unwrap();
        assert_eq!(payload.transaction_code, 22);
        assert_eq!(payload.rdfi_identification, "12200004");
        assert_eq!(payload.check_digit, 3);
        assert_eq!(payload.individual_first_name, "JOHN");
        assert_eq!(payload.representative_payee_indicator, 0);
        assert_eq!(payload.to_string(), text);
    }

    #[test]
    fn test_enrollment_rejects_other_transaction_codes() {
        let err = Enrollment::parse("23*12200004*3*123987654321*777777777*DOE*JOHN*0\\")
            .unwrap_err();
        assert_eq!(err.rule, Rule::TransactionCode);
    }

    #[test]
    fn test_enrollment_rejects_bad_payee_indicator() {
        assert!(Enrollment::parse("22*12200004*3*123987654321*777777777*DOE*JOHN*2\\").is_err());
    }
}
