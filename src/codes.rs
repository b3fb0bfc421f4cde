//! Enumerated NACHA codes: transaction codes, service class codes,
//! Standard Entry Class codes, and entry categories.

use crate::error::FileError;
use std::fmt;
use std::str::FromStr;

// Checking
pub const CHECKING_RETURN_NOC_CREDIT: u8 = 21;
pub const CHECKING_CREDIT: u8 = 22;
pub const CHECKING_PRENOTE_CREDIT: u8 = 23;
pub const CHECKING_ZERO_DOLLAR_CREDIT: u8 = 24;
pub const CHECKING_RETURN_NOC_DEBIT: u8 = 26;
pub const CHECKING_DEBIT: u8 = 27;
pub const CHECKING_PRENOTE_DEBIT: u8 = 28;
pub const CHECKING_ZERO_DOLLAR_DEBIT: u8 = 29;

// Savings
pub const SAVINGS_RETURN_NOC_CREDIT: u8 = 31;
pub const SAVINGS_CREDIT: u8 = 32;
pub const SAVINGS_PRENOTE_CREDIT: u8 = 33;
pub const SAVINGS_ZERO_DOLLAR_CREDIT: u8 = 34;
pub const SAVINGS_RETURN_NOC_DEBIT: u8 = 36;
pub const SAVINGS_DEBIT: u8 = 37;
pub const SAVINGS_PRENOTE_DEBIT: u8 = 38;
pub const SAVINGS_ZERO_DOLLAR_DEBIT: u8 = 39;

// General ledger
pub const GL_RETURN_NOC_CREDIT: u8 = 41;
pub const GL_CREDIT: u8 = 42;
pub const GL_PRENOTE_CREDIT: u8 = 43;
pub const GL_ZERO_DOLLAR_CREDIT: u8 = 44;
pub const GL_RETURN_NOC_DEBIT: u8 = 46;
pub const GL_DEBIT: u8 = 47;
pub const GL_PRENOTE_DEBIT: u8 = 48;
pub const GL_ZERO_DOLLAR_DEBIT: u8 = 49;

// Loan
pub const LOAN_RETURN_NOC_CREDIT: u8 = 51;
pub const LOAN_CREDIT: u8 = 52;
pub const LOAN_PRENOTE_CREDIT: u8 = 53;
pub const LOAN_ZERO_DOLLAR_CREDIT: u8 = 54;
pub const LOAN_DEBIT: u8 = 55;
pub const LOAN_RETURN_NOC_DEBIT: u8 = 56;

// Automated accounting advices
pub const CREDIT_FOR_DEBITS_ORIGINATED: u8 = 81;
pub const DEBIT_FOR_CREDITS_ORIGINATED: u8 = 82;
pub const CREDIT_FOR_DEBITS_RECEIVED: u8 = 83;
pub const DEBIT_FOR_CREDITS_RECEIVED: u8 = 84;
pub const CREDIT_FOR_CREDITS_REJECTED: u8 = 85;
pub const DEBIT_FOR_DEBITS_REJECTED: u8 = 86;
pub const CREDIT_SUMMARY: u8 = 87;
pub const DEBIT_SUMMARY: u8 = 88;

/// Transaction codes that add to a batch's total credit amount.
pub const CREDIT_CODES: [u8; 16] = [
    21, 22, 23, 24, 31, 32, 33, 34, 41, 42, 43, 44, 51, 52, 53, 54,
];

/// Transaction codes that add to a batch's total debit amount.
pub const DEBIT_CODES: [u8; 14] = [26, 27, 28, 29, 36, 37, 38, 39, 46, 47, 48, 49, 55, 56];

/// Codes that carry returns and notifications of change.
pub const RETURN_NOC_CODES: [u8; 8] = [21, 26, 31, 36, 41, 46, 51, 56];

/// Live-dollar codes: neither prenote, zero dollar, nor return/NOC.
pub const LIVE_CODES: [u8; 8] = [22, 27, 32, 37, 42, 47, 52, 55];

pub const PRENOTE_CODES: [u8; 7] = [23, 28, 33, 38, 43, 48, 53];

pub const ZERO_DOLLAR_CODES: [u8; 7] = [24, 29, 34, 39, 44, 49, 54];

/// Whether the code adds to a total credit amount.
pub fn is_credit(code: u8) -> bool {
    CREDIT_CODES.contains(&code)
}

/// Whether the code adds to a total debit amount.
pub fn is_debit(code: u8) -> bool {
    DEBIT_CODES.contains(&code)
}

/// Any valid non-ADV transaction code.
pub fn is_transaction_code(code: u8) -> bool {
    is_credit(code) || is_debit(code)
}

pub fn is_prenote(code: u8) -> bool {
    PRENOTE_CODES.contains(&code)
}

pub fn is_return_noc(code: u8) -> bool {
    RETURN_NOC_CODES.contains(&code)
}

pub fn is_adv_transaction_code(code: u8) -> bool {
    (CREDIT_FOR_DEBITS_ORIGINATED..=DEBIT_SUMMARY).contains(&code)
}

/// ADV credits carry odd codes.
pub fn is_adv_credit(code: u8) -> bool {
    is_adv_transaction_code(code) && code % 2 == 1
}

/// ADV debits carry even codes.
pub fn is_adv_debit(code: u8) -> bool {
    is_adv_transaction_code(code) && code % 2 == 0
}

pub const MIXED_DEBITS_AND_CREDITS: u16 = 200;
pub const CREDITS_ONLY: u16 = 220;
pub const DEBITS_ONLY: u16 = 225;
pub const AUTOMATED_ACCOUNTING_ADVICES: u16 = 280;

pub fn is_service_class_code(code: u16) -> bool {
    matches!(
        code,
        MIXED_DEBITS_AND_CREDITS | CREDITS_ONLY | DEBITS_ONLY | AUTOMATED_ACCOUNTING_ADVICES
    )
}

/// Standard Entry Class code: selects the batch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecCode {
    /// Acknowledgment of a CCD entry.
    Ack,
    /// Automated accounting advice.
    Adv,
    /// Corporate credit or debit.
    Ccd,
    /// Notification of change.
    Cor,
    /// Death notification.
    Dne,
    /// Automated enrollment.
    Enr,
    /// International ACH transaction.
    Iat,
    /// Prearranged payment and deposit.
    Ppd,
    /// Telephone-initiated.
    Tel,
    /// Internet-initiated.
    Web,
}

impl SecCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecCode::Ack => "ACK",
            SecCode::Adv => "ADV",
            SecCode::Ccd => "CCD",
            SecCode::Cor => "COR",
            SecCode::Dne => "DNE",
            SecCode::Enr => "ENR",
            SecCode::Iat => "IAT",
            SecCode::Ppd => "PPD",
            SecCode::Tel => "TEL",
            SecCode::Web => "WEB",
        }
    }
}

impl FromStr for SecCode {
    type Err = FileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "ACK" => Ok(SecCode::Ack),
            "ADV" => Ok(SecCode::Adv),
            "CCD" => Ok(SecCode::Ccd),
            "COR" => Ok(SecCode::Cor),
            "DNE" => Ok(SecCode::Dne),
            "ENR" => Ok(SecCode::Enr),
            "IAT" => Ok(SecCode::Iat),
            "PPD" => Ok(SecCode::Ppd),
            "TEL" => Ok(SecCode::Tel),
            "WEB" => Ok(SecCode::Web),
            other => Err(FileError::UnsupportedSecCode(other.to_string())),
        }
    }
}

impl fmt::Display for SecCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry category, derived from the addenda an entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Forward,
    Return,
    NotificationOfChange,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Forward => "Forward",
            Category::Return => "Return",
            Category::NotificationOfChange => "NOC",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit_sets_are_disjoint() {
        for code in CREDIT_CODES {
            assert!(!is_debit(code), "{} is in both sets", code);
        }
    }

    #[test]
    fn test_codes_outside_both_sets() {
        for code in [0, 20, 25, 30, 35, 45, 50, 57, 81, 99] {
            assert!(!is_credit(code) && !is_debit(code), "{}", code);
        }
    }

    #[test]
    fn test_adv_direction() {
        assert!(is_adv_credit(CREDIT_SUMMARY));
        assert!(is_adv_debit(DEBIT_SUMMARY));
        assert!(!is_adv_credit(CHECKING_CREDIT));
    }

    #[test]
    fn test_sec_code_from_str_rejects_unknown() {
        assert_eq!("PPD".parse::<SecCode>().unwrap(), SecCode::Ppd);
        assert_eq!(SecCode::Enr.to_string(), "ENR");
        let err = "XYZ".parse::<SecCode>().unwrap_err();
        assert_eq!(err, FileError::UnsupportedSecCode("XYZ".to_string()));
    }

    #[test]
    fn test_service_class_codes() {
        assert!(is_service_class_code(200));
        assert!(is_service_class_code(280));
        assert!(!is_service_class_code(230));
    }
}
