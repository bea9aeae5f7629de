//! National identity number (TC Kimlik No) checks.
//!
//! An identity number is 11 decimal digits. The 10th and 11th digits are
//! check digits derived from the first nine:
//!
//! - `d10 = (7 * (d1 + d3 + d5 + d7 + d9) - (d2 + d4 + d6 + d8)) % 10`
//! - `d11 = (d1 + ... + d10) % 10`
//!
//! The first digit is never zero and a number made of one repeated digit is
//! rejected even when it happens to satisfy both equations.

use crate::utils::error::{ClientError, Result};
use std::fmt;
use std::str::FromStr;

pub const IDENTITY_NUMBER_LEN: usize = 11;

/// Returns true when `candidate` is a well-formed identity number.
///
/// Never fails: malformed input of any shape is simply rejected.
pub fn validate(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() != IDENTITY_NUMBER_LEN || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let d: Vec<i32> = bytes.iter().map(|b| i32::from(b - b'0')).collect();

    if d.iter().all(|&digit| digit == d[0]) {
        return false;
    }

    if d[0] == 0 {
        return false;
    }

    let odd_sum = d[0] + d[2] + d[4] + d[6] + d[8];
    let even_sum = d[1] + d[3] + d[5] + d[7];

    // `%` truncates toward zero, so a negative difference leaves a negative
    // remainder that can never match a digit.
    let check10 = (odd_sum * 7 - even_sum) % 10;
    if check10 != d[9] {
        return false;
    }

    let check11 = d[..10].iter().sum::<i32>() % 10;
    check11 == d[10]
}

/// Computes the two check digits for the given leading nine digits.
///
/// Returns `None` when the first check equation has a negative remainder,
/// in which case no valid number starts with these digits.
pub fn check_digits(first_nine: &[u8; 9]) -> Option<(u8, u8)> {
    let d: Vec<i32> = first_nine.iter().map(|&digit| i32::from(digit)).collect();
    let odd_sum = d[0] + d[2] + d[4] + d[6] + d[8];
    let even_sum = d[1] + d[3] + d[5] + d[7];

    let check10 = (odd_sum * 7 - even_sum) % 10;
    if check10 < 0 {
        return None;
    }
    let check11 = (d.iter().sum::<i32>() + check10) % 10;

    Some((check10 as u8, check11 as u8))
}

/// Strips everything but ASCII digits and keeps at most 11 of them.
pub fn sanitize_identity_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(IDENTITY_NUMBER_LEN)
        .collect()
}

/// A validated identity number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityNumber([u8; IDENTITY_NUMBER_LEN]);

impl IdentityNumber {
    pub fn parse(candidate: &str) -> Result<Self> {
        if !validate(candidate) {
            return Err(ClientError::ValidationError {
                message: format!("'{}' is not a valid identity number", candidate),
            });
        }

        let mut digits = [0u8; IDENTITY_NUMBER_LEN];
        for (slot, b) in digits.iter_mut().zip(candidate.bytes()) {
            *slot = b - b'0';
        }
        Ok(Self(digits))
    }

    /// Builds the full number from nine leading digits, if one exists.
    pub fn complete(first_nine: &str) -> Result<Self> {
        let invalid = || ClientError::ValidationError {
            message: format!("'{}' must be nine digits not starting with 0", first_nine),
        };

        let bytes = first_nine.as_bytes();
        if bytes.len() != 9 || !bytes.iter().all(u8::is_ascii_digit) || bytes[0] == b'0' {
            return Err(invalid());
        }

        let mut prefix = [0u8; 9];
        for (slot, b) in prefix.iter_mut().zip(bytes) {
            *slot = b - b'0';
        }

        let (check10, check11) = check_digits(&prefix).ok_or_else(|| ClientError::ValidationError {
            message: format!("no valid identity number starts with '{}'", first_nine),
        })?;

        Self::parse(&format!("{}{}{}", first_nine, check10, check11))
    }

    pub fn digits(&self) -> &[u8; IDENTITY_NUMBER_LEN] {
        &self.0
    }
}

impl fmt::Display for IdentityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in self.0 {
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

impl FromStr for IdentityNumber {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
