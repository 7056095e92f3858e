// Iranian national code and mobile number checks
use regex::Regex;

#[allow(clippy::unwrap_used)]
mod patterns {
    use super::Regex;
    use lazy_static::lazy_static;

    lazy_static! {
        pub static ref NATIONAL_CODE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
        pub static ref MOBILE: Regex = Regex::new(r"^09[0-9]{9}$").unwrap();
    }
}

use patterns::{MOBILE, NATIONAL_CODE};

/// Map Persian (U+06F0..) and Arabic-Indic (U+0660..) digits to ASCII and
/// drop spaces and dashes
pub fn normalize_digits(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => shift_digit(c, 0x06F0),
            '\u{0660}'..='\u{0669}' => shift_digit(c, 0x0660),
            other => other,
        })
        .collect()
}

fn shift_digit(c: char, zero: u32) -> char {
    char::from_digit(u32::from(c) - zero, 10).unwrap_or(c)
}

/// Checksum test for a 10-digit national code
///
/// The last digit is the check digit. With `r` the weighted sum of the
/// first nine digits (weights 10 down to 2) modulo 11, the check digit is
/// `r` when `r < 2` and `11 - r` otherwise. Codes made of one repeated
/// digit are rejected.
pub fn is_valid_national_code(code: &str) -> bool {
    if !NATIONAL_CODE.is_match(code) {
        return false;
    }
    let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();
    let (body, check) = match digits.split_last() {
        Some((check, body)) => (body, *check),
        None => return false,
    };
    if body.iter().all(|d| *d == check) {
        return false;
    }

    let sum: u32 = body
        .iter()
        .zip((2..=10).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let r = sum % 11;
    if r < 2 {
        check == r
    } else {
        check == 11 - r
    }
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE.is_match(mobile)
}
