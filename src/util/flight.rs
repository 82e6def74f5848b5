//! Flight number validation: two or three letters, then one to four digits.

#[cfg(test)]
#[path = "flight_test.rs"]
mod flight_test;

/// Case-insensitive; surrounding whitespace is ignored.
#[must_use]
pub fn is_valid_flight_number(raw: &str) -> bool {
    let code = raw.trim();
    let letters = code.bytes().take_while(u8::is_ascii_alphabetic).count();
    let digits = &code.as_bytes()[letters..];
    (2..=3).contains(&letters) && (1..=4).contains(&digits.len()) && digits.iter().all(u8::is_ascii_digit)
}

/// Canonical upper-case form, if valid.
#[must_use]
pub fn normalize_flight_number(raw: &str) -> Option<String> {
    is_valid_flight_number(raw).then(|| raw.trim().to_ascii_uppercase())
}
