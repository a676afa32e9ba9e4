//! Shared validation rules

use crate::{Error, Result};

/// Minimum digits after the `+` prefix
const PHONE_MIN_DIGITS: usize = 7;

/// Maximum digits after the `+` prefix
const PHONE_MAX_DIGITS: usize = 15;

/// Validate an international phone number.
///
/// The number must start with `+`, be digits-only after that, not start
/// with `0` after the country prefix, and have a plausible length.
pub fn validate_phone_number(phone: &str) -> Result<()> {
    let digits = phone
        .strip_prefix('+')
        .ok_or_else(|| Error::Validation("phone must start with +".to_string()))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(
            "phone must contain only digits after +".to_string(),
        ));
    }

    if digits.starts_with('0') {
        return Err(Error::Validation(
            "phone number must be in international format (should not start with 0 after +)"
                .to_string(),
        ));
    }

    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len()) {
        return Err(Error::Validation(format!(
            "phone must have between {} and {} digits",
            PHONE_MIN_DIGITS, PHONE_MAX_DIGITS
        )));
    }

    Ok(())
}
