//! Conversion between unscaled on-chain integers and decimal display strings.
//!
//! Everything here is pure digit-string arithmetic over the `U256` decimal
//! representation, so no floating point is involved and exponential notation
//! cannot appear regardless of magnitude.

use alloy_primitives::U256;

use crate::error::{Error, Result};

/// Format `raw / 10^decimals` as a plain decimal string.
///
/// Trailing fraction zeros are trimmed and integral values render without a
/// decimal point. Zero always formats as `"0"`.
pub fn format_units(raw: U256, decimals: u8) -> String {
    if raw.is_zero() {
        return "0".to_string();
    }

    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        // Magnitude below 1: left-pad the fraction with zeros.
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac}")
    }
}

/// Parse a user-entered decimal amount into an unscaled integer.
///
/// Accepts plain digit strings with at most one decimal point and at most
/// `decimals` fraction digits. Anything else fails with
/// [`Error::InvalidNumericFormat`]; nothing is silently coerced to zero.
pub fn parse_units(text: &str, decimals: u8) -> Result<U256> {
    let trimmed = text.trim();
    let invalid = || Error::InvalidNumericFormat(text.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    // A second '.' ends up in frac_part and fails the digit check.
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    if frac_part.len() > decimals as usize {
        return Err(invalid());
    }

    let mut scaled = String::with_capacity(int_part.len() + decimals as usize);
    scaled.push_str(int_part);
    scaled.push_str(frac_part);
    scaled.extend(std::iter::repeat('0').take(decimals as usize - frac_part.len()));

    let significant = scaled.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(significant, 10).map_err(|_| invalid())
}
