//! Exact conversion between human-readable amounts and token base units.
//!
//! Contribution amounts arrive as decimal strings ("150.5") and must be
//! scaled by the token's declared decimals using integer arithmetic only.
//! Fractional digits beyond the token's precision are rejected, never
//! truncated, and a zero amount is rejected before any network traffic.

use ethers::types::U256;
use thiserror::Error;

/// Reasons an amount string cannot be scaled to base units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Amount scales to zero base units
    #[error("amount must be greater than zero")]
    Zero,

    /// Amount is not a plain decimal number
    #[error("malformed decimal amount: {0:?}")]
    Malformed(String),

    /// Amount carries more fractional digits than the token supports
    #[error("{digits} fractional digits exceed the token's {decimals} decimals")]
    TooPrecise {
        /// Fractional digits in the input
        digits: usize,
        /// Decimals the token declares
        decimals: u8,
    },

    /// Scaled amount does not fit in 256 bits
    #[error("amount overflows 256 bits")]
    Overflow,
}

/// Split an amount string into whole and fractional digit runs.
///
/// Accepts plain unsigned decimals ("150", "150.5", ".5", "5."). Signs,
/// exponents, separators and anything else non-digit are rejected.
fn split_decimal(amount: &str) -> Result<(&str, &str), AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Malformed(amount.to_string()));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => {
            // A second dot means the fraction is not all digits
            (whole, fraction)
        }
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Malformed(amount.to_string()));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::Malformed(amount.to_string()));
    }

    Ok((whole, fraction))
}

/// Check an amount's shape and non-zero-ness without knowing the token's
/// decimals.
///
/// This is the orchestrator's pre-flight check: malformed and zero inputs
/// fail here, before any network traffic. Precision against the token's
/// decimals is still enforced by [`to_base_units`].
pub fn validate_format(amount: &str) -> Result<(), AmountError> {
    let (whole, fraction) = split_decimal(amount)?;
    if whole.bytes().chain(fraction.bytes()).all(|b| b == b'0') {
        return Err(AmountError::Zero);
    }
    Ok(())
}

/// Scale a human-readable decimal string to token base units.
///
/// Input rules are those of [`split_decimal`]; additionally the fraction may
/// not exceed the token's declared decimals and the result may not be zero.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let (whole, fraction) = split_decimal(amount)?;

    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            digits: fraction.len(),
            decimals,
        });
    }

    let scale = U256::from(10)
        .checked_pow(U256::from(decimals))
        .ok_or(AmountError::Overflow)?;

    let whole_units = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| AmountError::Overflow)?
    };

    let fraction_units = if fraction.is_empty() {
        U256::zero()
    } else {
        // Pad to the token's precision: "5" with 6 decimals is 500000
        let padding = U256::from(10)
            .checked_pow(U256::from(decimals as usize - fraction.len()))
            .ok_or(AmountError::Overflow)?;
        U256::from_dec_str(fraction)
            .map_err(|_| AmountError::Overflow)?
            .checked_mul(padding)
            .ok_or(AmountError::Overflow)?
    };

    let base_units = whole_units
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(fraction_units))
        .ok_or(AmountError::Overflow)?;

    if base_units.is_zero() {
        return Err(AmountError::Zero);
    }

    Ok(base_units)
}

/// Render base units back as a human-readable decimal string.
///
/// Trailing fractional zeros are trimmed; whole amounts render without a
/// decimal point.
pub fn from_base_units(value: U256, decimals: u8) -> String {
    let (whole, fraction) = match U256::from(10).checked_pow(U256::from(decimals)) {
        // Decimals beyond 77 put any U256 entirely below the point
        None => (U256::zero(), value),
        Some(scale) => (value / scale, value % scale),
    };

    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let trimmed = digits.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("150", 6, "150000000" ; "whole amount")]
    #[test_case("150.5", 6, "150500000" ; "fractional amount")]
    #[test_case("0.000001", 6, "1" ; "smallest unit")]
    #[test_case(".5", 6, "500000" ; "leading dot")]
    #[test_case("5.", 6, "5000000" ; "trailing dot")]
    #[test_case(" 42 ", 6, "42000000" ; "surrounding whitespace")]
    #[test_case("1.234567", 6, "1234567" ; "full precision")]
    #[test_case("7", 0, "7" ; "zero decimal token")]
    #[test_case("150.5", 18, "150500000000000000000" ; "eighteen decimals")]
    fn test_to_base_units(amount: &str, decimals: u8, expected: &str) {
        let result = to_base_units(amount, decimals).unwrap();
        assert_eq!(result, U256::from_dec_str(expected).unwrap());
    }

    #[test_case("0" ; "plain zero")]
    #[test_case("0.0" ; "fractional zero")]
    #[test_case("00.000" ; "padded zero")]
    fn test_zero_amounts_rejected(amount: &str) {
        assert_eq!(to_base_units(amount, 6), Err(AmountError::Zero));
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "whitespace only")]
    #[test_case("." ; "lone dot")]
    #[test_case("abc" ; "letters")]
    #[test_case("1.2.3" ; "double dot")]
    #[test_case("1,5" ; "comma separator")]
    #[test_case("-5" ; "negative")]
    #[test_case("+5" ; "explicit positive")]
    #[test_case("1e6" ; "exponent")]
    #[test_case("1 000" ; "inner space")]
    fn test_malformed_amounts_rejected(amount: &str) {
        assert!(matches!(
            to_base_units(amount, 6),
            Err(AmountError::Malformed(_))
        ));
    }

    #[test]
    fn test_excess_precision_rejected_not_truncated() {
        let result = to_base_units("0.1234567", 6);
        assert_eq!(
            result,
            Err(AmountError::TooPrecise {
                digits: 7,
                decimals: 6,
            })
        );

        // Zero-decimal tokens accept no fraction at all
        let result = to_base_units("5.1", 0);
        assert_eq!(
            result,
            Err(AmountError::TooPrecise {
                digits: 1,
                decimals: 0,
            })
        );
    }

    #[test]
    fn test_max_value_fits() {
        // U256::MAX expressed with 18 decimals
        let text = "115792089237316195423570985008687907853269984665640564039457.584007913129639935";
        assert_eq!(to_base_units(text, 18).unwrap(), U256::MAX);
    }

    #[test]
    fn test_overflow_rejected() {
        let result = to_base_units("115792089237316195423570985008687907853269984665640564039458", 18);
        assert_eq!(result, Err(AmountError::Overflow));
    }

    #[test_case("150000000", 6, "150" ; "whole amount")]
    #[test_case("150500000", 6, "150.5" ; "fractional amount")]
    #[test_case("1", 6, "0.000001" ; "smallest unit")]
    #[test_case("0", 6, "0" ; "zero")]
    fn test_from_base_units(value: &str, decimals: u8, expected: &str) {
        let value = U256::from_dec_str(value).unwrap();
        assert_eq!(from_base_units(value, decimals), expected);
    }

    #[test_case("150.5", 6 ; "fractional")]
    #[test_case("42", 0 ; "no decimals")]
    #[test_case("0.000001", 6 ; "smallest unit")]
    fn test_round_trip_preserves_value(amount: &str, decimals: u8) {
        let scaled = to_base_units(amount, decimals).unwrap();
        assert_eq!(from_base_units(scaled, decimals), amount);
    }

    #[test]
    fn test_validate_format_accepts_without_decimals() {
        // Precision is not checked here; that needs the token's decimals
        assert!(validate_format("150.123456789").is_ok());
        assert!(validate_format(".5").is_ok());
    }

    #[test]
    fn test_validate_format_rejects_zero_and_malformed() {
        assert_eq!(validate_format("0.000"), Err(AmountError::Zero));
        assert!(matches!(
            validate_format("12x"),
            Err(AmountError::Malformed(_))
        ));
    }
}
