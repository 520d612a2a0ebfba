//! Rupee amount helpers.
//!
//! Amounts are carried as `f64` rupees and normalised to two decimal places
//! (paise) every time one is computed, so repeated credits and debits do not
//! accumulate binary rounding noise.

use crate::error::CoreError;
use crate::types::Amount;

/// Round a rupee amount to the nearest paisa.
pub fn round_paise(value: Amount) -> Amount {
    (value * 100.0).round() / 100.0
}

/// Subtract `amount` from `balance`, never going below zero.
pub fn floor_debit(balance: Amount, amount: Amount) -> Amount {
    round_paise((balance - amount).max(0.0))
}

/// Validate that an amount is finite and strictly positive.
pub fn validate_positive_amount(value: Amount, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a positive amount, got {value}"
        )));
    }
    Ok(())
}

/// Validate that an amount is finite and not negative.
pub fn validate_non_negative_amount(value: Amount, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_paise(10.006), 10.01);
        assert_eq!(round_paise(0.1 + 0.2), 0.3);
        assert_eq!(round_paise(300_000.0), 300_000.0);
    }

    #[test]
    fn floor_debit_stops_at_zero() {
        assert_eq!(floor_debit(100.0, 40.0), 60.0);
        assert_eq!(floor_debit(100.0, 250.0), 0.0);
        assert_eq!(floor_debit(0.0, 1.0), 0.0);
    }

    #[test]
    fn positive_amount_rejects_zero_nan_and_negative() {
        assert!(validate_positive_amount(1.0, "amount").is_ok());
        assert!(validate_positive_amount(0.0, "amount").is_err());
        assert!(validate_positive_amount(-5.0, "amount").is_err());
        assert!(validate_positive_amount(f64::NAN, "amount").is_err());
        assert!(validate_positive_amount(f64::INFINITY, "amount").is_err());
    }

    #[test]
    fn non_negative_amount_accepts_zero() {
        assert!(validate_non_negative_amount(0.0, "booking_amount").is_ok());
        assert!(validate_non_negative_amount(-0.5, "booking_amount").is_err());
    }
}
