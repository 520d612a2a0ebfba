//! Installment payment rules and receipt numbering.

use crate::error::CoreError;
use crate::money::validate_positive_amount;
use crate::types::{Amount, DbId};

pub const METHOD_CASH: &str = "cash";
pub const METHOD_CHEQUE: &str = "cheque";
pub const METHOD_BANK_TRANSFER: &str = "bank_transfer";
pub const METHOD_UPI: &str = "upi";

/// All accepted payment methods.
pub const VALID_METHODS: &[&str] = &[METHOD_CASH, METHOD_CHEQUE, METHOD_BANK_TRANSFER, METHOD_UPI];

/// Methods that must carry a bank / UPI reference.
const METHODS_REQUIRING_REFERENCE: &[&str] = &[METHOD_CHEQUE, METHOD_BANK_TRANSFER, METHOD_UPI];

/// Validate an incoming installment payment.
pub fn validate_payment(
    amount: Amount,
    method: &str,
    reference: Option<&str>,
) -> Result<(), CoreError> {
    validate_positive_amount(amount, "amount")?;

    if !VALID_METHODS.contains(&method) {
        return Err(CoreError::Validation(format!(
            "Invalid payment method '{method}'. Must be one of: {}",
            VALID_METHODS.join(", ")
        )));
    }

    let has_reference = reference.is_some_and(|r| !r.trim().is_empty());
    if METHODS_REQUIRING_REFERENCE.contains(&method) && !has_reference {
        return Err(CoreError::Validation(format!(
            "Payment method '{method}' requires a reference"
        )));
    }
    Ok(())
}

/// Receipt number for the `sequence`-th payment on a plot, e.g. `RCPT-42-0003`.
pub fn receipt_number(plot_id: DbId, sequence: i64) -> String {
    format!("RCPT-{plot_id}-{sequence:04}")
}
