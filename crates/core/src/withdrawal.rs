//! Withdrawal request rules.

use crate::error::CoreError;
use crate::money::{round_paise, validate_positive_amount};
use crate::types::Amount;

pub const WITHDRAWAL_PENDING: &str = "pending";
pub const WITHDRAWAL_APPROVED: &str = "approved";
pub const WITHDRAWAL_REJECTED: &str = "rejected";

/// How an approved withdrawal is taken out of the two wallet components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalSplit {
    pub from_direct: Amount,
    pub from_downline: Amount,
}

/// Validate a withdrawal request against the requester's total balance.
pub fn validate_withdrawal(amount: Amount, total_balance: Amount) -> Result<(), CoreError> {
    validate_positive_amount(amount, "amount")?;
    if amount > total_balance {
        return Err(CoreError::Validation(format!(
            "Withdrawal of {amount} exceeds available balance {total_balance}"
        )));
    }
    Ok(())
}

/// Ensure a request is still pending before it is decided.
pub fn ensure_pending(status: &str) -> Result<(), CoreError> {
    if status != WITHDRAWAL_PENDING {
        return Err(CoreError::Conflict(format!(
            "Withdrawal request is already {status}"
        )));
    }
    Ok(())
}

/// Split a withdrawal across wallet components, draining the direct balance
/// first and taking the remainder from the downline balance.
///
/// The caller must have validated `amount <= direct + downline`.
pub fn split_withdrawal(amount: Amount, direct: Amount, downline: Amount) -> WithdrawalSplit {
    let from_direct = round_paise(amount.min(direct.max(0.0)));
    let from_downline = round_paise((amount - from_direct).min(downline.max(0.0)));
    WithdrawalSplit {
        from_direct,
        from_downline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_within_balance_is_valid() {
        assert!(validate_withdrawal(5_000.0, 5_000.0).is_ok());
        assert!(validate_withdrawal(5_000.01, 5_000.0).is_err());
        assert!(validate_withdrawal(0.0, 5_000.0).is_err());
    }

    #[test]
    fn only_pending_requests_can_be_decided() {
        assert!(ensure_pending(WITHDRAWAL_PENDING).is_ok());
        assert!(ensure_pending(WITHDRAWAL_APPROVED).is_err());
        assert!(ensure_pending(WITHDRAWAL_REJECTED).is_err());
    }

    #[test]
    fn split_drains_direct_first() {
        let split = split_withdrawal(70_000.0, 50_000.0, 40_000.0);
        assert_eq!(split.from_direct, 50_000.0);
        assert_eq!(split.from_downline, 20_000.0);
    }

    #[test]
    fn split_within_direct_leaves_downline_untouched() {
        let split = split_withdrawal(10_000.0, 50_000.0, 40_000.0);
        assert_eq!(split.from_direct, 10_000.0);
        assert_eq!(split.from_downline, 0.0);
    }
}
