//! Wallet and ledger vocabulary shared by the commission engine, the
//! repositories and the API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::{floor_debit, round_paise};
use crate::types::Amount;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which wallet component a ledger entry affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    /// Commission from the profile's own sales.
    Direct,
    /// Commission from sales made by the profile's downline.
    Downline,
}

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
    Withdrawal,
}

/// Lifecycle of a ledger entry. Reversed entries are void but kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Reversed,
}

macro_rules! str_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            /// Database / wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $s,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        concat!("Unknown ", $label, " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

str_enum!(WalletType, "wallet type", {
    Direct => "direct",
    Downline => "downline",
});

str_enum!(TransactionKind, "transaction kind", {
    Credit => "credit",
    Debit => "debit",
    Withdrawal => "withdrawal",
});

str_enum!(TransactionStatus, "transaction status", {
    Pending => "pending",
    Completed => "completed",
    Reversed => "reversed",
});

// ---------------------------------------------------------------------------
// Wallet balance arithmetic
// ---------------------------------------------------------------------------

/// Cached wallet balances.
///
/// `total` is always `direct + downline`; no component goes below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub direct: Amount,
    pub downline: Amount,
    pub total: Amount,
}

impl WalletBalance {
    /// Balance of a single component.
    pub fn component(&self, wallet_type: WalletType) -> Amount {
        match wallet_type {
            WalletType::Direct => self.direct,
            WalletType::Downline => self.downline,
        }
    }

    /// Add `amount` to a component.
    pub fn credit(&mut self, wallet_type: WalletType, amount: Amount) {
        match wallet_type {
            WalletType::Direct => self.direct = round_paise(self.direct + amount),
            WalletType::Downline => self.downline = round_paise(self.downline + amount),
        }
        self.recompute_total();
    }

    /// Remove `amount` from a component, flooring it at zero.
    pub fn debit(&mut self, wallet_type: WalletType, amount: Amount) {
        match wallet_type {
            WalletType::Direct => self.direct = floor_debit(self.direct, amount),
            WalletType::Downline => self.downline = floor_debit(self.downline, amount),
        }
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total = round_paise(self.direct + self.downline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_and_debit_keep_total_in_sync() {
        let mut wallet = WalletBalance::default();
        wallet.credit(WalletType::Direct, 300_000.0);
        wallet.credit(WalletType::Downline, 60_000.0);
        assert_eq!(wallet.total, 360_000.0);

        wallet.debit(WalletType::Downline, 10_000.0);
        assert_eq!(wallet.downline, 50_000.0);
        assert_eq!(wallet.total, 350_000.0);
    }

    #[test]
    fn debit_floors_each_component_at_zero() {
        let mut wallet = WalletBalance::default();
        wallet.credit(WalletType::Direct, 100.0);
        wallet.credit(WalletType::Downline, 500.0);

        wallet.debit(WalletType::Direct, 1_000.0);
        assert_eq!(wallet.direct, 0.0);
        assert_eq!(wallet.downline, 500.0);
        assert_eq!(wallet.total, 500.0);
    }

    #[test]
    fn enums_parse_their_wire_names() {
        assert_eq!("downline".parse::<WalletType>().unwrap(), WalletType::Downline);
        assert_eq!(
            "withdrawal".parse::<TransactionKind>().unwrap(),
            TransactionKind::Withdrawal
        );
        assert_eq!(
            "reversed".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Reversed
        );
        assert!("refund".parse::<TransactionKind>().is_err());
    }
}
