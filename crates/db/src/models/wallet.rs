//! Wallet models.

use plotledger_core::ledger::{WalletBalance, WalletType};
use plotledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `wallets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wallet {
    pub id: DbId,
    pub owner_id: DbId,
    pub direct_balance: f64,
    pub downline_balance: f64,
    pub total_balance: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Wallet {
    pub fn balance(&self) -> WalletBalance {
        WalletBalance {
            direct: self.direct_balance,
            downline: self.downline_balance,
            total: self.total_balance,
        }
    }
}

/// Wallet as reported to clients; zero for profiles never credited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSummary {
    pub owner_id: DbId,
    pub direct_balance: f64,
    pub downline_balance: f64,
    pub total_balance: f64,
}

impl WalletSummary {
    pub fn new(owner_id: DbId, balance: WalletBalance) -> Self {
        Self {
            owner_id,
            direct_balance: balance.direct,
            downline_balance: balance.downline,
            total_balance: balance.total,
        }
    }
}

/// Direction of a manual adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Credit,
    Debit,
}

/// Request body for `POST /wallets/{owner_id}/adjust`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WalletAdjustment {
    pub direction: AdjustmentDirection,
    pub wallet_type: WalletType,
    pub amount: f64,
    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: String,
    /// Admin performing the adjustment, for the audit log.
    pub actor_id: Option<DbId>,
}
