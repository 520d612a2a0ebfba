//! Ledger entry (`transactions` table) models.

use plotledger_core::commission::LedgerEntry;
use plotledger_core::error::CoreError;
use plotledger_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub wallet_id: DbId,
    pub wallet_type: String,
    pub kind: String,
    pub amount: f64,
    pub description: String,
    pub status: String,
    pub plot_id: Option<DbId>,
    pub project_name: Option<String>,
    pub level: Option<i16>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<Transaction> for LedgerEntry {
    type Error = CoreError;

    fn try_from(t: Transaction) -> Result<Self, Self::Error> {
        Ok(LedgerEntry {
            id: t.id,
            wallet_id: t.wallet_id,
            wallet_type: t.wallet_type.parse()?,
            kind: t.kind.parse()?,
            amount: t.amount,
            description: t.description,
            status: t.status.parse()?,
            plot_id: t.plot_id,
            project_name: t.project_name,
            level: t.level,
            created_at: t.created_at,
        })
    }
}
