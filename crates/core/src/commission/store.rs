//! Storage seam for the commission engine.
//!
//! The engine only reads through [`CommissionStore`] and only writes by
//! handing it a [`WriteBatch`], which implementations must apply atomically:
//! either every operation in the batch takes effect or none does.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::ledger::{TransactionKind, TransactionStatus, WalletType};
use crate::plot::PlotStatus;
use crate::types::{Amount, DbId, Timestamp};

use super::types::{CommissionTier, PlotRef};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write collided with an existing active row (concurrent distribution).
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// A write referenced a row that does not exist.
    #[error("Record not found: {0}")]
    Missing(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => CoreError::Conflict(msg),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// The part of a profile the engine needs to walk the upline chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRef {
    pub id: DbId,
    pub full_name: String,
    pub role: String,
    pub upline_id: Option<DbId>,
}

/// The part of a plot the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSnapshot {
    pub id: DbId,
    pub project_name: String,
    pub plot_number: String,
    pub area_gaj: f64,
    pub status: PlotStatus,
    pub broker_id: Option<DbId>,
    pub updated_by: Option<DbId>,
}

impl PlotSnapshot {
    pub fn plot_ref(&self) -> PlotRef {
        PlotRef {
            id: self.id,
            project_name: self.project_name.clone(),
            plot_number: self.plot_number.clone(),
        }
    }

    /// Broker credited for the sale: the assigned broker, else the last updater.
    pub fn responsible_broker(&self) -> Option<DbId> {
        self.broker_id.or(self.updated_by)
    }
}

/// A stored upline commission row.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionEntry {
    pub id: DbId,
    pub plot_id: DbId,
    pub seller_id: DbId,
    pub seller_name: String,
    pub receiver_id: DbId,
    pub receiver_name: String,
    pub level: i16,
    pub amount: Amount,
    pub sale_area: f64,
    pub is_reversed: bool,
    pub reversed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A stored ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: DbId,
    pub wallet_id: DbId,
    pub wallet_type: WalletType,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub description: String,
    pub status: TransactionStatus,
    pub plot_id: Option<DbId>,
    pub project_name: Option<String>,
    pub level: Option<i16>,
    pub created_at: Timestamp,
}

impl LedgerEntry {
    /// Commission tier of a plot-linked credit.
    ///
    /// Every credit written by the engine carries a level, so a missing or
    /// unknown one means the row was written elsewhere and its tier cannot be
    /// recovered safely.
    pub fn tier(&self) -> Result<CommissionTier, CoreError> {
        self.level
            .and_then(CommissionTier::from_level)
            .ok_or_else(|| {
                CoreError::Conflict(format!(
                    "Ledger entry {} has no valid commission level ({:?})",
                    self.id, self.level
                ))
            })
    }
}

/// Counts reported by [`CommissionStore::reset_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResetCounts {
    pub commissions_deleted: u64,
    pub transactions_deleted: u64,
    pub wallets_reset: u64,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// A ledger entry to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
    pub wallet_id: DbId,
    pub wallet_type: WalletType,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub description: String,
    pub status: TransactionStatus,
    pub plot_id: Option<DbId>,
    pub project_name: Option<String>,
    pub level: Option<i16>,
    pub created_at: Timestamp,
}

/// A commission row to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCommission {
    pub plot_id: DbId,
    pub seller_id: DbId,
    pub seller_name: String,
    pub receiver_id: DbId,
    pub receiver_name: String,
    pub level: i16,
    pub amount: Amount,
    pub sale_area: f64,
    pub created_at: Timestamp,
}

/// One write in a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Add to a wallet component, creating the wallet if needed.
    CreditWallet {
        owner_id: DbId,
        wallet_type: WalletType,
        amount: Amount,
    },
    /// Remove from a wallet component, flooring it at zero.
    DebitWallet {
        owner_id: DbId,
        wallet_type: WalletType,
        amount: Amount,
    },
    InsertLedger(NewLedgerEntry),
    /// Rewrite an entry's amount and text; `created_at` only when `Some`.
    UpdateLedger {
        id: DbId,
        amount: Amount,
        description: String,
        created_at: Option<Timestamp>,
    },
    ReverseLedger { id: DbId },
    /// Reverse every remaining active entry of a plot.
    ReverseLedgerForPlot { plot_id: DbId },
    InsertCommission(NewCommission),
    /// Rewrite a commission row in place; `created_at` only when `Some`.
    UpdateCommission {
        id: DbId,
        amount: Amount,
        sale_area: f64,
        seller_name: String,
        receiver_name: String,
        created_at: Option<Timestamp>,
    },
    ReverseCommission { id: DbId, reversed_at: Timestamp },
}

/// Ordered writes applied as a single unit of work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn append(&mut self, other: WriteBatch) {
        self.ops.extend(other.ops);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Data access used by [`CommissionEngine`](super::CommissionEngine).
///
/// "Active" means not reversed: `is_reversed = false` for commissions and
/// `status <> 'reversed'` for ledger entries.
#[async_trait]
pub trait CommissionStore: Send + Sync {
    async fn find_profile(&self, id: DbId) -> Result<Option<ProfileRef>, StoreError>;

    /// Find a non-deleted plot.
    async fn find_plot(&self, id: DbId) -> Result<Option<PlotSnapshot>, StoreError>;

    /// All non-deleted sold plots, ordered by id.
    async fn list_sold_plots(&self) -> Result<Vec<PlotSnapshot>, StoreError>;

    async fn find_active_commission(
        &self,
        plot_id: DbId,
        receiver_id: DbId,
        level: i16,
    ) -> Result<Option<CommissionEntry>, StoreError>;

    async fn list_active_commissions(&self, plot_id: DbId)
        -> Result<Vec<CommissionEntry>, StoreError>;

    async fn find_active_ledger_entry(
        &self,
        plot_id: DbId,
        wallet_id: DbId,
        level: i16,
    ) -> Result<Option<LedgerEntry>, StoreError>;

    async fn list_active_ledger_entries(&self, plot_id: DbId)
        -> Result<Vec<LedgerEntry>, StoreError>;

    /// Apply every write in `batch` atomically.
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Delete every commission row and ledger entry and zero every wallet,
    /// atomically.
    async fn reset_all(&self) -> Result<ResetCounts, StoreError>;
}

#[async_trait]
impl<T: CommissionStore + ?Sized> CommissionStore for Arc<T> {
    async fn find_profile(&self, id: DbId) -> Result<Option<ProfileRef>, StoreError> {
        (**self).find_profile(id).await
    }

    async fn find_plot(&self, id: DbId) -> Result<Option<PlotSnapshot>, StoreError> {
        (**self).find_plot(id).await
    }

    async fn list_sold_plots(&self) -> Result<Vec<PlotSnapshot>, StoreError> {
        (**self).list_sold_plots().await
    }

    async fn find_active_commission(
        &self,
        plot_id: DbId,
        receiver_id: DbId,
        level: i16,
    ) -> Result<Option<CommissionEntry>, StoreError> {
        (**self).find_active_commission(plot_id, receiver_id, level).await
    }

    async fn list_active_commissions(
        &self,
        plot_id: DbId,
    ) -> Result<Vec<CommissionEntry>, StoreError> {
        (**self).list_active_commissions(plot_id).await
    }

    async fn find_active_ledger_entry(
        &self,
        plot_id: DbId,
        wallet_id: DbId,
        level: i16,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        (**self).find_active_ledger_entry(plot_id, wallet_id, level).await
    }

    async fn list_active_ledger_entries(
        &self,
        plot_id: DbId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        (**self).list_active_ledger_entries(plot_id).await
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).apply(batch).await
    }

    async fn reset_all(&self) -> Result<ResetCounts, StoreError> {
        (**self).reset_all().await
    }
}
