//! In-memory [`CommissionStore`] used by tests and local tooling.
//!
//! Batches are applied to a copy of the state which replaces the original
//! only when every operation succeeded, giving the same all-or-nothing
//! behaviour as the Postgres store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ledger::{TransactionStatus, WalletBalance};
use crate::plot::PlotStatus;
use crate::types::DbId;

use super::store::{
    CommissionEntry, CommissionStore, LedgerEntry, PlotSnapshot, ProfileRef, ResetCounts,
    StoreError, WriteBatch, WriteOp,
};

#[derive(Debug, Clone, Default)]
struct State {
    profiles: HashMap<DbId, ProfileRef>,
    plots: HashMap<DbId, PlotSnapshot>,
    wallets: HashMap<DbId, WalletBalance>,
    commissions: Vec<CommissionEntry>,
    ledger: Vec<LedgerEntry>,
    next_id: DbId,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn apply(&mut self, op: WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::CreditWallet {
                owner_id,
                wallet_type,
                amount,
            } => {
                self.wallets
                    .entry(owner_id)
                    .or_default()
                    .credit(wallet_type, amount);
            }
            WriteOp::DebitWallet {
                owner_id,
                wallet_type,
                amount,
            } => {
                self.wallets
                    .entry(owner_id)
                    .or_default()
                    .debit(wallet_type, amount);
            }
            WriteOp::InsertLedger(new) => {
                if let (Some(plot_id), Some(level)) = (new.plot_id, new.level) {
                    let clash = self.ledger.iter().any(|e| {
                        e.plot_id == Some(plot_id)
                            && e.wallet_id == new.wallet_id
                            && e.level == Some(level)
                            && e.status != TransactionStatus::Reversed
                    });
                    if clash {
                        return Err(StoreError::Duplicate(format!(
                            "active ledger entry for plot {plot_id}, wallet {}, level {level}",
                            new.wallet_id
                        )));
                    }
                }
                let id = self.next_id();
                self.ledger.push(LedgerEntry {
                    id,
                    wallet_id: new.wallet_id,
                    wallet_type: new.wallet_type,
                    kind: new.kind,
                    amount: new.amount,
                    description: new.description,
                    status: new.status,
                    plot_id: new.plot_id,
                    project_name: new.project_name,
                    level: new.level,
                    created_at: new.created_at,
                });
            }
            WriteOp::UpdateLedger {
                id,
                amount,
                description,
                created_at,
            } => {
                let entry = self
                    .ledger
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| StoreError::Missing(format!("ledger entry {id}")))?;
                entry.amount = amount;
                entry.description = description;
                if let Some(at) = created_at {
                    entry.created_at = at;
                }
            }
            WriteOp::ReverseLedger { id } => {
                let entry = self
                    .ledger
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| StoreError::Missing(format!("ledger entry {id}")))?;
                entry.status = TransactionStatus::Reversed;
            }
            WriteOp::ReverseLedgerForPlot { plot_id } => {
                for entry in self
                    .ledger
                    .iter_mut()
                    .filter(|e| e.plot_id == Some(plot_id))
                {
                    entry.status = TransactionStatus::Reversed;
                }
            }
            WriteOp::InsertCommission(new) => {
                let clash = self.commissions.iter().any(|c| {
                    c.plot_id == new.plot_id
                        && c.receiver_id == new.receiver_id
                        && c.level == new.level
                        && !c.is_reversed
                });
                if clash {
                    return Err(StoreError::Duplicate(format!(
                        "active commission for plot {}, receiver {}, level {}",
                        new.plot_id, new.receiver_id, new.level
                    )));
                }
                let id = self.next_id();
                self.commissions.push(CommissionEntry {
                    id,
                    plot_id: new.plot_id,
                    seller_id: new.seller_id,
                    seller_name: new.seller_name,
                    receiver_id: new.receiver_id,
                    receiver_name: new.receiver_name,
                    level: new.level,
                    amount: new.amount,
                    sale_area: new.sale_area,
                    is_reversed: false,
                    reversed_at: None,
                    created_at: new.created_at,
                });
            }
            WriteOp::UpdateCommission {
                id,
                amount,
                sale_area,
                seller_name,
                receiver_name,
                created_at,
            } => {
                let row = self
                    .commissions
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| StoreError::Missing(format!("commission {id}")))?;
                row.amount = amount;
                row.sale_area = sale_area;
                row.seller_name = seller_name;
                row.receiver_name = receiver_name;
                if let Some(at) = created_at {
                    row.created_at = at;
                }
            }
            WriteOp::ReverseCommission { id, reversed_at } => {
                let row = self
                    .commissions
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| StoreError::Missing(format!("commission {id}")))?;
                row.is_reversed = true;
                row.reversed_at = Some(reversed_at);
            }
        }
        Ok(())
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile.
    pub async fn add_profile(&self, id: DbId, full_name: &str, upline_id: Option<DbId>) {
        self.state.lock().await.profiles.insert(
            id,
            ProfileRef {
                id,
                full_name: full_name.to_string(),
                role: crate::roles::ROLE_BROKER.to_string(),
                upline_id,
            },
        );
    }

    /// Register or replace a plot.
    pub async fn add_plot(&self, plot: PlotSnapshot) {
        self.state.lock().await.plots.insert(plot.id, plot);
    }

    /// Change a plot's status, as the plots table would.
    pub async fn set_plot_status(&self, plot_id: DbId, status: PlotStatus) {
        if let Some(plot) = self.state.lock().await.plots.get_mut(&plot_id) {
            plot.status = status;
        }
    }

    /// Point a profile at a different upline.
    pub async fn set_upline(&self, profile_id: DbId, upline_id: Option<DbId>) {
        if let Some(profile) = self.state.lock().await.profiles.get_mut(&profile_id) {
            profile.upline_id = upline_id;
        }
    }

    /// Make every subsequent [`CommissionStore::apply`] fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current wallet of a profile (zero if never credited).
    pub async fn wallet(&self, owner_id: DbId) -> WalletBalance {
        self.state
            .lock()
            .await
            .wallets
            .get(&owner_id)
            .copied()
            .unwrap_or_default()
    }

    /// Every commission row, reversed ones included.
    pub async fn commissions(&self) -> Vec<CommissionEntry> {
        self.state.lock().await.commissions.clone()
    }

    /// Every ledger entry, reversed ones included.
    pub async fn ledger(&self) -> Vec<LedgerEntry> {
        self.state.lock().await.ledger.clone()
    }
}

#[async_trait]
impl CommissionStore for MemoryStore {
    async fn find_profile(&self, id: DbId) -> Result<Option<ProfileRef>, StoreError> {
        Ok(self.state.lock().await.profiles.get(&id).cloned())
    }

    async fn find_plot(&self, id: DbId) -> Result<Option<PlotSnapshot>, StoreError> {
        Ok(self.state.lock().await.plots.get(&id).cloned())
    }

    async fn list_sold_plots(&self) -> Result<Vec<PlotSnapshot>, StoreError> {
        let state = self.state.lock().await;
        let mut plots: Vec<PlotSnapshot> = state
            .plots
            .values()
            .filter(|p| p.status == PlotStatus::Sold)
            .cloned()
            .collect();
        plots.sort_by_key(|p| p.id);
        Ok(plots)
    }

    async fn find_active_commission(
        &self,
        plot_id: DbId,
        receiver_id: DbId,
        level: i16,
    ) -> Result<Option<CommissionEntry>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .commissions
            .iter()
            .find(|c| {
                c.plot_id == plot_id && c.receiver_id == receiver_id && c.level == level && !c.is_reversed
            })
            .cloned())
    }

    async fn list_active_commissions(
        &self,
        plot_id: DbId,
    ) -> Result<Vec<CommissionEntry>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .commissions
            .iter()
            .filter(|c| c.plot_id == plot_id && !c.is_reversed)
            .cloned()
            .collect())
    }

    async fn find_active_ledger_entry(
        &self,
        plot_id: DbId,
        wallet_id: DbId,
        level: i16,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .ledger
            .iter()
            .find(|e| {
                e.plot_id == Some(plot_id)
                    && e.wallet_id == wallet_id
                    && e.level == Some(level)
                    && e.status != TransactionStatus::Reversed
            })
            .cloned())
    }

    async fn list_active_ledger_entries(
        &self,
        plot_id: DbId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .ledger
            .iter()
            .filter(|e| e.plot_id == Some(plot_id) && e.status != TransactionStatus::Reversed)
            .cloned()
            .collect())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("writes disabled".into()));
        }

        let mut state = self.state.lock().await;
        let mut draft = state.clone();
        for op in batch.into_ops() {
            draft.apply(op)?;
        }
        *state = draft;
        Ok(())
    }

    async fn reset_all(&self) -> Result<ResetCounts, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("writes disabled".into()));
        }

        let mut state = self.state.lock().await;
        let counts = ResetCounts {
            commissions_deleted: state.commissions.len() as u64,
            transactions_deleted: state.ledger.len() as u64,
            wallets_reset: state.wallets.len() as u64,
        };
        state.commissions.clear();
        state.ledger.clear();
        for wallet in state.wallets.values_mut() {
            *wallet = WalletBalance::default();
        }
        Ok(counts)
    }
}
