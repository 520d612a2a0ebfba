//! PostgreSQL implementation of [`CommissionStore`].
//!
//! Every [`WriteBatch`] runs inside a single database transaction. The partial
//! unique indexes on `commissions` and `transactions` turn a concurrent
//! duplicate distribution into [`StoreError::Duplicate`] and roll the whole
//! batch back.

use async_trait::async_trait;
use plotledger_core::commission::{
    CommissionEntry, CommissionStore, LedgerEntry, PlotSnapshot, ProfileRef, ResetCounts,
    StoreError, WriteBatch, WriteOp,
};
use plotledger_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::plot::Plot;
use crate::repositories::{CommissionRepo, PlotRepo, ProfileRepo, TransactionRepo, WalletRepo};

/// Commission store backed by the application's connection pool.
#[derive(Debug, Clone)]
pub struct PgCommissionStore {
    pool: PgPool,
}

impl PgCommissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a sqlx error, keeping unique violations distinguishable.
fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::Duplicate(format!("unique constraint {constraint}"));
        }
    }
    StoreError::Backend(err.to_string())
}

fn snapshot(plot: Plot) -> Result<PlotSnapshot, StoreError> {
    plot.snapshot()
        .map_err(|e| StoreError::Backend(format!("plot {}: {e}", plot.id)))
}

/// Fail when an update or reversal matched no row.
fn expect_row(affected: u64, what: &str, id: DbId) -> Result<(), StoreError> {
    if affected == 0 {
        return Err(StoreError::Missing(format!("{what} {id}")));
    }
    Ok(())
}

async fn apply_op(conn: &mut PgConnection, op: WriteOp) -> Result<(), StoreError> {
    match op {
        WriteOp::CreditWallet {
            owner_id,
            wallet_type,
            amount,
        } => {
            WalletRepo::credit(conn, owner_id, wallet_type, amount)
                .await
                .map_err(store_error)?;
        }
        WriteOp::DebitWallet {
            owner_id,
            wallet_type,
            amount,
        } => {
            WalletRepo::debit(conn, owner_id, wallet_type, amount)
                .await
                .map_err(store_error)?;
        }
        WriteOp::InsertLedger(entry) => {
            TransactionRepo::insert(conn, &entry)
                .await
                .map_err(store_error)?;
        }
        WriteOp::UpdateLedger {
            id,
            amount,
            description,
            created_at,
        } => {
            let affected = TransactionRepo::update_amount(conn, id, amount, &description, created_at)
                .await
                .map_err(store_error)?;
            expect_row(affected, "ledger entry", id)?;
        }
        WriteOp::ReverseLedger { id } => {
            let affected = TransactionRepo::reverse(conn, id)
                .await
                .map_err(store_error)?;
            expect_row(affected, "ledger entry", id)?;
        }
        WriteOp::ReverseLedgerForPlot { plot_id } => {
            TransactionRepo::reverse_for_plot(conn, plot_id)
                .await
                .map_err(store_error)?;
        }
        WriteOp::InsertCommission(row) => {
            CommissionRepo::insert(conn, &row)
                .await
                .map_err(store_error)?;
        }
        WriteOp::UpdateCommission {
            id,
            amount,
            sale_area,
            seller_name,
            receiver_name,
            created_at,
        } => {
            let affected = CommissionRepo::update_amount(
                conn,
                id,
                amount,
                sale_area,
                (&seller_name, &receiver_name),
                created_at,
            )
            .await
            .map_err(store_error)?;
            expect_row(affected, "commission", id)?;
        }
        WriteOp::ReverseCommission { id, reversed_at } => {
            let affected = CommissionRepo::reverse(conn, id, reversed_at)
                .await
                .map_err(store_error)?;
            expect_row(affected, "commission", id)?;
        }
    }
    Ok(())
}

#[async_trait]
impl CommissionStore for PgCommissionStore {
    async fn find_profile(&self, id: DbId) -> Result<Option<ProfileRef>, StoreError> {
        let profile = ProfileRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?;
        Ok(profile.map(ProfileRef::from))
    }

    async fn find_plot(&self, id: DbId) -> Result<Option<PlotSnapshot>, StoreError> {
        PlotRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(snapshot)
            .transpose()
    }

    async fn list_sold_plots(&self) -> Result<Vec<PlotSnapshot>, StoreError> {
        PlotRepo::list_sold(&self.pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(snapshot)
            .collect()
    }

    async fn find_active_commission(
        &self,
        plot_id: DbId,
        receiver_id: DbId,
        level: i16,
    ) -> Result<Option<CommissionEntry>, StoreError> {
        let row = CommissionRepo::find_active(&self.pool, plot_id, receiver_id, level)
            .await
            .map_err(store_error)?;
        Ok(row.map(CommissionEntry::from))
    }

    async fn list_active_commissions(
        &self,
        plot_id: DbId,
    ) -> Result<Vec<CommissionEntry>, StoreError> {
        let rows = CommissionRepo::list_active_for_plot(&self.pool, plot_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(CommissionEntry::from).collect())
    }

    async fn find_active_ledger_entry(
        &self,
        plot_id: DbId,
        wallet_id: DbId,
        level: i16,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        TransactionRepo::find_active(&self.pool, plot_id, wallet_id, level)
            .await
            .map_err(store_error)?
            .map(|t| LedgerEntry::try_from(t).map_err(|e| StoreError::Backend(e.to_string())))
            .transpose()
    }

    async fn list_active_ledger_entries(
        &self,
        plot_id: DbId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        TransactionRepo::list_active_for_plot(&self.pool, plot_id)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|t| LedgerEntry::try_from(t).map_err(|e| StoreError::Backend(e.to_string())))
            .collect()
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let op_count = batch.len();
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        for op in batch.into_ops() {
            // Dropping `tx` on error rolls the whole batch back.
            apply_op(&mut *tx, op).await?;
        }

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(op_count, "Commission write batch committed");
        Ok(())
    }

    async fn reset_all(&self) -> Result<ResetCounts, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let commissions_deleted = CommissionRepo::delete_all(&mut *tx)
            .await
            .map_err(store_error)?;
        let transactions_deleted = TransactionRepo::delete_all(&mut *tx)
            .await
            .map_err(store_error)?;
        let wallets_reset = WalletRepo::reset_all(&mut *tx).await.map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        Ok(ResetCounts {
            commissions_deleted,
            transactions_deleted,
            wallets_reset,
        })
    }
}
