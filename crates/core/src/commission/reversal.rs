//! Undo the financial effects of a sale when a plot stops being sold.

use std::collections::HashSet;

use chrono::Utc;

use crate::error::CoreError;
use crate::ledger::{TransactionKind, WalletType};
use crate::money::round_paise;
use crate::types::DbId;

use super::engine::CommissionEngine;
use super::store::{CommissionStore, LedgerEntry, WriteBatch, WriteOp};
use super::types::ReversalSummary;

impl<S: CommissionStore> CommissionEngine<S> {
    /// Reverse every active commission and ledger entry of a plot.
    ///
    /// Wallets are debited by the amounts recorded in the ledger, each
    /// component floored at zero. Nothing is deleted: commission rows are
    /// flagged `is_reversed` and ledger entries move to `reversed`.
    pub async fn reverse_plot(&self, plot_id: DbId) -> Result<ReversalSummary, CoreError> {
        let plot = self
            .store
            .find_plot(plot_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Plot",
                id: plot_id,
            })?;

        let commissions = self.store.list_active_commissions(plot.id).await?;
        let entries = self.store.list_active_ledger_entries(plot.id).await?;

        let mut batch = WriteBatch::new();
        let mut summary = ReversalSummary {
            plot_id: plot.id,
            ..Default::default()
        };
        let mut reversed_entries: HashSet<DbId> = HashSet::new();
        let reversed_at = Utc::now();

        // Seller: direct credits.
        for entry in entries
            .iter()
            .filter(|e| e.kind == TransactionKind::Credit && e.wallet_type == WalletType::Direct)
        {
            batch.push(WriteOp::DebitWallet {
                owner_id: entry.wallet_id,
                wallet_type: WalletType::Direct,
                amount: entry.amount,
            });
            batch.push(WriteOp::ReverseLedger { id: entry.id });
            reversed_entries.insert(entry.id);
            summary.seller_debited += entry.amount;
        }

        // Uplines: one debit per commission row, plus its ledger entry.
        for row in &commissions {
            batch.push(WriteOp::DebitWallet {
                owner_id: row.receiver_id,
                wallet_type: WalletType::Downline,
                amount: row.amount,
            });

            let matching = entries.iter().find(|e| {
                e.wallet_id == row.receiver_id
                    && e.level == Some(row.level)
                    && e.kind == TransactionKind::Credit
            });
            if let Some(entry) = matching {
                if reversed_entries.insert(entry.id) {
                    batch.push(WriteOp::ReverseLedger { id: entry.id });
                }
            }

            batch.push(WriteOp::ReverseCommission {
                id: row.id,
                reversed_at,
            });
            summary.upline_debited += row.amount;
            summary.commissions_reversed += 1;
        }

        // Downline credits with no commission row still moved money.
        let orphaned: Vec<&LedgerEntry> = entries
            .iter()
            .filter(|e| {
                e.kind == TransactionKind::Credit
                    && e.wallet_type == WalletType::Downline
                    && !reversed_entries.contains(&e.id)
            })
            .collect();
        for entry in orphaned {
            tracing::warn!(
                plot_id = plot.id,
                entry_id = entry.id,
                wallet_id = entry.wallet_id,
                "Reversing downline credit that has no commission row"
            );
            batch.push(WriteOp::DebitWallet {
                owner_id: entry.wallet_id,
                wallet_type: WalletType::Downline,
                amount: entry.amount,
            });
            batch.push(WriteOp::ReverseLedger { id: entry.id });
            reversed_entries.insert(entry.id);
            summary.upline_debited += entry.amount;
        }

        // Anything left on the plot is void as well.
        batch.push(WriteOp::ReverseLedgerForPlot { plot_id: plot.id });

        summary.transactions_reversed = entries.len() as u32;
        summary.seller_debited = round_paise(summary.seller_debited);
        summary.upline_debited = round_paise(summary.upline_debited);

        self.store.apply(batch).await?;

        tracing::info!(
            plot_id = plot.id,
            seller_debited = summary.seller_debited,
            upline_debited = summary.upline_debited,
            commissions_reversed = summary.commissions_reversed,
            transactions_reversed = summary.transactions_reversed,
            "Plot financials reversed"
        );
        Ok(summary)
    }
}
