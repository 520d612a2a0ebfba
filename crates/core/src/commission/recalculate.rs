//! Bulk rebuild and single-plot recalculation.

use chrono::Utc;

use crate::error::CoreError;
use crate::ledger::TransactionKind;
use crate::plot::PlotStatus;
use crate::money::round_paise;
use crate::types::DbId;

use super::engine::CommissionEngine;
use super::store::{CommissionEntry, CommissionStore, LedgerEntry, WriteBatch, WriteOp};
use super::types::{
    BulkRecalculationSummary, CommissionTier, DistributionRequest, PlotRecalculationSummary,
    PreservedTimestamps,
};

impl<S: CommissionStore> CommissionEngine<S> {
    /// Rebuild commissions for every sold plot from scratch.
    ///
    /// Deletes all commission rows and ledger entries and zeroes every wallet
    /// before redistributing. Per-plot failures are logged and counted; they
    /// never stop the batch.
    pub async fn recalculate_all(&self) -> Result<BulkRecalculationSummary, CoreError> {
        let reset = self.store.reset_all().await?;
        tracing::warn!(
            commissions_deleted = reset.commissions_deleted,
            transactions_deleted = reset.transactions_deleted,
            wallets_reset = reset.wallets_reset,
            "Commission ledger cleared for bulk recalculation"
        );

        let plots = self.store.list_sold_plots().await?;
        let mut summary = BulkRecalculationSummary::default();

        for plot in plots {
            let Some(broker_id) = plot.responsible_broker() else {
                tracing::debug!(plot_id = plot.id, "Sold plot has no broker or updater, skipping");
                summary.plots_skipped += 1;
                continue;
            };

            let request = DistributionRequest::for_plot(broker_id, plot.area_gaj, plot.plot_ref());
            match self.distribute(request).await {
                Ok(result) => {
                    summary.plots_processed += 1;
                    summary.total_distributed =
                        round_paise(summary.total_distributed + result.total_distributed);
                }
                Err(e) => {
                    tracing::error!(
                        plot_id = plot.id,
                        broker_id,
                        error = %e,
                        "Commission recalculation failed for plot"
                    );
                    summary.plots_failed += 1;
                }
            }
        }

        tracing::info!(
            plots_processed = summary.plots_processed,
            plots_failed = summary.plots_failed,
            plots_skipped = summary.plots_skipped,
            total_distributed = summary.total_distributed,
            "Bulk commission recalculation finished"
        );
        Ok(summary)
    }

    /// Recompute commission for one sold plot, keeping the original creation
    /// dates of its commission rows and ledger entries.
    ///
    /// The old amounts are taken back out of the wallets and the new ones
    /// credited in the same unit of work. Rows that no longer belong to the
    /// plot's chain (the broker or an upline changed) are reversed.
    pub async fn recalculate_plot(
        &self,
        plot_id: DbId,
    ) -> Result<PlotRecalculationSummary, CoreError> {
        let plot = self
            .store
            .find_plot(plot_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Plot",
                id: plot_id,
            })?;

        if plot.status != PlotStatus::Sold {
            return Err(CoreError::Conflict(format!(
                "Plot {} is {}, only sold plots can be recalculated",
                plot.id, plot.status
            )));
        }

        let broker_id = plot.responsible_broker().ok_or_else(|| {
            CoreError::Validation(format!("Plot {} has no broker to credit", plot.id))
        })?;

        let commissions = self.store.list_active_commissions(plot.id).await?;
        let credits: Vec<LedgerEntry> = self
            .store
            .list_active_ledger_entries(plot.id)
            .await?
            .into_iter()
            .filter(|e| e.kind == TransactionKind::Credit)
            .collect();

        let preserved = preserved_timestamps(&commissions, &credits)?;

        let mut batch = WriteBatch::new();
        for entry in &credits {
            batch.push(WriteOp::DebitWallet {
                owner_id: entry.wallet_id,
                wallet_type: entry.wallet_type,
                amount: entry.amount,
            });
        }

        let request = DistributionRequest {
            seller_id: broker_id,
            sale_area: plot.area_gaj,
            plot: Some(plot.plot_ref()),
            preserved: Some(preserved),
        };
        let plan = self.plan_distribution(&request).await?;

        let mut stale = WriteBatch::new();
        let reversed_at = Utc::now();
        for row in commissions
            .iter()
            .filter(|c| !plan.touched_commissions.contains(&c.id))
        {
            stale.push(WriteOp::ReverseCommission {
                id: row.id,
                reversed_at,
            });
        }
        for entry in credits
            .iter()
            .filter(|e| !plan.touched_ledger.contains(&e.id))
        {
            stale.push(WriteOp::ReverseLedger { id: entry.id });
        }
        let stale_entries_reversed = stale.len() as u32;

        batch.append(plan.batch);
        batch.append(stale);
        self.store.apply(batch).await?;

        let summary = plan.summary;
        tracing::info!(
            plot_id = plot.id,
            broker_id,
            total_distributed = summary.total_distributed,
            stale_entries_reversed,
            "Commission recalculated for plot"
        );

        Ok(PlotRecalculationSummary {
            plot_id: plot.id,
            success: true,
            message: format!(
                "Recalculated commission for plot {} ({}): {} distributed across {} upline commissions",
                plot.plot_number, plot.project_name, summary.total_distributed, summary.commissions_generated
            ),
            stale_entries_reversed,
            distribution: summary,
        })
    }
}

/// Collect original creation timestamps keyed by receiver and tier.
fn preserved_timestamps(
    commissions: &[CommissionEntry],
    credits: &[LedgerEntry],
) -> Result<PreservedTimestamps, CoreError> {
    let mut preserved = PreservedTimestamps::new();

    for row in commissions {
        let tier = CommissionTier::from_level(row.level).ok_or_else(|| {
            CoreError::Conflict(format!(
                "Commission {} has invalid level {}",
                row.id, row.level
            ))
        })?;
        preserved.insert(row.receiver_id, tier, row.created_at);
    }

    for entry in credits {
        preserved.insert(entry.wallet_id, entry.tier()?, entry.created_at);
    }

    Ok(preserved)
}
