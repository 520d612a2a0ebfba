//! Commission distribution: direct commission for the seller plus referral
//! commission for up to [`MAX_UPLINE_LEVELS`] uplines.

use std::collections::HashSet;

use chrono::Utc;

use crate::error::CoreError;
use crate::ledger::{TransactionKind, TransactionStatus};
use crate::money::round_paise;
use crate::types::{Amount, DbId, Timestamp};

use super::rates::CommissionRates;
use super::store::{
    CommissionStore, NewCommission, NewLedgerEntry, ProfileRef, WriteBatch, WriteOp,
};
use super::types::{
    direct_description, upline_description, CommissionTier, DistributionRequest,
    DistributionSummary, SaleArea, MAX_UPLINE_LEVELS,
};

/// Computes and persists commissions through a [`CommissionStore`].
pub struct CommissionEngine<S> {
    pub(crate) store: S,
    pub(crate) rates: CommissionRates,
}

/// Writes a distribution needs, computed before anything is written.
#[derive(Debug, Default)]
pub(crate) struct DistributionPlan {
    pub batch: WriteBatch,
    pub summary: DistributionSummary,
    /// Existing commission rows the plan updates in place.
    pub touched_commissions: HashSet<DbId>,
    /// Existing ledger entries the plan updates in place.
    pub touched_ledger: HashSet<DbId>,
}

impl<S: CommissionStore> CommissionEngine<S> {
    pub fn new(store: S, rates: CommissionRates) -> Self {
        Self { store, rates }
    }

    pub fn rates(&self) -> &CommissionRates {
        &self.rates
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Distribute commission for one sale.
    ///
    /// Without preserved timestamps this is a fresh distribution: any tier
    /// already paid for the plot is skipped, so repeating the call never
    /// double-credits. With preserved timestamps existing rows are rewritten
    /// in place and keep their original `created_at`.
    pub async fn distribute(
        &self,
        request: DistributionRequest,
    ) -> Result<DistributionSummary, CoreError> {
        let plan = self.plan_distribution(&request).await?;

        if plan.summary.already_calculated {
            tracing::info!(
                seller_id = request.seller_id,
                plot_id = ?request.plot.as_ref().map(|p| p.id),
                "Commission already calculated, nothing to distribute"
            );
            return Ok(plan.summary);
        }

        if !plan.batch.is_empty() {
            self.store.apply(plan.batch).await?;
        }

        tracing::info!(
            seller_id = request.seller_id,
            plot_id = ?request.plot.as_ref().map(|p| p.id),
            seller_commission = plan.summary.seller_commission,
            upline_commissions = plan.summary.upline_commissions,
            commissions_generated = plan.summary.commissions_generated,
            recalculation = request.is_recalculation(),
            "Commission distributed"
        );

        Ok(plan.summary)
    }

    /// Resolve the chain and compute every write of a distribution.
    pub(crate) async fn plan_distribution(
        &self,
        request: &DistributionRequest,
    ) -> Result<DistributionPlan, CoreError> {
        if request.seller_id <= 0 {
            return Err(CoreError::Validation(format!(
                "seller_id must be a positive id, got {}",
                request.seller_id
            )));
        }
        let area = SaleArea::new(request.sale_area)?;

        let seller = self
            .store
            .find_profile(request.seller_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Profile",
                id: request.seller_id,
            })?;

        let now = Utc::now();
        let mut plan = DistributionPlan::default();
        let mut skipped_tiers = 0u32;

        // --- Seller ---
        let direct_amount = self.rates.amount_for(CommissionTier::Direct, area);
        if self
            .plan_direct(request, &seller, direct_amount, now, &mut plan)
            .await?
        {
            plan.summary.seller_commission = direct_amount;
        } else {
            skipped_tiers += 1;
        }

        // --- Upline walk ---
        let mut visited: HashSet<DbId> = HashSet::from([seller.id]);
        let mut next_id = seller.upline_id;
        let mut upline_total: Amount = 0.0;

        for n in 1..=MAX_UPLINE_LEVELS {
            let Some(upline_id) = next_id else { break };
            let Some(tier) = CommissionTier::upline(n) else { break };

            if !visited.insert(upline_id) {
                tracing::warn!(
                    seller_id = seller.id,
                    upline_id,
                    level = n,
                    "Upline chain revisits a profile, stopping walk"
                );
                break;
            }

            let Some(upline) = self.store.find_profile(upline_id).await? else {
                tracing::warn!(upline_id, level = n, "Upline profile not found, stopping walk");
                break;
            };

            let amount = self.rates.amount_for(tier, area);
            if self
                .plan_upline(request, &seller, &upline, tier, area, amount, now, &mut plan)
                .await?
            {
                plan.summary.commissions_generated += 1;
                upline_total += amount;
            } else {
                skipped_tiers += 1;
            }

            next_id = upline.upline_id;
        }

        plan.summary.upline_commissions = round_paise(upline_total);
        plan.summary.total_distributed =
            round_paise(plan.summary.seller_commission + plan.summary.upline_commissions);
        plan.summary.already_calculated = plan.batch.is_empty() && skipped_tiers > 0;
        plan.summary.success = true;

        Ok(plan)
    }

    /// Plan the seller's direct credit. Returns `false` when skipped.
    async fn plan_direct(
        &self,
        request: &DistributionRequest,
        seller: &ProfileRef,
        amount: Amount,
        now: Timestamp,
        plan: &mut DistributionPlan,
    ) -> Result<bool, CoreError> {
        let tier = CommissionTier::Direct;
        let existing = match &request.plot {
            Some(plot) => {
                self.store
                    .find_active_ledger_entry(plot.id, seller.id, tier.level())
                    .await?
            }
            None => None,
        };

        let preserved_at = request
            .preserved
            .as_ref()
            .and_then(|p| p.get(seller.id, tier));
        let description = direct_description(request.plot.as_ref());

        match (existing, request.is_recalculation()) {
            (Some(entry), false) => {
                tracing::debug!(
                    seller_id = seller.id,
                    entry_id = entry.id,
                    "Direct commission already recorded, skipping"
                );
                return Ok(false);
            }
            (Some(entry), true) => {
                plan.touched_ledger.insert(entry.id);
                plan.batch.push(WriteOp::UpdateLedger {
                    id: entry.id,
                    amount,
                    description,
                    created_at: preserved_at,
                });
            }
            (None, _) => {
                plan.batch.push(WriteOp::InsertLedger(NewLedgerEntry {
                    wallet_id: seller.id,
                    wallet_type: tier.wallet_type(),
                    kind: TransactionKind::Credit,
                    amount,
                    description,
                    status: TransactionStatus::Completed,
                    plot_id: request.plot.as_ref().map(|p| p.id),
                    project_name: request.plot.as_ref().map(|p| p.project_name.clone()),
                    level: Some(tier.level()),
                    created_at: preserved_at.unwrap_or(now),
                }));
            }
        }

        plan.batch.push(WriteOp::CreditWallet {
            owner_id: seller.id,
            wallet_type: tier.wallet_type(),
            amount,
        });
        Ok(true)
    }

    /// Plan one upline level. Returns `false` when skipped.
    #[allow(clippy::too_many_arguments)]
    async fn plan_upline(
        &self,
        request: &DistributionRequest,
        seller: &ProfileRef,
        upline: &ProfileRef,
        tier: CommissionTier,
        area: SaleArea,
        amount: Amount,
        now: Timestamp,
        plan: &mut DistributionPlan,
    ) -> Result<bool, CoreError> {
        let level = tier.level();
        let preserved_at = request
            .preserved
            .as_ref()
            .and_then(|p| p.get(upline.id, tier));
        let description = upline_description(tier, &seller.full_name, request.plot.as_ref());

        let Some(plot) = &request.plot else {
            // Without a plot there is no commission row to key on; credit and
            // record the ledger entry only.
            plan.batch.push(WriteOp::InsertLedger(NewLedgerEntry {
                wallet_id: upline.id,
                wallet_type: tier.wallet_type(),
                kind: TransactionKind::Credit,
                amount,
                description,
                status: TransactionStatus::Completed,
                plot_id: None,
                project_name: None,
                level: Some(level),
                created_at: now,
            }));
            plan.batch.push(WriteOp::CreditWallet {
                owner_id: upline.id,
                wallet_type: tier.wallet_type(),
                amount,
            });
            return Ok(true);
        };

        let existing_row = self
            .store
            .find_active_commission(plot.id, upline.id, level)
            .await?;
        let existing_entry = self
            .store
            .find_active_ledger_entry(plot.id, upline.id, level)
            .await?;

        if !request.is_recalculation() {
            match (&existing_row, &existing_entry) {
                (Some(row), _) => {
                    tracing::debug!(
                        plot_id = plot.id,
                        receiver_id = upline.id,
                        level,
                        commission_id = row.id,
                        "Upline commission already recorded, skipping"
                    );
                    return Ok(false);
                }
                (None, Some(entry)) => {
                    // The wallet was credited when the entry was written; only
                    // the commission row is restored.
                    tracing::warn!(
                        plot_id = plot.id,
                        receiver_id = upline.id,
                        level,
                        entry_id = entry.id,
                        "Ledger entry without commission row, restoring row only"
                    );
                    plan.batch.push(WriteOp::InsertCommission(NewCommission {
                        plot_id: plot.id,
                        seller_id: seller.id,
                        seller_name: seller.full_name.clone(),
                        receiver_id: upline.id,
                        receiver_name: upline.full_name.clone(),
                        level,
                        amount: entry.amount,
                        sale_area: area.gaj(),
                        created_at: entry.created_at,
                    }));
                    return Ok(false);
                }
                (None, None) => {}
            }
        }

        match existing_row {
            Some(row) => {
                plan.touched_commissions.insert(row.id);
                plan.batch.push(WriteOp::UpdateCommission {
                    id: row.id,
                    amount,
                    sale_area: area.gaj(),
                    seller_name: seller.full_name.clone(),
                    receiver_name: upline.full_name.clone(),
                    created_at: preserved_at,
                });
            }
            None => {
                plan.batch.push(WriteOp::InsertCommission(NewCommission {
                    plot_id: plot.id,
                    seller_id: seller.id,
                    seller_name: seller.full_name.clone(),
                    receiver_id: upline.id,
                    receiver_name: upline.full_name.clone(),
                    level,
                    amount,
                    sale_area: area.gaj(),
                    created_at: preserved_at.unwrap_or(now),
                }));
            }
        }

        plan.batch.push(WriteOp::CreditWallet {
            owner_id: upline.id,
            wallet_type: tier.wallet_type(),
            amount,
        });

        match existing_entry {
            Some(entry) => {
                plan.touched_ledger.insert(entry.id);
                plan.batch.push(WriteOp::UpdateLedger {
                    id: entry.id,
                    amount,
                    description,
                    created_at: preserved_at,
                });
            }
            None => {
                plan.batch.push(WriteOp::InsertLedger(NewLedgerEntry {
                    wallet_id: upline.id,
                    wallet_type: tier.wallet_type(),
                    kind: TransactionKind::Credit,
                    amount,
                    description,
                    status: TransactionStatus::Completed,
                    plot_id: Some(plot.id),
                    project_name: Some(plot.project_name.clone()),
                    level: Some(level),
                    created_at: preserved_at.unwrap_or(now),
                }));
            }
        }

        Ok(true)
    }
}
