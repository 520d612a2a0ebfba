//! Value types passed into and returned from the commission engine.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ledger::WalletType;
use crate::types::{Amount, DbId, Timestamp};

/// Number of upline levels that earn referral commission.
pub const MAX_UPLINE_LEVELS: u8 = 2;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Position of a commission receiver relative to the sale.
///
/// Persisted as the `level` column: `0` for the seller's direct commission,
/// `1` and `2` for the first and second upline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionTier {
    Direct,
    Level1,
    Level2,
}

impl CommissionTier {
    /// Stored `level` value.
    pub fn level(self) -> i16 {
        match self {
            Self::Direct => 0,
            Self::Level1 => 1,
            Self::Level2 => 2,
        }
    }

    /// Parse a stored `level` value.
    pub fn from_level(level: i16) -> Option<Self> {
        match level {
            0 => Some(Self::Direct),
            1 => Some(Self::Level1),
            2 => Some(Self::Level2),
            _ => None,
        }
    }

    /// Tier for the `n`-th upline (1-based). `None` beyond [`MAX_UPLINE_LEVELS`].
    pub fn upline(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Level1),
            2 => Some(Self::Level2),
            _ => None,
        }
    }

    /// Wallet component credited for this tier.
    pub fn wallet_type(self) -> WalletType {
        match self {
            Self::Direct => WalletType::Direct,
            Self::Level1 | Self::Level2 => WalletType::Downline,
        }
    }
}

// ---------------------------------------------------------------------------
// Sale measure
// ---------------------------------------------------------------------------

/// Plot area in gaj, the quantity the per-area commission rates apply to.
///
/// Commission is never computed from the sale price; wrapping the area in its
/// own type keeps call sites from passing a price by accident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SaleArea(f64);

impl SaleArea {
    pub fn new(gaj: f64) -> Result<Self, CoreError> {
        if !gaj.is_finite() || gaj <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Sale area must be a positive number of gaj, got {gaj}"
            )));
        }
        Ok(Self(gaj))
    }

    pub fn gaj(self) -> f64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Plot metadata used for ledger descriptions and idempotency keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRef {
    pub id: DbId,
    pub project_name: String,
    pub plot_number: String,
}

impl PlotRef {
    fn label(&self) -> String {
        format!("plot {} ({})", self.plot_number, self.project_name)
    }
}

/// Original creation timestamps of commission rows and ledger entries,
/// keyed by receiver and tier, carried through a recalculation so audit
/// dates stay stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreservedTimestamps {
    entries: HashMap<(DbId, CommissionTier), Timestamp>,
}

impl PreservedTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a timestamp, keeping the earliest one seen for the key.
    pub fn insert(&mut self, person_id: DbId, tier: CommissionTier, at: Timestamp) {
        self.entries
            .entry((person_id, tier))
            .and_modify(|existing| {
                if at < *existing {
                    *existing = at;
                }
            })
            .or_insert(at);
    }

    pub fn get(&self, person_id: DbId, tier: CommissionTier) -> Option<Timestamp> {
        self.entries.get(&(person_id, tier)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display label of a key, `"{person_id}_{level}"`.
    pub fn key_label(person_id: DbId, tier: CommissionTier) -> String {
        format!("{person_id}_{}", tier.level())
    }
}

/// Input of a single distribution.
#[derive(Debug, Clone)]
pub struct DistributionRequest {
    pub seller_id: DbId,
    /// Plot area in gaj. Validated into a [`SaleArea`].
    pub sale_area: f64,
    pub plot: Option<PlotRef>,
    /// `Some` marks a recalculation: existing rows are updated in place.
    pub preserved: Option<PreservedTimestamps>,
}

impl DistributionRequest {
    /// A fresh distribution for a sold plot.
    pub fn for_plot(seller_id: DbId, sale_area: f64, plot: PlotRef) -> Self {
        Self {
            seller_id,
            sale_area,
            plot: Some(plot),
            preserved: None,
        }
    }

    pub fn is_recalculation(&self) -> bool {
        self.preserved.is_some()
    }
}

// ---------------------------------------------------------------------------
// Ledger text
// ---------------------------------------------------------------------------

/// Ledger description for the seller's own commission.
pub fn direct_description(plot: Option<&PlotRef>) -> String {
    match plot {
        Some(p) => format!("Direct sale commission for {}", p.label()),
        None => "Direct sale commission".to_string(),
    }
}

/// Ledger description for an upline commission.
pub fn upline_description(tier: CommissionTier, seller_name: &str, plot: Option<&PlotRef>) -> String {
    match plot {
        Some(p) => format!(
            "Level {} commission from {seller_name}'s sale of {}",
            tier.level(),
            p.label()
        ),
        None => format!("Level {} commission from {seller_name}'s sale", tier.level()),
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Result of a distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub success: bool,
    /// Upline commission rows inserted or updated.
    pub commissions_generated: u32,
    pub total_distributed: Amount,
    pub seller_commission: Amount,
    pub upline_commissions: Amount,
    /// Every tier was already paid for this plot; nothing was written.
    pub already_calculated: bool,
}

/// Result of a bulk rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkRecalculationSummary {
    pub plots_processed: u32,
    pub plots_failed: u32,
    /// Sold plots with neither a broker nor a last updater.
    pub plots_skipped: u32,
    pub total_distributed: Amount,
}

/// Result of a single-plot recalculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRecalculationSummary {
    pub plot_id: DbId,
    pub success: bool,
    pub message: String,
    /// Rows and entries that no longer belong to the plot's chain.
    pub stale_entries_reversed: u32,
    pub distribution: DistributionSummary,
}

/// Result of a reversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReversalSummary {
    pub plot_id: DbId,
    pub seller_debited: Amount,
    pub upline_debited: Amount,
    pub commissions_reversed: u32,
    pub transactions_reversed: u32,
}

impl fmt::Display for ReversalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reversed {} commissions and {} transactions (seller -{}, upline -{})",
            self.commissions_reversed,
            self.transactions_reversed,
            self.seller_debited,
            self.upline_debited
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn tier_levels_round_trip() {
        for tier in [
            CommissionTier::Direct,
            CommissionTier::Level1,
            CommissionTier::Level2,
        ] {
            assert_eq!(CommissionTier::from_level(tier.level()), Some(tier));
        }
        assert_eq!(CommissionTier::from_level(3), None);
        assert_eq!(CommissionTier::upline(3), None);
        assert_eq!(CommissionTier::upline(0), None);
    }

    #[test]
    fn only_direct_tier_credits_direct_wallet() {
        assert_eq!(CommissionTier::Direct.wallet_type(), WalletType::Direct);
        assert_eq!(CommissionTier::Level1.wallet_type(), WalletType::Downline);
        assert_eq!(CommissionTier::Level2.wallet_type(), WalletType::Downline);
    }

    #[test]
    fn sale_area_rejects_non_positive() {
        assert!(SaleArea::new(0.0).is_err());
        assert!(SaleArea::new(-10.0).is_err());
        assert!(SaleArea::new(f64::NAN).is_err());
        assert_eq!(SaleArea::new(112.5).unwrap().gaj(), 112.5);
    }

    #[test]
    fn preserved_keeps_earliest_timestamp() {
        let now = Utc::now();
        let earlier = now - Duration::days(30);
        let mut preserved = PreservedTimestamps::new();
        preserved.insert(7, CommissionTier::Level1, now);
        preserved.insert(7, CommissionTier::Level1, earlier);
        preserved.insert(7, CommissionTier::Level1, now);
        assert_eq!(preserved.get(7, CommissionTier::Level1), Some(earlier));
        assert_eq!(preserved.get(7, CommissionTier::Direct), None);
        assert_eq!(preserved.len(), 1);
    }

    #[test]
    fn key_label_uses_stored_level() {
        assert_eq!(PreservedTimestamps::key_label(15, CommissionTier::Direct), "15_0");
        assert_eq!(PreservedTimestamps::key_label(15, CommissionTier::Level2), "15_2");
    }

    #[test]
    fn descriptions_mention_plot_and_level() {
        let plot = PlotRef {
            id: 1,
            project_name: "Green Valley".into(),
            plot_number: "A-12".into(),
        };
        assert_eq!(
            direct_description(Some(&plot)),
            "Direct sale commission for plot A-12 (Green Valley)"
        );
        assert_eq!(
            upline_description(CommissionTier::Level2, "Ravi", Some(&plot)),
            "Level 2 commission from Ravi's sale of plot A-12 (Green Valley)"
        );
    }
}
