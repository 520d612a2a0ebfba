//! Per-gaj commission rates.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::round_paise;
use crate::types::Amount;

use super::types::{CommissionTier, SaleArea};

/// Default rupees per gaj paid to the selling broker.
pub const DEFAULT_DIRECT_RATE: f64 = 1000.0;
/// Default rupees per gaj paid to the first upline.
pub const DEFAULT_LEVEL1_RATE: f64 = 200.0;
/// Default rupees per gaj paid to the second upline.
pub const DEFAULT_LEVEL2_RATE: f64 = 50.0;

/// Commission rates in rupees per gaj, injected into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionRates {
    pub direct_rate: f64,
    pub level1_rate: f64,
    pub level2_rate: f64,
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self {
            direct_rate: DEFAULT_DIRECT_RATE,
            level1_rate: DEFAULT_LEVEL1_RATE,
            level2_rate: DEFAULT_LEVEL2_RATE,
        }
    }
}

impl CommissionRates {
    /// Build a validated rate set. Every rate must be finite and non-negative.
    pub fn new(direct_rate: f64, level1_rate: f64, level2_rate: f64) -> Result<Self, CoreError> {
        for (name, rate) in [
            ("direct_rate", direct_rate),
            ("level1_rate", level1_rate),
            ("level2_rate", level2_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(CoreError::Validation(format!(
                    "{name} must be a non-negative number, got {rate}"
                )));
            }
        }
        Ok(Self {
            direct_rate,
            level1_rate,
            level2_rate,
        })
    }

    pub fn rate_for(&self, tier: CommissionTier) -> f64 {
        match tier {
            CommissionTier::Direct => self.direct_rate,
            CommissionTier::Level1 => self.level1_rate,
            CommissionTier::Level2 => self.level2_rate,
        }
    }

    /// Commission owed to `tier` for a sale of `area`.
    pub fn amount_for(&self, tier: CommissionTier, area: SaleArea) -> Amount {
        round_paise(area.gaj() * self.rate_for(tier))
    }
}
