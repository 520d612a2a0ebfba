//! Plot inventory status machine and payment-derived rules.
//!
//! A plot moves `available -> booked -> sold` in the normal flow. Cancelling
//! a booking returns it to `available`, and an administrative correction can
//! move a sold plot back to any other status, which undoes the commission
//! distribution made when it was sold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::{round_paise, validate_non_negative_amount};
use crate::types::Amount;

/// Paid percentage at which a booked plot is automatically marked sold.
pub const AUTO_SOLD_PAID_PERCENT: f64 = 50.0;

/// Maximum length of a project name.
pub const MAX_PROJECT_NAME_LEN: usize = 200;

/// Maximum length of a plot number.
pub const MAX_PLOT_NUMBER_LEN: usize = 50;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotStatus {
    Available,
    Booked,
    Sold,
    Cancelled,
}

/// Financial side effect required by a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialEffect {
    /// No wallet or ledger changes.
    None,
    /// The plot was just sold: distribute commission.
    Distribute,
    /// The plot is no longer sold: reverse the earlier distribution.
    Reverse,
}

impl PlotStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Sold => "sold",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether buyer details should be kept after moving into this status.
    pub fn keeps_buyer(self) -> bool {
        matches!(self, Self::Booked | Self::Sold)
    }

    /// Validate a transition from `self` to `next` and report the financial
    /// effect it carries.
    pub fn transition_to(self, next: PlotStatus) -> Result<FinancialEffect, CoreError> {
        use PlotStatus::*;

        let effect = match (self, next) {
            (Available, Booked) | (Available, Cancelled) => FinancialEffect::None,
            (Available, Sold) | (Booked, Sold) => FinancialEffect::Distribute,
            (Booked, Available) | (Booked, Cancelled) => FinancialEffect::None,
            (Sold, Available) | (Sold, Booked) | (Sold, Cancelled) => FinancialEffect::Reverse,
            (Cancelled, Available) => FinancialEffect::None,
            (from, to) if from == to => {
                return Err(CoreError::Conflict(format!(
                    "Plot is already {}",
                    from.as_str()
                )));
            }
            (from, to) => {
                return Err(CoreError::Conflict(format!(
                    "Cannot move plot from {} to {}",
                    from.as_str(),
                    to.as_str()
                )));
            }
        };
        Ok(effect)
    }
}

impl fmt::Display for PlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "booked" => Ok(Self::Booked),
            "sold" => Ok(Self::Sold),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown plot status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate the identifying and financial fields of a plot.
pub fn validate_plot_fields(
    project_name: &str,
    plot_number: &str,
    area_gaj: f64,
    total_amount: Amount,
    booking_amount: Amount,
) -> Result<(), CoreError> {
    let project = project_name.trim();
    if project.is_empty() || project.len() > MAX_PROJECT_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "project_name must be 1-{MAX_PROJECT_NAME_LEN} characters"
        )));
    }
    let number = plot_number.trim();
    if number.is_empty() || number.len() > MAX_PLOT_NUMBER_LEN {
        return Err(CoreError::Validation(format!(
            "plot_number must be 1-{MAX_PLOT_NUMBER_LEN} characters"
        )));
    }
    if !area_gaj.is_finite() || area_gaj <= 0.0 {
        return Err(CoreError::Validation(format!(
            "area_gaj must be positive, got {area_gaj}"
        )));
    }
    validate_non_negative_amount(total_amount, "total_amount")?;
    validate_non_negative_amount(booking_amount, "booking_amount")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Payment-derived rules
// ---------------------------------------------------------------------------

/// Percentage of the plot amount that has been paid, rounded to two decimals
/// and capped at 100. A plot without a total amount reports 0.
pub fn paid_percentage(paid_amount: Amount, total_amount: Amount) -> f64 {
    if total_amount <= 0.0 {
        return 0.0;
    }
    round_paise((paid_amount / total_amount * 100.0).min(100.0))
}

/// Whether a payment that brought the plot to `paid_percent` should
/// auto-transition it to sold.
pub fn should_auto_sell(status: PlotStatus, paid_percent: f64) -> bool {
    status == PlotStatus::Booked && paid_percent >= AUTO_SOLD_PAID_PERCENT
}
