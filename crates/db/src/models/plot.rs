//! Plot inventory models.

use plotledger_core::commission::PlotSnapshot;
use plotledger_core::error::CoreError;
use plotledger_core::plot::PlotStatus;
use plotledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `plots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plot {
    pub id: DbId,
    pub project_name: String,
    pub block: Option<String>,
    pub plot_number: String,
    pub area_gaj: f64,
    pub status: String,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub booking_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub paid_percentage: f64,
    pub broker_id: Option<DbId>,
    pub sale_price: Option<f64>,
    pub updated_by: Option<DbId>,
    pub sold_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Plot {
    /// Parsed status. The check constraint keeps the column within the enum.
    pub fn status(&self) -> Result<PlotStatus, CoreError> {
        self.status.parse()
    }

    /// The view of this plot the commission engine works with.
    pub fn snapshot(&self) -> Result<PlotSnapshot, CoreError> {
        Ok(PlotSnapshot {
            id: self.id,
            project_name: self.project_name.clone(),
            plot_number: self.plot_number.clone(),
            area_gaj: self.area_gaj,
            status: self.status()?,
            broker_id: self.broker_id,
            updated_by: self.updated_by,
        })
    }
}

/// DTO for creating a plot. New plots always start `available`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePlot {
    #[validate(length(min = 1, max = 200))]
    pub project_name: String,
    pub block: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub plot_number: String,
    pub area_gaj: f64,
    pub booking_amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub broker_id: Option<DbId>,
    pub sale_price: Option<f64>,
    pub updated_by: Option<DbId>,
}

/// DTO for updating a plot. Only non-`None` fields are applied.
///
/// Status is not updatable here; it goes through the transition endpoint.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePlot {
    #[validate(length(min = 1, max = 200))]
    pub project_name: Option<String>,
    pub block: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub plot_number: Option<String>,
    pub area_gaj: Option<f64>,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub booking_amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub broker_id: Option<DbId>,
    pub sale_price: Option<f64>,
    pub updated_by: Option<DbId>,
}

/// Request body for `PUT /plots/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionPlot {
    pub status: PlotStatus,
    /// Broker to credit on a sale; falls back to the plot's current broker.
    pub broker_id: Option<DbId>,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub updated_by: Option<DbId>,
}

/// Values written when a plot changes status.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: PlotStatus,
    pub broker_id: Option<DbId>,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub updated_by: Option<DbId>,
}

/// Filters for listing plots (`?status=&project_name=&broker_id=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlotFilter {
    pub status: Option<String>,
    pub project_name: Option<String>,
    pub broker_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
