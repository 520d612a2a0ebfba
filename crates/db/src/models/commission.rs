//! Upline commission models.

use plotledger_core::commission::CommissionEntry;
use plotledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `commissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Commission {
    pub id: DbId,
    pub plot_id: DbId,
    pub seller_id: DbId,
    pub seller_name: String,
    pub receiver_id: DbId,
    pub receiver_name: String,
    pub level: i16,
    pub amount: f64,
    pub sale_area: f64,
    pub is_reversed: bool,
    pub reversed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Commission> for CommissionEntry {
    fn from(c: Commission) -> Self {
        CommissionEntry {
            id: c.id,
            plot_id: c.plot_id,
            seller_id: c.seller_id,
            seller_name: c.seller_name,
            receiver_id: c.receiver_id,
            receiver_name: c.receiver_name,
            level: c.level,
            amount: c.amount,
            sale_area: c.sale_area,
            is_reversed: c.is_reversed,
            reversed_at: c.reversed_at,
            created_at: c.created_at,
        }
    }
}

/// Filters for `GET /commissions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommissionFilter {
    pub plot_id: Option<DbId>,
    pub receiver_id: Option<DbId>,
    #[serde(default)]
    pub include_reversed: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /commissions/distribute`.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributeCommission {
    pub seller_id: DbId,
    pub sale_area: f64,
    pub plot_id: Option<DbId>,
}
