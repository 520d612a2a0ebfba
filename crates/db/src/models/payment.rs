//! Installment payment and receipt models.

use plotledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub plot_id: DbId,
    pub amount: f64,
    pub method: String,
    pub reference: Option<String>,
    pub receipt_number: String,
    pub received_by: Option<DbId>,
    pub paid_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a payment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayment {
    pub amount: f64,
    pub method: String,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    pub received_by: Option<DbId>,
    pub paid_at: Option<Timestamp>,
}

/// Payment joined with the plot and buyer data printed on a receipt.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentReceipt {
    pub payment_id: DbId,
    pub receipt_number: String,
    pub amount: f64,
    pub method: String,
    pub reference: Option<String>,
    pub paid_at: Timestamp,
    pub plot_id: DbId,
    pub project_name: String,
    pub block: Option<String>,
    pub plot_number: String,
    pub area_gaj: f64,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub paid_percentage: f64,
    pub balance_due: f64,
}
