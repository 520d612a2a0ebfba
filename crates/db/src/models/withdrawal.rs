//! Withdrawal request models.

use plotledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `withdrawal_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WithdrawalRequest {
    pub id: DbId,
    pub profile_id: DbId,
    pub amount: f64,
    pub status: String,
    pub note: Option<String>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for requesting a withdrawal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWithdrawal {
    pub profile_id: DbId,
    pub amount: f64,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Request body for approving or rejecting a withdrawal.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DecideWithdrawal {
    pub decided_by: Option<DbId>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Filter for `GET /withdrawals`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawalFilter {
    pub status: Option<String>,
    pub profile_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
