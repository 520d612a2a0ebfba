//! Wallet reads and manual adjustments.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use plotledger_core::commission::NewLedgerEntry;
use plotledger_core::error::CoreError;
use plotledger_core::ledger::{TransactionKind, TransactionStatus};
use plotledger_core::money::{round_paise, validate_positive_amount};
use plotledger_core::types::DbId;
use plotledger_db::models::transaction::Transaction;
use plotledger_db::models::wallet::{AdjustmentDirection, WalletAdjustment, WalletSummary};
use plotledger_db::repositories::{TransactionRepo, WalletRepo};
use serde::Serialize;
use validator::Validate;

use super::{require_optional_profile, require_profile};
use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a manual adjustment.
#[derive(Debug, Serialize)]
pub struct AdjustmentResult {
    pub wallet: WalletSummary,
    pub transaction: Transaction,
}

/// GET /api/v1/profiles/{id}/wallet
///
/// Profiles that were never credited report a zero wallet.
pub async fn get_for_profile(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WalletSummary>>> {
    require_profile(&state.pool, id).await?;
    let balance = WalletRepo::find_by_owner(&state.pool, id)
        .await?
        .map(|w| w.balance())
        .unwrap_or_default();
    Ok(Json(DataResponse {
        data: WalletSummary::new(id, balance),
    }))
}

/// GET /api/v1/profiles/{id}/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Transaction>>>> {
    require_profile(&state.pool, id).await?;
    let (limit, offset) = params.resolve();
    let entries = TransactionRepo::list_for_owner(&state.pool, id, limit, offset).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/wallets/{owner_id}/adjust
///
/// Credits or debits one wallet component and records the ledger entry in
/// the same transaction. A debit is floored at zero and the entry carries
/// the amount actually removed.
pub async fn adjust(
    State(state): State<AppState>,
    Path(owner_id): Path<DbId>,
    Json(input): Json<WalletAdjustment>,
) -> AppResult<Json<DataResponse<AdjustmentResult>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_positive_amount(input.amount, "amount")?;
    if input.description.trim().is_empty() {
        return Err(AppError::BadRequest("description must not be blank".into()));
    }
    require_profile(&state.pool, owner_id).await?;
    require_optional_profile(&state.pool, input.actor_id).await?;

    let mut tx = state.pool.begin().await?;

    let before = WalletRepo::lock_balance(&mut *tx, owner_id).await?;
    let (after, kind, recorded) = match input.direction {
        AdjustmentDirection::Credit => {
            let after =
                WalletRepo::credit(&mut *tx, owner_id, input.wallet_type, input.amount).await?;
            (after, TransactionKind::Credit, round_paise(input.amount))
        }
        AdjustmentDirection::Debit => {
            if before.component(input.wallet_type) <= 0.0 {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "The {} wallet of profile {owner_id} is empty",
                    input.wallet_type
                ))));
            }
            let after =
                WalletRepo::debit(&mut *tx, owner_id, input.wallet_type, input.amount).await?;
            let removed = round_paise(
                before.component(input.wallet_type) - after.component(input.wallet_type),
            );
            (after, TransactionKind::Debit, removed)
        }
    };

    let entry = NewLedgerEntry {
        wallet_id: owner_id,
        wallet_type: input.wallet_type,
        kind,
        amount: recorded,
        description: input.description.trim().to_string(),
        status: TransactionStatus::Completed,
        plot_id: None,
        project_name: None,
        level: None,
        created_at: Utc::now(),
    };
    let transaction = TransactionRepo::insert(&mut *tx, &entry).await?;

    tx.commit().await?;

    tracing::info!(
        owner_id,
        actor_id = ?input.actor_id,
        wallet_type = %input.wallet_type,
        kind = %kind,
        amount = recorded,
        "Manual wallet adjustment"
    );

    Ok(Json(DataResponse {
        data: AdjustmentResult {
            wallet: WalletSummary::new(owner_id, after),
            transaction,
        },
    }))
}
