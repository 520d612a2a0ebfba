//! Handlers for broker withdrawal requests.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use plotledger_core::commission::NewLedgerEntry;
use plotledger_core::error::CoreError;
use plotledger_core::ledger::{TransactionKind, TransactionStatus, WalletType};
use plotledger_core::types::DbId;
use plotledger_core::withdrawal::{
    ensure_pending, split_withdrawal, validate_withdrawal, WITHDRAWAL_APPROVED,
    WITHDRAWAL_PENDING, WITHDRAWAL_REJECTED,
};
use plotledger_db::models::withdrawal::{
    CreateWithdrawal, DecideWithdrawal, WithdrawalFilter, WithdrawalRequest,
};
use plotledger_db::repositories::{TransactionRepo, WalletRepo, WithdrawalRepo};
use validator::Validate;

use super::{require_optional_profile, require_profile};
use crate::error::{AppError, AppResult};
use crate::query::resolve_page;
use crate::response::DataResponse;
use crate::state::AppState;

const STATUSES: &[&str] = &[WITHDRAWAL_PENDING, WITHDRAWAL_APPROVED, WITHDRAWAL_REJECTED];

/// GET /api/v1/withdrawals
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<WithdrawalFilter>,
) -> AppResult<Json<DataResponse<Vec<WithdrawalRequest>>>> {
    if let Some(status) = &filter.status {
        if !STATUSES.contains(&status.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown withdrawal status '{status}'"
            ))));
        }
    }
    let (limit, offset) = resolve_page(filter.limit, filter.offset);
    let requests = WithdrawalRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/withdrawals
///
/// The balance check here is advisory; approval checks it again under lock.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateWithdrawal>,
) -> AppResult<(StatusCode, Json<DataResponse<WithdrawalRequest>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    require_profile(&state.pool, input.profile_id).await?;

    let total = WalletRepo::find_by_owner(&state.pool, input.profile_id)
        .await?
        .map(|w| w.total_balance)
        .unwrap_or(0.0);
    validate_withdrawal(input.amount, total)?;

    let request = WithdrawalRepo::create(&state.pool, &input).await?;
    tracing::info!(
        withdrawal_id = request.id,
        profile_id = request.profile_id,
        amount = request.amount,
        "Withdrawal requested"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// POST /api/v1/withdrawals/{id}/approve
///
/// Debits the direct component first, then downline, writes one
/// `withdrawal` ledger entry per component touched and marks the request
/// approved, all in one transaction.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecideWithdrawal>,
) -> AppResult<Json<DataResponse<WithdrawalRequest>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    require_optional_profile(&state.pool, input.decided_by).await?;

    let mut tx = state.pool.begin().await?;

    let request = WithdrawalRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or(AppError::not_found("WithdrawalRequest", id))?;
    ensure_pending(&request.status)?;

    let balance = WalletRepo::lock_balance(&mut *tx, request.profile_id).await?;
    validate_withdrawal(request.amount, balance.total)?;
    let split = split_withdrawal(request.amount, balance.direct, balance.downline);

    let now = Utc::now();
    for (wallet_type, amount) in [
        (WalletType::Direct, split.from_direct),
        (WalletType::Downline, split.from_downline),
    ] {
        if amount <= 0.0 {
            continue;
        }
        WalletRepo::debit(&mut *tx, request.profile_id, wallet_type, amount).await?;
        let entry = NewLedgerEntry {
            wallet_id: request.profile_id,
            wallet_type,
            kind: TransactionKind::Withdrawal,
            amount,
            description: format!("Withdrawal request #{id}"),
            status: TransactionStatus::Completed,
            plot_id: None,
            project_name: None,
            level: None,
            created_at: now,
        };
        TransactionRepo::insert(&mut *tx, &entry).await?;
    }

    let decided = WithdrawalRepo::decide(
        &mut *tx,
        id,
        WITHDRAWAL_APPROVED,
        input.decided_by,
        input.note.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Withdrawal request {id} is no longer pending"
        )))
    })?;

    tx.commit().await?;

    tracing::info!(
        withdrawal_id = id,
        profile_id = decided.profile_id,
        from_direct = split.from_direct,
        from_downline = split.from_downline,
        decided_by = ?input.decided_by,
        "Withdrawal approved"
    );
    Ok(Json(DataResponse { data: decided }))
}

/// POST /api/v1/withdrawals/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecideWithdrawal>,
) -> AppResult<Json<DataResponse<WithdrawalRequest>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let note = input
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "A note is required to reject a withdrawal".into(),
            ))
        })?;
    require_optional_profile(&state.pool, input.decided_by).await?;

    let mut tx = state.pool.begin().await?;

    let request = WithdrawalRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or(AppError::not_found("WithdrawalRequest", id))?;
    ensure_pending(&request.status)?;

    let decided = WithdrawalRepo::decide(
        &mut *tx,
        id,
        WITHDRAWAL_REJECTED,
        input.decided_by,
        Some(note),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Withdrawal request {id} is no longer pending"
        )))
    })?;

    tx.commit().await?;

    tracing::info!(withdrawal_id = id, decided_by = ?input.decided_by, "Withdrawal rejected");
    Ok(Json(DataResponse { data: decided }))
}
