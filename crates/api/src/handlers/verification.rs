//! Handlers for identity verification submissions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotledger_core::error::CoreError;
use plotledger_core::types::DbId;
use plotledger_core::verification::{
    ensure_reviewable, validate_document, validate_rejection_reason, VERIFICATION_APPROVED,
    VERIFICATION_PENDING, VERIFICATION_REJECTED,
};
use plotledger_db::models::verification::{
    CreateVerification, ReviewVerification, Verification, VerificationFilter,
};
use plotledger_db::repositories::VerificationRepo;
use validator::Validate;

use super::{require_optional_profile, require_profile};
use crate::error::{AppError, AppResult};
use crate::query::resolve_page;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/verifications
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<VerificationFilter>,
) -> AppResult<Json<DataResponse<Vec<Verification>>>> {
    if let Some(status) = &filter.status {
        if ![VERIFICATION_PENDING, VERIFICATION_APPROVED, VERIFICATION_REJECTED]
            .contains(&status.as_str())
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown verification status '{status}'"
            ))));
        }
    }
    let (limit, offset) = resolve_page(filter.limit, filter.offset);
    let rows = VerificationRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/verifications
pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<CreateVerification>,
) -> AppResult<(StatusCode, Json<DataResponse<Verification>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_document(&input.document_type, &input.document_number)?;
    require_profile(&state.pool, input.profile_id).await?;

    if let Some(pending) =
        VerificationRepo::find_pending_for_profile(&state.pool, input.profile_id).await?
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Profile {} already has pending verification {}",
            input.profile_id, pending.id
        ))));
    }

    let number: String = input
        .document_number
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    let verification = VerificationRepo::create(&state.pool, &input, &number).await?;
    tracing::info!(
        verification_id = verification.id,
        profile_id = verification.profile_id,
        document_type = %verification.document_type,
        "Verification submitted"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: verification })))
}

/// POST /api/v1/verifications/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewVerification>,
) -> AppResult<Json<DataResponse<Verification>>> {
    let verification = review(&state, id, VERIFICATION_APPROVED, input.reviewed_by, None).await?;
    Ok(Json(DataResponse { data: verification }))
}

/// POST /api/v1/verifications/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewVerification>,
) -> AppResult<Json<DataResponse<Verification>>> {
    validate_rejection_reason(input.rejection_reason.as_deref())?;
    let reason = input.rejection_reason.as_deref().map(str::trim);
    let verification = review(&state, id, VERIFICATION_REJECTED, input.reviewed_by, reason).await?;
    Ok(Json(DataResponse { data: verification }))
}

async fn review(
    state: &AppState,
    id: DbId,
    status: &str,
    reviewed_by: Option<DbId>,
    reason: Option<&str>,
) -> AppResult<Verification> {
    require_optional_profile(&state.pool, reviewed_by).await?;
    let current = VerificationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Verification", id))?;
    ensure_reviewable(&current.status)?;

    let verification = VerificationRepo::review(&state.pool, id, status, reviewed_by, reason)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Verification {id} is no longer pending"
            )))
        })?;
    tracing::info!(verification_id = id, status, reviewed_by = ?reviewed_by, "Verification reviewed");
    Ok(verification)
}
