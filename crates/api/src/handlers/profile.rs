//! Handlers for the `/profiles` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotledger_core::error::CoreError;
use plotledger_core::roles::{validate_role, ROLE_BROKER};
use plotledger_core::types::DbId;
use plotledger_db::models::profile::{CreateProfile, Profile, UpdateUpline};
use plotledger_db::repositories::ProfileRepo;
use validator::Validate;

use super::require_profile;
use crate::error::{AppError, AppResult};
use crate::query::{resolve_page, RoleFilter};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/profiles
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProfile>,
) -> AppResult<(StatusCode, Json<DataResponse<Profile>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let role = input.role.as_deref().unwrap_or(ROLE_BROKER);
    validate_role(role)?;
    if let Some(upline_id) = input.upline_id {
        require_profile(&state.pool, upline_id).await?;
    }

    let profile = ProfileRepo::create(&state.pool, &input, role).await?;
    tracing::info!(
        profile_id = profile.id,
        role = %profile.role,
        upline_id = ?profile.upline_id,
        "Profile created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}

/// GET /api/v1/profiles
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<RoleFilter>,
) -> AppResult<Json<DataResponse<Vec<Profile>>>> {
    if let Some(role) = &filter.role {
        validate_role(role)?;
    }
    let (limit, offset) = resolve_page(filter.limit, filter.offset);
    let profiles = ProfileRepo::list(&state.pool, filter.role.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse { data: profiles }))
}

/// GET /api/v1/profiles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Profile>>> {
    let profile = require_profile(&state.pool, id).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/profiles/{id}/upline
///
/// Rejects an upline that is the profile itself or one of its downline,
/// which would close a cycle in the referral tree.
pub async fn update_upline(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUpline>,
) -> AppResult<Json<DataResponse<Profile>>> {
    require_profile(&state.pool, id).await?;

    if let Some(upline_id) = input.upline_id {
        if upline_id == id {
            return Err(AppError::Core(CoreError::Validation(
                "A profile cannot be its own upline".into(),
            )));
        }
        require_profile(&state.pool, upline_id).await?;
        if ProfileRepo::chain_contains(&state.pool, upline_id, id).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Profile {upline_id} is in the downline of {id}; linking them would create a cycle"
            ))));
        }
    }

    let profile = ProfileRepo::update_upline(&state.pool, id, input.upline_id)
        .await?
        .ok_or(AppError::not_found("Profile", id))?;
    tracing::info!(profile_id = id, upline_id = ?input.upline_id, "Upline changed");
    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/profiles/{id}/downline
pub async fn downline(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Profile>>>> {
    require_profile(&state.pool, id).await?;
    let profiles = ProfileRepo::list_downline(&state.pool, id).await?;
    Ok(Json(DataResponse { data: profiles }))
}
