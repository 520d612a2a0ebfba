//! Handlers for the `/plots` resource.
//!
//! Status changes go through [`apply_transition`], which runs the commission
//! engine before the new status is written so a failed distribution leaves
//! the plot untouched.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotledger_core::commission::{DistributionRequest, PlotRef};
use plotledger_core::error::CoreError;
use plotledger_core::plot::{paid_percentage, validate_plot_fields, FinancialEffect, PlotStatus};
use plotledger_core::types::DbId;
use plotledger_db::models::plot::{
    CreatePlot, Plot, PlotFilter, StatusChange, TransitionPlot, UpdatePlot,
};
use plotledger_db::repositories::PlotRepo;
use validator::Validate;

use super::{require_optional_profile, require_plot, require_profile};
use crate::error::{AppError, AppResult};
use crate::query::{resolve_page, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/plots
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePlot>,
) -> AppResult<(StatusCode, Json<DataResponse<Plot>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_plot_fields(
        &input.project_name,
        &input.plot_number,
        input.area_gaj,
        input.total_amount.unwrap_or(0.0),
        input.booking_amount.unwrap_or(0.0),
    )?;
    require_optional_profile(&state.pool, input.broker_id).await?;
    require_optional_profile(&state.pool, input.updated_by).await?;

    let plot = PlotRepo::create(&state.pool, &input).await?;
    tracing::info!(
        plot_id = plot.id,
        project_name = %plot.project_name,
        plot_number = %plot.plot_number,
        "Plot created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: plot })))
}

/// GET /api/v1/plots
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<PlotFilter>,
) -> AppResult<Json<DataResponse<Vec<Plot>>>> {
    if let Some(status) = &filter.status {
        status.parse::<PlotStatus>()?;
    }
    let (limit, offset) = resolve_page(filter.limit, filter.offset);
    let plots = PlotRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: plots }))
}

/// GET /api/v1/profiles/{id}/plots
///
/// Plot history of a broker: every non-deleted plot assigned to them.
pub async fn list_for_broker(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Plot>>>> {
    require_profile(&state.pool, id).await?;
    let filter = PlotFilter {
        broker_id: Some(id),
        ..Default::default()
    };
    let (limit, offset) = params.resolve();
    let plots = PlotRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: plots }))
}

/// GET /api/v1/plots/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Plot>>> {
    let plot = require_plot(&state.pool, id).await?;
    Ok(Json(DataResponse { data: plot }))
}

/// PUT /api/v1/plots/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlot>,
) -> AppResult<Json<DataResponse<Plot>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let existing = require_plot(&state.pool, id).await?;

    let total_amount = input.total_amount.unwrap_or(existing.total_amount);
    validate_plot_fields(
        input.project_name.as_deref().unwrap_or(&existing.project_name),
        input.plot_number.as_deref().unwrap_or(&existing.plot_number),
        input.area_gaj.unwrap_or(existing.area_gaj),
        total_amount,
        input.booking_amount.unwrap_or(existing.booking_amount),
    )?;
    require_optional_profile(&state.pool, input.broker_id).await?;
    require_optional_profile(&state.pool, input.updated_by).await?;

    let pct = paid_percentage(existing.paid_amount, total_amount);
    let plot = PlotRepo::update(&state.pool, id, &input, pct)
        .await?
        .ok_or(AppError::not_found("Plot", id))?;
    Ok(Json(DataResponse { data: plot }))
}

/// DELETE /api/v1/plots/{id}
///
/// Sold plots carry commission; they must be moved out of `sold` (which
/// reverses it) before they can be deleted.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let plot = require_plot(&state.pool, id).await?;
    if plot.status()? == PlotStatus::Sold {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Plot {id} is sold; change its status before deleting it"
        ))));
    }

    if PlotRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(plot_id = id, "Plot deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Plot", id))
    }
}

/// PUT /api/v1/plots/{id}/status
pub async fn transition(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionPlot>,
) -> AppResult<Json<DataResponse<Plot>>> {
    let plot = require_plot(&state.pool, id).await?;
    require_optional_profile(&state.pool, input.broker_id).await?;
    require_optional_profile(&state.pool, input.updated_by).await?;

    let change = StatusChange {
        status: input.status,
        broker_id: input.broker_id,
        buyer_name: input.buyer_name,
        buyer_phone: input.buyer_phone,
        updated_by: input.updated_by,
    };
    let plot = apply_transition(&state, &plot, change).await?;
    Ok(Json(DataResponse { data: plot }))
}

/// Move `plot` to `change.status`, applying the financial effect first.
///
/// A sale credits the broker in `change`, else the plot's broker, else the
/// last updater. Leaving `sold` reverses every commission of the plot.
pub(crate) async fn apply_transition(
    state: &AppState,
    plot: &Plot,
    change: StatusChange,
) -> AppResult<Plot> {
    let current = plot.status()?;
    let effect = current.transition_to(change.status)?;

    match effect {
        FinancialEffect::Distribute => {
            let seller_id = change
                .broker_id
                .or(plot.broker_id)
                .or(change.updated_by)
                .or(plot.updated_by)
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Plot {} has no broker; a broker is required to sell it",
                        plot.id
                    ))
                })?;
            let request = DistributionRequest::for_plot(
                seller_id,
                plot.area_gaj,
                PlotRef {
                    id: plot.id,
                    project_name: plot.project_name.clone(),
                    plot_number: plot.plot_number.clone(),
                },
            );
            state.engine.distribute(request).await?;
        }
        FinancialEffect::Reverse => {
            state.engine.reverse_plot(plot.id).await?;
        }
        FinancialEffect::None => {}
    }

    let updated = PlotRepo::set_status(&state.pool, plot.id, &change)
        .await?
        .ok_or(AppError::not_found("Plot", plot.id))?;

    tracing::info!(
        plot_id = plot.id,
        from = %current,
        to = %change.status,
        effect = ?effect,
        "Plot status changed"
    );
    Ok(updated)
}
