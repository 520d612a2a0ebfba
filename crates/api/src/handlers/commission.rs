//! Handlers for commission listing, manual distribution and recalculation.

use axum::extract::{Path, Query, State};
use axum::Json;
use plotledger_core::commission::{
    BulkRecalculationSummary, DistributionRequest, DistributionSummary, PlotRecalculationSummary,
};
use plotledger_core::error::CoreError;
use plotledger_core::plot::PlotStatus;
use plotledger_core::types::DbId;
use plotledger_db::models::commission::{Commission, CommissionFilter, DistributeCommission};
use plotledger_db::repositories::CommissionRepo;

use super::{require_plot, require_profile};
use crate::error::{AppError, AppResult};
use crate::query::{resolve_page, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/commissions
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CommissionFilter>,
) -> AppResult<Json<DataResponse<Vec<Commission>>>> {
    let (limit, offset) = resolve_page(filter.limit, filter.offset);
    let rows = CommissionRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/profiles/{id}/commissions
pub async fn list_for_profile(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Commission>>>> {
    require_profile(&state.pool, id).await?;
    let filter = CommissionFilter {
        receiver_id: Some(id),
        ..Default::default()
    };
    let (limit, offset) = params.resolve();
    let rows = CommissionRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/commissions/distribute
///
/// Without `plot_id` only wallets and ledger entries are written; upline
/// commission rows need a plot to key on. A given plot must be sold, since
/// only leaving `sold` reverses its commission.
pub async fn distribute(
    State(state): State<AppState>,
    Json(input): Json<DistributeCommission>,
) -> AppResult<Json<DataResponse<DistributionSummary>>> {
    let plot = match input.plot_id {
        Some(plot_id) => {
            let snapshot = require_plot(&state.pool, plot_id).await?.snapshot()?;
            if snapshot.status != PlotStatus::Sold {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Plot {plot_id} is {}; commission is only distributed for sold plots",
                    snapshot.status
                ))));
            }
            Some(snapshot.plot_ref())
        }
        None => None,
    };

    let request = DistributionRequest {
        seller_id: input.seller_id,
        sale_area: input.sale_area,
        plot,
        preserved: None,
    };
    let summary = state.engine.distribute(request).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// POST /api/v1/plots/{id}/recalculate-commission
pub async fn recalculate_plot(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PlotRecalculationSummary>>> {
    let summary = state.engine.recalculate_plot(id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// POST /api/v1/commissions/recalculate-all
///
/// Destructive: clears every commission row and ledger entry, zeroes all
/// wallets, then redistributes for each sold plot.
pub async fn recalculate_all(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BulkRecalculationSummary>>> {
    tracing::warn!("Bulk commission recalculation requested");
    let summary = state.engine.recalculate_all().await?;
    Ok(Json(DataResponse { data: summary }))
}
