//! Route definitions for the `/plots` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{commission, payment, plot};
use crate::state::AppState;

/// Routes mounted at `/plots`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// PUT    /{id}/status                   -> transition
/// GET    /{id}/payments                 -> payment::list_for_plot
/// POST   /{id}/payments                 -> payment::record
/// POST   /{id}/recalculate-commission   -> commission::recalculate_plot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(plot::list).post(plot::create))
        .route(
            "/{id}",
            get(plot::get_by_id).put(plot::update).delete(plot::delete),
        )
        .route("/{id}/status", put(plot::transition))
        .route(
            "/{id}/payments",
            get(payment::list_for_plot).post(payment::record),
        )
        .route(
            "/{id}/recalculate-commission",
            post(commission::recalculate_plot),
        )
}
