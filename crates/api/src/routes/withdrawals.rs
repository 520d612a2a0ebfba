use axum::routing::{get, post};
use axum::Router;

use crate::handlers::withdrawal;
use crate::state::AppState;

/// Routes mounted at `/withdrawals`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// POST   /{id}/approve     -> approve
/// POST   /{id}/reject      -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(withdrawal::list).post(withdrawal::create))
        .route("/{id}/approve", post(withdrawal::approve))
        .route("/{id}/reject", post(withdrawal::reject))
}
