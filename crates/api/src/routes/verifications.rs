use axum::routing::{get, post};
use axum::Router;

use crate::handlers::verification;
use crate::state::AppState;

/// Routes mounted at `/verifications`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> submit
/// POST   /{id}/approve     -> approve
/// POST   /{id}/reject      -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(verification::list).post(verification::submit))
        .route("/{id}/approve", post(verification::approve))
        .route("/{id}/reject", post(verification::reject))
}
