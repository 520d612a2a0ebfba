use axum::routing::{get, post};
use axum::Router;

use crate::handlers::commission;
use crate::state::AppState;

/// Routes mounted at `/commissions`.
///
/// ```text
/// GET    /                   -> list
/// POST   /distribute         -> distribute
/// POST   /recalculate-all    -> recalculate_all
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(commission::list))
        .route("/distribute", post(commission::distribute))
        .route("/recalculate-all", post(commission::recalculate_all))
}
