use axum::routing::get;
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET    /{id}/receipt     -> receipt
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/receipt", get(payment::receipt))
}
