use axum::routing::post;
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Routes mounted at `/wallets`.
///
/// ```text
/// POST   /{owner_id}/adjust     -> adjust
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{owner_id}/adjust", post(wallet::adjust))
}
