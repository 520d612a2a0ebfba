//! Route definitions for the `/profiles` resource, including the broker
//! portal reads nested under a profile.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{commission, plot, profile, wallet};
use crate::state::AppState;

/// Routes mounted at `/profiles`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}/upline           -> update_upline
/// GET    /{id}/downline         -> downline
/// GET    /{id}/wallet           -> wallet::get_for_profile
/// GET    /{id}/transactions     -> wallet::list_transactions
/// GET    /{id}/commissions      -> commission::list_for_profile
/// GET    /{id}/plots            -> plot::list_for_broker
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::list).post(profile::create))
        .route("/{id}", get(profile::get_by_id))
        .route("/{id}/upline", put(profile::update_upline))
        .route("/{id}/downline", get(profile::downline))
        .route("/{id}/wallet", get(wallet::get_for_profile))
        .route("/{id}/transactions", get(wallet::list_transactions))
        .route("/{id}/commissions", get(commission::list_for_profile))
        .route("/{id}/plots", get(plot::list_for_broker))
}
