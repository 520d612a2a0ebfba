pub mod commissions;
pub mod health;
pub mod payments;
pub mod plots;
pub mod profiles;
pub mod verifications;
pub mod wallets;
pub mod withdrawals;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /plots                                   list, create
/// /plots/{id}                              get, update, delete
/// /plots/{id}/status                       transition (PUT)
/// /plots/{id}/payments                     list, record
/// /plots/{id}/recalculate-commission       single-plot recalculation (POST)
///
/// /payments/{id}/receipt                   receipt (GET)
///
/// /profiles                                list, create
/// /profiles/{id}                           get
/// /profiles/{id}/upline                    change upline (PUT)
/// /profiles/{id}/downline                  direct referrals (GET)
/// /profiles/{id}/wallet                    wallet (GET)
/// /profiles/{id}/transactions              ledger (GET)
/// /profiles/{id}/commissions               commissions received (GET)
/// /profiles/{id}/plots                     plot history (GET)
///
/// /wallets/{owner_id}/adjust               manual credit/debit (POST)
///
/// /commissions                             list (?plot_id, receiver_id)
/// /commissions/distribute                  manual distribution (POST)
/// /commissions/recalculate-all             bulk rebuild (POST)
///
/// /withdrawals                             list (?status), request
/// /withdrawals/{id}/approve                approve (POST)
/// /withdrawals/{id}/reject                 reject (POST)
///
/// /verifications                           list (?status), submit
/// /verifications/{id}/approve              approve (POST)
/// /verifications/{id}/reject               reject (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/plots", plots::router())
        .nest("/payments", payments::router())
        .nest("/profiles", profiles::router())
        .nest("/wallets", wallets::router())
        .nest("/commissions", commissions::router())
        .nest("/withdrawals", withdrawals::router())
        .nest("/verifications", verifications::router())
}
