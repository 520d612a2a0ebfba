use std::sync::Arc;

use plotledger_core::commission::CommissionEngine;
use plotledger_db::PgCommissionStore;

use crate::config::ServerConfig;

/// Commission engine wired to the Postgres store.
pub type Engine = CommissionEngine<PgCommissionStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: plotledger_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Commission engine sharing the same pool.
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(pool: plotledger_db::DbPool, config: ServerConfig) -> Self {
        let engine = CommissionEngine::new(
            PgCommissionStore::new(pool.clone()),
            config.commission_rates,
        );
        Self {
            pool,
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }
}
