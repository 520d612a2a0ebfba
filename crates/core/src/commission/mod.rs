//! Broker commission domain logic.
//!
//! Pure business logic for commission distribution. All data access goes
//! through the [`CommissionStore`] trait; the Postgres implementation lives
//! in `plotledger_db`. The module provides:
//!
//! - Rate configuration ([`CommissionRates`])
//! - Distribution, recalculation and reversal ([`CommissionEngine`])
//! - The storage seam and its atomic [`WriteBatch`]
//! - An in-memory store for tests ([`memory::MemoryStore`])

pub mod memory;
pub mod rates;
pub mod store;
pub mod types;

mod engine;
mod recalculate;
mod reversal;


pub use engine::CommissionEngine;
pub use rates::CommissionRates;
pub use store::{
    CommissionEntry, CommissionStore, LedgerEntry, NewCommission, NewLedgerEntry, PlotSnapshot,
    ProfileRef, ResetCounts, StoreError, WriteBatch, WriteOp,
};
pub use types::{
    BulkRecalculationSummary, CommissionTier, DistributionRequest, DistributionSummary,
    PlotRecalculationSummary, PlotRef, PreservedTimestamps, ReversalSummary, SaleArea,
    MAX_UPLINE_LEVELS,
};
