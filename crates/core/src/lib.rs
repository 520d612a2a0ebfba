//! Domain logic for plot sales and broker commissions.
//!
//! Nothing in this crate touches the database directly.

pub mod commission;
pub mod error;
pub mod ledger;
pub mod money;
pub mod pagination;
pub mod payment;
pub mod plot;
pub mod roles;
pub mod types;
pub mod verification;
pub mod withdrawal;
