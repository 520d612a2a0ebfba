pub mod commission;
pub mod payment;
pub mod plot;
pub mod profile;
pub mod transaction;
pub mod verification;
pub mod wallet;
pub mod withdrawal;
