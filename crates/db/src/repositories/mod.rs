//! Repository layer: one zero-sized struct per table with async query methods.

pub mod commission_repo;
pub mod payment_repo;
pub mod plot_repo;
pub mod profile_repo;
pub mod transaction_repo;
pub mod verification_repo;
pub mod wallet_repo;
pub mod withdrawal_repo;

pub use commission_repo::CommissionRepo;
pub use payment_repo::PaymentRepo;
pub use plot_repo::PlotRepo;
pub use profile_repo::ProfileRepo;
pub use transaction_repo::TransactionRepo;
pub use verification_repo::VerificationRepo;
pub use wallet_repo::WalletRepo;
pub use withdrawal_repo::WithdrawalRepo;
