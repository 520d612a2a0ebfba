pub mod commission;
pub mod payment;
pub mod plot;
pub mod profile;
pub mod verification;
pub mod wallet;
pub mod withdrawal;

use plotledger_core::types::DbId;
use plotledger_db::models::plot::Plot;
use plotledger_db::models::profile::Profile;
use plotledger_db::repositories::{PlotRepo, ProfileRepo};
use plotledger_db::DbPool;

use crate::error::{AppError, AppResult};

/// Load a profile or fail with 404.
pub(crate) async fn require_profile(pool: &DbPool, id: DbId) -> AppResult<Profile> {
    ProfileRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Profile", id))
}

/// Check an optional profile reference (actor, reviewer, broker) before it
/// is written into a foreign key column.
pub(crate) async fn require_optional_profile(pool: &DbPool, id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = id {
        require_profile(pool, id).await?;
    }
    Ok(())
}

/// Load a non-deleted plot or fail with 404.
pub(crate) async fn require_plot(pool: &DbPool, id: DbId) -> AppResult<Plot> {
    PlotRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Plot", id))
}
