//! Broker / investor / admin profile models.

use plotledger_core::commission::ProfileRef;
use plotledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub full_name: String,
    pub role: String,
    pub upline_id: Option<DbId>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Profile> for ProfileRef {
    fn from(p: Profile) -> Self {
        ProfileRef {
            id: p.id,
            full_name: p.full_name,
            role: p.role,
            upline_id: p.upline_id,
        }
    }
}

/// DTO for creating a profile. `role` defaults to `broker`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProfile {
    #[validate(length(min = 1, max = 200, message = "full_name must be 1-200 characters"))]
    pub full_name: String,
    pub role: Option<String>,
    pub upline_id: Option<DbId>,
    #[validate(length(min = 5, max = 20, message = "phone must be 5-20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
}

/// Request body for `PUT /profiles/{id}/upline`. `null` detaches the profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUpline {
    pub upline_id: Option<DbId>,
}
