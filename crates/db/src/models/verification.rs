//! Identity verification models.

use plotledger_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `verifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Verification {
    pub id: DbId,
    pub profile_id: DbId,
    pub document_type: String,
    pub document_number: String,
    pub document_url: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a document.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVerification {
    pub profile_id: DbId,
    pub document_type: String,
    pub document_number: String,
    #[validate(url(message = "document_url must be a valid URL"))]
    pub document_url: String,
}

/// Request body for approving or rejecting a submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewVerification {
    pub reviewed_by: Option<DbId>,
    pub rejection_reason: Option<String>,
}

/// Filter for `GET /verifications`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationFilter {
    pub status: Option<String>,
    pub profile_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
